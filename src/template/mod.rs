//! Template descriptors: how one bookkeeping product lays out its export.
//!
//! A descriptor is plain data plus a [`Derivation`] picked from a closed set,
//! so template quirks stay testable in isolation and adding a product means
//! adding a descriptor rather than touching the pipeline.

use crate::model::{Cell, NormalizedRow, NormalizedValue, RawRow, Role, TemplateId};
use crate::normalize;

pub mod catalog;
pub mod detect;

pub use catalog::TemplateCatalog;
pub use detect::{DetectorConfig, HeaderMatch, TemplateChoice, TemplateDetector};

/// Alternative spellings of one expected header, case-folded.
pub type Label = &'static [&'static str];

/// Where the cells of a role come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSource {
    /// The column whose header matches one of the aliases.
    Header(Label),
    /// A fixed zero-based column position.
    Position(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub role: Role,
    pub source: ColumnSource,
    /// A required column missing from the sheet aborts the whole file.
    pub required: bool,
}

impl ColumnSpec {
    pub const fn header(role: Role, aliases: Label, required: bool) -> Self {
        Self {
            role,
            source: ColumnSource::Header(aliases),
            required,
        }
    }

    pub const fn position(role: Role, column: usize, required: bool) -> Self {
        Self {
            role,
            source: ColumnSource::Position(column),
            required,
        }
    }
}

/// Template-specific reshaping of a raw row onto canonical roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Derivation {
    /// Columns map one-to-one onto canonical roles.
    Direct,
    /// A combined "number / date" document reference column supplies the
    /// document number, and the date when the registration date is blank.
    DocumentReference,
    /// One line per posting against a correspondent account, with the amount
    /// split into debit and credit columns and account numbers next to their
    /// names.
    Correspondence,
}

impl Derivation {
    /// Rewrites source-only roles of `raw` into canonical roles.
    pub fn apply(&self, raw: &mut RawRow) {
        match self {
            Derivation::Direct => {}
            Derivation::DocumentReference => split_document_reference(raw),
            Derivation::Correspondence => resolve_correspondence(raw),
        }
    }
}

fn split_document_reference(raw: &mut RawRow) {
    let Some(reference) = raw.cells.remove(&Role::DocumentReference) else {
        return;
    };
    if reference.is_blank() {
        return;
    }

    let (number, date) = match &reference {
        Cell::Text(text) => match text.split_once('/') {
            Some((number, date)) => (Cell::text(number.trim()), Cell::text(date.trim())),
            None => (Cell::text(text.trim()), Cell::Empty),
        },
        Cell::DateTime(_) => (Cell::Empty, reference.clone()),
        other => (other.clone(), Cell::Empty),
    };

    fill_blank(raw, Role::DocumentNumber, number);
    fill_blank(raw, Role::OperationDate, date);
}

fn resolve_correspondence(raw: &mut RawRow) {
    let account_number = raw.cells.remove(&Role::AccountNumber).unwrap_or(Cell::Empty);
    let account_name = raw.cells.get(&Role::AccountName).cloned().unwrap_or(Cell::Empty);
    let correspondent_number = raw
        .cells
        .remove(&Role::CorrespondentNumber)
        .unwrap_or(Cell::Empty);
    let correspondent_name = raw
        .cells
        .remove(&Role::CorrespondentName)
        .unwrap_or(Cell::Empty);
    let debit_amount = raw.cells.remove(&Role::DebitAmount).unwrap_or(Cell::Empty);
    let credit_amount = raw.cells.remove(&Role::CreditAmount).unwrap_or(Cell::Empty);

    let account = fused_cell(&account_number, &account_name);
    let correspondent = fused_cell(&correspondent_number, &correspondent_name);

    let (debit, credit, amount) = if holds_amount(&debit_amount) || credit_amount.is_blank() {
        (account, correspondent, debit_amount)
    } else {
        (correspondent, account, credit_amount)
    };

    fill_blank(raw, Role::DebitAccount, debit);
    fill_blank(raw, Role::CreditAccount, credit);
    fill_blank(raw, Role::Amount, amount);
}

/// Exports print `0,00` in the unused amount column; only a non-zero or
/// unreadable value picks a side.
fn holds_amount(cell: &Cell) -> bool {
    match normalize::normalize_amount(cell, true) {
        Ok(Some(amount)) => !amount.is_zero(),
        Ok(None) => false,
        Err(_) => true,
    }
}

fn fused_cell(number: &Cell, name: &Cell) -> Cell {
    normalize::fuse_account(number, name)
        .map(Cell::Text)
        .unwrap_or(Cell::Empty)
}

fn fill_blank(raw: &mut RawRow, role: Role, value: Cell) {
    if value.is_blank() {
        return;
    }
    let slot = raw.cells.entry(role).or_insert(Cell::Empty);
    if slot.is_blank() {
        *slot = value;
    }
}

/// Static description of one template.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDescriptor {
    pub id: TemplateId,
    /// Product name as the vendor spells it.
    pub product: &'static str,
    /// Headers expected in the header row, used for detection.
    pub labels: &'static [Label],
    pub columns: &'static [ColumnSpec],
    pub derivation: Derivation,
    /// Whether amounts may be negative, encoding a contra-entry.
    pub signed_amounts: bool,
}

impl TemplateDescriptor {
    /// Settles a signed amount into a non-negative one. A negative amount is
    /// a contra-entry: the sides swap and the magnitude is kept.
    pub fn settle(&self, row: &mut NormalizedRow) {
        if !self.signed_amounts {
            return;
        }
        let Some(amount) = row.amount(Role::Amount) else {
            return;
        };
        if amount.is_sign_negative() && !amount.is_zero() {
            row.fields
                .insert(Role::Amount, NormalizedValue::Amount(amount.abs()));
            swap_fields(row, Role::DebitAccount, Role::CreditAccount);
            swap_fields(row, Role::AnalyticalDebit, Role::AnalyticalCredit);
        }
    }
}

fn swap_fields(row: &mut NormalizedRow, lhs: Role, rhs: Role) {
    let left = row.fields.remove(&lhs);
    let right = row.fields.remove(&rhs);
    if let Some(value) = left {
        row.fields.insert(rhs, value);
    }
    if let Some(value) = right {
        row.fields.insert(lhs, value);
    }
}
