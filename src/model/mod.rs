use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{FieldError, IngestError};

pub mod worksheet;

pub use worksheet::{Cell, Worksheet};

/// The closed set of bookkeeping products whose exports are understood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TemplateId {
    #[serde(rename = "RIVAL")]
    Rival,
    #[serde(rename = "AJUR")]
    Ajur,
    #[serde(rename = "MIKROINVEST")]
    Microinvest,
    #[serde(rename = "BusinessNavigator")]
    BusinessNavigator,
    #[serde(rename = "UNIVERSUM")]
    Universum,
}

impl TemplateId {
    pub const ALL: [TemplateId; 5] = [
        TemplateId::Rival,
        TemplateId::Ajur,
        TemplateId::Microinvest,
        TemplateId::BusinessNavigator,
        TemplateId::Universum,
    ];

    /// Identifier used on the wire and in stored records.
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateId::Rival => "RIVAL",
            TemplateId::Ajur => "AJUR",
            TemplateId::Microinvest => "MIKROINVEST",
            TemplateId::BusinessNavigator => "BusinessNavigator",
            TemplateId::Universum => "UNIVERSUM",
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateId {
    type Err = IngestError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let folded = value.trim().to_lowercase().replace(['_', '-', ' '], "");
        match folded.as_str() {
            "rival" => Ok(TemplateId::Rival),
            "ajur" => Ok(TemplateId::Ajur),
            "mikroinvest" | "microinvest" => Ok(TemplateId::Microinvest),
            "businessnavigator" => Ok(TemplateId::BusinessNavigator),
            "universum" => Ok(TemplateId::Universum),
            _ => Err(IngestError::UnknownTemplate(value.to_string())),
        }
    }
}

/// Column roles. The first group maps onto canonical record fields; the
/// second group only exists in source layouts and is consumed by template
/// derivations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    DocumentType,
    DocumentNumber,
    OperationDate,
    DebitAccount,
    CreditAccount,
    Amount,
    Description,
    PartnerName,
    AnalyticalDebit,
    AnalyticalCredit,
    AccountName,

    AccountNumber,
    CorrespondentNumber,
    CorrespondentName,
    DebitAmount,
    CreditAmount,
    DocumentReference,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::DocumentType => "document_type",
            Role::DocumentNumber => "document_number",
            Role::OperationDate => "operation_date",
            Role::DebitAccount => "debit_account",
            Role::CreditAccount => "credit_account",
            Role::Amount => "amount",
            Role::Description => "description",
            Role::PartnerName => "partner_name",
            Role::AnalyticalDebit => "analytical_debit",
            Role::AnalyticalCredit => "analytical_credit",
            Role::AccountName => "account_name",
            Role::AccountNumber => "account_number",
            Role::CorrespondentNumber => "correspondent_number",
            Role::CorrespondentName => "correspondent_name",
            Role::DebitAmount => "debit_amount",
            Role::CreditAmount => "credit_amount",
            Role::DocumentReference => "document_reference",
        }
    }

    /// What kind of value the role holds once normalized.
    pub fn kind(&self) -> RoleKind {
        match self {
            Role::OperationDate => RoleKind::Date,
            Role::Amount | Role::DebitAmount | Role::CreditAmount => RoleKind::Amount,
            Role::DebitAccount
            | Role::CreditAccount
            | Role::AnalyticalDebit
            | Role::AnalyticalCredit
            | Role::AccountNumber
            | Role::CorrespondentNumber => RoleKind::Account,
            Role::DocumentType
            | Role::DocumentNumber
            | Role::Description
            | Role::PartnerName
            | Role::AccountName
            | Role::CorrespondentName
            | Role::DocumentReference => RoleKind::Text,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleKind {
    Date,
    Amount,
    Account,
    Text,
}

/// Opaque reference to the file a record was extracted from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceRef(pub String);

impl SourceRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One data row as read from the sheet, before any interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 1-based row number as shown by spreadsheet applications.
    pub row: usize,
    pub cells: BTreeMap<Role, Cell>,
    /// Every cell of the row keyed by its header label, kept for audit.
    pub payload: Map<String, Value>,
}

impl RawRow {
    pub fn get(&self, role: Role) -> Option<&Cell> {
        self.cells.get(&role).filter(|cell| !cell.is_blank())
    }
}

/// Typed value of a single normalized field.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedValue {
    Text(String),
    Date(NaiveDate),
    Amount(Decimal),
    Account(String),
}

/// A row whose fields passed normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    pub row: usize,
    pub fields: BTreeMap<Role, NormalizedValue>,
    pub payload: Map<String, Value>,
}

impl NormalizedRow {
    pub fn text(&self, role: Role) -> Option<&str> {
        match self.fields.get(&role) {
            Some(NormalizedValue::Text(value)) | Some(NormalizedValue::Account(value)) => {
                Some(value.as_str())
            }
            _ => None,
        }
    }

    pub fn amount(&self, role: Role) -> Option<Decimal> {
        match self.fields.get(&role) {
            Some(NormalizedValue::Amount(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn date(&self, role: Role) -> Option<NaiveDate> {
        match self.fields.get(&role) {
            Some(NormalizedValue::Date(value)) => Some(*value),
            _ => None,
        }
    }
}

/// The canonical accounting operation, independent of the source template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationRecord {
    pub source: SourceRef,
    pub operation_date: NaiveDate,
    pub document_type: Option<String>,
    pub document_number: Option<String>,
    pub debit_account: String,
    pub credit_account: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub partner_name: Option<String>,
    pub analytical_debit: Option<String>,
    pub analytical_credit: Option<String>,
    pub account_name: Option<String>,
    pub template: TemplateId,
    pub raw: Map<String, Value>,
}

/// Why a row did not produce a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    MissingField,
    UnparseableDate,
    UnparseableAmount,
    InvalidAmount,
    InvalidAccountPair,
}

/// A row-scoped failure. Reported next to the records, never dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub row: usize,
    pub field: Option<Role>,
    pub kind: IssueKind,
    /// Offending raw content, when there is any.
    pub value: Option<String>,
}

impl ValidationIssue {
    pub fn new(row: usize, field: Option<Role>, kind: IssueKind) -> Self {
        Self {
            row,
            field,
            kind,
            value: None,
        }
    }

    pub fn from_field_error(row: usize, field: Role, error: FieldError) -> Self {
        let (kind, value) = match error {
            FieldError::UnparseableDate(value) => (IssueKind::UnparseableDate, value),
            FieldError::UnparseableAmount(value) => (IssueKind::UnparseableAmount, value),
            FieldError::InvalidAmount(value) => (IssueKind::InvalidAmount, value),
        };
        Self {
            row,
            field: Some(field),
            kind,
            value: Some(value),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {:?}", self.row, self.kind)?;
        if let Some(field) = self.field {
            write!(f, " in {field}")?;
        }
        if let Some(value) = &self.value {
            write!(f, " ('{value}')")?;
        }
        Ok(())
    }
}

/// Inclusive date range; an open end is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }
}

/// Aggregate statistics over a set of operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub total_operations: usize,
    pub total_amount: Decimal,
    pub by_template: BTreeMap<TemplateId, usize>,
}
