use std::collections::{BTreeMap, HashSet};

use serde_json::Map;

use crate::error::ConfigurationMismatch;
use crate::model::worksheet::column_letter;
use crate::model::{Cell, RawRow, Role, Worksheet};
use crate::template::detect::normalize_header;
use crate::template::{ColumnSource, Label, TemplateDescriptor};

/// Leading words of the totals rows closing an export.
const FOOTER_MARKERS: [&str; 4] = ["общо", "всичко", "оборот", "total"];

const ACCOUNT_ROLES: [Role; 4] = [
    Role::DebitAccount,
    Role::CreditAccount,
    Role::AccountNumber,
    Role::CorrespondentNumber,
];

/// Role → column bindings of one sheet, resolved once per file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    bindings: Vec<(Role, usize)>,
    payload_keys: Vec<String>,
}

impl ColumnMap {
    /// Binds every column spec of `descriptor` against the header row.
    ///
    /// Exact header matches win over substring matches, each column is bound
    /// at most once and the leftmost free column wins, so repeated headers are
    /// bound in descriptor order.
    pub fn resolve(
        sheet: &Worksheet,
        descriptor: &TemplateDescriptor,
        header_row: usize,
    ) -> Result<Self, ConfigurationMismatch> {
        let headers = sheet.row_text(header_row);
        let tokens: Vec<String> = headers.iter().map(|value| normalize_header(value)).collect();
        let width = sheet.width();
        let mut bound = vec![false; width.max(tokens.len())];
        let mut bindings = Vec::with_capacity(descriptor.columns.len());

        for spec in descriptor.columns {
            let column = match spec.source {
                ColumnSource::Position(column) => (column < width).then_some(column),
                ColumnSource::Header(aliases) => find_column(&tokens, &bound, aliases),
            };
            match column {
                Some(column) => {
                    bound[column] = true;
                    bindings.push((spec.role, column));
                }
                None if spec.required => {
                    return Err(ConfigurationMismatch::MissingColumn {
                        template: descriptor.id,
                        role: spec.role,
                    });
                }
                None => {}
            }
        }

        Ok(Self {
            bindings,
            payload_keys: payload_keys(&headers, width),
        })
    }

    pub fn column_of(&self, role: Role) -> Option<usize> {
        self.bindings
            .iter()
            .find(|(bound_role, _)| *bound_role == role)
            .map(|(_, column)| *column)
    }

    pub fn bindings(&self) -> &[(Role, usize)] {
        &self.bindings
    }

    fn raw_row(&self, index: usize, cells: &[Cell]) -> RawRow {
        let mut roles = BTreeMap::new();
        for (role, column) in &self.bindings {
            roles.insert(*role, cells.get(*column).cloned().unwrap_or(Cell::Empty));
        }

        let mut payload = Map::new();
        for (column, cell) in cells.iter().enumerate() {
            if cell.is_blank() {
                continue;
            }
            let key = self
                .payload_keys
                .get(column)
                .cloned()
                .unwrap_or_else(|| column_letter(column));
            payload.insert(key, cell.to_json());
        }

        RawRow {
            row: index + 1,
            cells: roles,
            payload,
        }
    }

    /// A totals row opens with a footer marker and carries neither an
    /// account nor an operation date.
    fn is_footer(&self, cells: &[Cell]) -> bool {
        let filled = |column: &usize| cells.get(*column).is_some_and(|cell| !cell.is_blank());
        let has_posting = self.bindings.iter().any(|(role, column)| {
            (ACCOUNT_ROLES.contains(role) || *role == Role::OperationDate) && filled(column)
        });
        if has_posting {
            return false;
        }
        match cells.iter().find(|cell| !cell.is_blank()) {
            Some(Cell::Text(text)) => {
                let text = normalize_header(text);
                FOOTER_MARKERS.iter().any(|marker| text.starts_with(marker))
            }
            _ => false,
        }
    }
}

fn find_column(tokens: &[String], bound: &[bool], aliases: Label) -> Option<usize> {
    let free = |index: &usize| !bound[*index];
    aliases
        .iter()
        .find_map(|alias| {
            (0..tokens.len())
                .filter(free)
                .find(|&index| tokens[index] == *alias)
        })
        .or_else(|| {
            aliases.iter().find_map(|alias| {
                (0..tokens.len())
                    .filter(free)
                    .find(|&index| !tokens[index].is_empty() && tokens[index].contains(alias))
            })
        })
}

/// Audit keys: the header label, or the column letter when the label is
/// blank or already taken.
fn payload_keys(headers: &[String], width: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    (0..width)
        .map(|column| {
            let letter = column_letter(column);
            let label = headers
                .get(column)
                .map(|value| value.split_whitespace().collect::<Vec<_>>().join(" "))
                .unwrap_or_default();
            let key = if label.is_empty() {
                letter
            } else if seen.contains(&label) {
                format!("{label} ({letter})")
            } else {
                label
            };
            seen.insert(key.clone());
            key
        })
        .collect()
}

/// Lazy, single-pass sequence of the data rows below the header.
///
/// Blank rows and totals rows are skipped; cell content is not validated.
#[derive(Debug)]
pub struct Rows<'a> {
    sheet: &'a Worksheet,
    columns: ColumnMap,
    next: usize,
}

impl Rows<'_> {
    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }
}

impl Iterator for Rows<'_> {
    type Item = RawRow;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let index = self.next;
            let cells = self.sheet.row(index)?;
            self.next += 1;

            if cells.iter().all(Cell::is_blank) || self.columns.is_footer(cells) {
                continue;
            }
            return Some(self.columns.raw_row(index, cells));
        }
    }
}

/// Starts extraction of the rows below `header_row`.
///
/// A required column missing from the sheet fails here, once, before any
/// row is produced.
pub fn extract<'a>(
    sheet: &'a Worksheet,
    descriptor: &TemplateDescriptor,
    header_row: usize,
) -> Result<Rows<'a>, ConfigurationMismatch> {
    let columns = ColumnMap::resolve(sheet, descriptor, header_row)?;
    Ok(Rows {
        sheet,
        columns,
        next: header_row + 1,
    })
}
