use std::fmt;

use chrono::{Days, NaiveDate};
use serde_json::Value;

/// Largest serial a spreadsheet date can carry (9999-12-31).
pub const MAX_DATE_SERIAL: f64 = 2_958_465.0;

/// A decoded, typed spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Date/time cell, stored as the spreadsheet serial day count.
    DateTime(f64),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// True for empty cells and text cells holding only whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(value) => value.trim().is_empty(),
            _ => false,
        }
    }

    /// JSON form used for the raw audit payload of a row.
    pub fn to_json(&self) -> Value {
        match self {
            Cell::Empty => Value::Null,
            Cell::Text(value) => Value::String(value.clone()),
            Cell::Number(value) => serde_json::Number::from_f64(*value)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Cell::Bool(value) => Value::Bool(*value),
            Cell::DateTime(serial) => match serial_to_date(*serial) {
                Some(date) => Value::String(date.to_string()),
                None => serde_json::Number::from_f64(*serial)
                    .map(Value::Number)
                    .unwrap_or(Value::Null),
            },
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(value) => f.write_str(value),
            Cell::Number(value) => write!(f, "{}", format_number(*value)),
            Cell::Bool(value) => write!(f, "{value}"),
            Cell::DateTime(serial) => match serial_to_date(*serial) {
                Some(date) => write!(f, "{}", date.format("%d.%m.%Y")),
                None => write!(f, "{serial}"),
            },
        }
    }
}

/// Renders integral numbers without a trailing `.0`.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Converts a spreadsheet serial day number into a calendar date.
///
/// The epoch is 1899-12-30, which absorbs the phantom 1900-02-29 of the
/// 1900 date system for every serial after February 1900.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..=MAX_DATE_SERIAL).contains(&serial) {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(serial.floor() as u64))
}

/// An in-memory worksheet: rows of typed cells at their sheet positions.
///
/// Row `0` is the first row of the sheet and column `0` is column `A`, so a
/// sheet whose data starts at `C3` carries two leading empty rows and two
/// leading empty cells on every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Worksheet {
    pub name: String,
    rows: Vec<Vec<Cell>>,
}

impl Worksheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Builds a worksheet from plain strings, mapping blank strings to
    /// [`Cell::Empty`]. Handy for fixtures and text-based sources.
    pub fn from_text_rows<R, S>(name: impl Into<String>, rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|value| {
                        let value = value.as_ref();
                        if value.trim().is_empty() {
                            Cell::Empty
                        } else {
                            Cell::text(value)
                        }
                    })
                    .collect()
            })
            .collect();
        Self::new(name, rows)
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[Cell]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of columns of the widest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Text of every cell of a row, used as header tokens.
    pub fn row_text(&self, index: usize) -> Vec<String> {
        self.row(index)
            .map(|cells| cells.iter().map(Cell::to_string).collect())
            .unwrap_or_default()
    }
}

/// Spreadsheet column letter for a zero-based column index (`0` → `A`).
pub fn column_letter(index: usize) -> String {
    let mut index = index + 1;
    let mut letters = Vec::new();
    while index > 0 {
        let rem = (index - 1) % 26;
        letters.push(b'A' + rem as u8);
        index = (index - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}
