//! Conversion of raw cells into canonical typed values.
//!
//! Every function here looks at a single cell. Rules that relate several
//! fields of a row live in [`crate::build`].

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::FieldError;
use crate::model::worksheet::{format_number, serial_to_date};
use crate::model::{Cell, NormalizedRow, NormalizedValue, RawRow, Role, RoleKind, ValidationIssue};

/// Fractional digits of a canonical amount.
pub const AMOUNT_SCALE: u32 = 2;

const CURRENCY_MARKERS: [&str; 8] = ["лв.", "лв", "bgn", "eur", "usd", "€", "$", "£"];

const LONG_DATE_FORMATS: [&str; 6] = [
    "%d.%m.%Y", "%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d",
];

const SHORT_DATE_FORMATS: [&str; 3] = ["%d.%m.%y", "%d/%m/%y", "%d-%m-%y"];

const ESCAPES: [(&str, &str); 8] = [
    ("_x000D_", ""),
    ("_x000A_", " "),
    ("\\n", " "),
    ("\\t", " "),
    ("&quot;", "\""),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&amp;", "&"),
];

/// Normalizes one raw cell according to the kind of its role.
///
/// Blank input yields `Ok(None)`: an explicit absence, never an empty string.
pub fn normalize(
    raw: &Cell,
    role: Role,
    signed_allowed: bool,
) -> Result<Option<NormalizedValue>, FieldError> {
    Ok(match role.kind() {
        RoleKind::Date => normalize_date(raw)?.map(NormalizedValue::Date),
        RoleKind::Amount => normalize_amount(raw, signed_allowed)?.map(NormalizedValue::Amount),
        RoleKind::Account => normalize_account(raw).map(NormalizedValue::Account),
        RoleKind::Text => normalize_text(raw).map(NormalizedValue::Text),
    })
}

/// Normalizes every field of a row. The first failing field, in role order,
/// turns the row into a [`ValidationIssue`].
pub fn normalize_row(raw: &RawRow, signed_allowed: bool) -> Result<NormalizedRow, ValidationIssue> {
    let mut fields = BTreeMap::new();
    for (role, cell) in &raw.cells {
        match normalize(cell, *role, signed_allowed) {
            Ok(Some(value)) => {
                fields.insert(*role, value);
            }
            Ok(None) => {}
            Err(error) => return Err(ValidationIssue::from_field_error(raw.row, *role, error)),
        }
    }
    Ok(NormalizedRow {
        row: raw.row,
        fields,
        payload: raw.payload.clone(),
    })
}

/// Dates: spreadsheet serials (typed or numeric) and day-month-year text.
pub fn normalize_date(cell: &Cell) -> Result<Option<NaiveDate>, FieldError> {
    match cell {
        _ if cell.is_blank() => Ok(None),
        Cell::DateTime(serial) | Cell::Number(serial) => serial_to_date(*serial)
            .map(Some)
            .ok_or_else(|| FieldError::UnparseableDate(cell.to_string())),
        Cell::Text(text) => parse_date_text(text)
            .map(Some)
            .ok_or_else(|| FieldError::UnparseableDate(text.trim().to_string())),
        Cell::Bool(_) | Cell::Empty => Err(FieldError::UnparseableDate(cell.to_string())),
    }
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    let trimmed = trimmed
        .strip_suffix("г.")
        .or_else(|| trimmed.strip_suffix('г'))
        .unwrap_or(trimmed)
        .trim_end();

    let date_part = trimmed
        .split(|ch: char| ch.is_whitespace() || ch == 'T')
        .next()
        .unwrap_or_default();

    if !date_part.is_empty() && date_part.len() <= 7 && date_part.chars().all(|ch| ch.is_ascii_digit())
    {
        return date_part.parse::<f64>().ok().and_then(serial_to_date);
    }

    LONG_DATE_FORMATS
        .iter()
        .filter_map(|format| NaiveDate::parse_from_str(date_part, format).ok())
        .find(|date| date.year() >= 1000)
        .or_else(|| {
            SHORT_DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(date_part, format).ok())
        })
}

/// Amounts: numbers, or text with locale separators and currency markers,
/// canonicalised to two fractional digits.
pub fn normalize_amount(cell: &Cell, signed_allowed: bool) -> Result<Option<Decimal>, FieldError> {
    let parsed = match cell {
        _ if cell.is_blank() => return Ok(None),
        Cell::Number(value) => Decimal::from_f64(*value)
            .ok_or_else(|| FieldError::UnparseableAmount(cell.to_string()))?,
        Cell::Text(text) => match parse_amount_text(text)? {
            Some(value) => value,
            None => return Ok(None),
        },
        Cell::Bool(_) | Cell::DateTime(_) | Cell::Empty => {
            return Err(FieldError::UnparseableAmount(cell.to_string()));
        }
    };

    let mut amount = canonical_amount(parsed);
    if amount.is_zero() {
        amount.set_sign_positive(true);
    }
    if amount < Decimal::ZERO && !signed_allowed {
        return Err(FieldError::InvalidAmount(cell.to_string().trim().to_string()));
    }
    Ok(Some(amount))
}

/// Rounds half away from zero and pins the scale to [`AMOUNT_SCALE`].
pub fn canonical_amount(value: Decimal) -> Decimal {
    let mut value = value.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero);
    value.rescale(AMOUNT_SCALE);
    value
}

fn parse_amount_text(text: &str) -> Result<Option<Decimal>, FieldError> {
    let unparseable = || FieldError::UnparseableAmount(text.trim().to_string());

    let mut value = text.trim().to_lowercase().replace('\u{2212}', "-");
    for marker in CURRENCY_MARKERS {
        value = value.replace(marker, "");
    }
    let mut value = value.trim().to_string();

    let mut negative = false;
    if let Some(inner) = value.strip_prefix('(').and_then(|rest| rest.strip_suffix(')')) {
        negative = true;
        value = inner.trim().to_string();
    }
    if let Some(rest) = value.strip_prefix('-') {
        negative = !negative;
        value = rest.trim().to_string();
    } else if let Some(rest) = value.strip_suffix('-') {
        negative = !negative;
        value = rest.trim().to_string();
    } else if let Some(rest) = value.strip_prefix('+') {
        value = rest.trim().to_string();
    }

    let digits: String = value
        .chars()
        .filter(|ch| !ch.is_whitespace() && *ch != '\'' && *ch != '\u{a0}' && *ch != '\u{202f}')
        .collect();

    if digits.is_empty() {
        return if negative { Err(unparseable()) } else { Ok(None) };
    }
    if !digits.chars().all(|ch| ch.is_ascii_digit() || ch == '.' || ch == ',') {
        return Err(unparseable());
    }
    if !digits.chars().any(|ch| ch.is_ascii_digit()) {
        return Err(unparseable());
    }

    let mut canonical = resolve_separators(&digits).ok_or_else(unparseable)?;
    if canonical.starts_with('.') {
        canonical.insert(0, '0');
    }
    if canonical.ends_with('.') {
        canonical.pop();
    }

    let amount = Decimal::from_str(&canonical).map_err(|_| unparseable())?;
    Ok(Some(if negative { -amount } else { amount }))
}

/// Rewrites a string of digits, dots and commas into `digits[.digits]`.
///
/// With both separators present the last one is the decimal separator. A
/// separator occurring once is decimal, several times it groups thousands.
fn resolve_separators(digits: &str) -> Option<String> {
    let dots = digits.matches('.').count();
    let commas = digits.matches(',').count();

    match (dots, commas) {
        (0, 0) | (1, 0) => Some(digits.to_string()),
        (_, 0) => Some(digits.replace('.', "")),
        (0, 1) => Some(digits.replace(',', ".")),
        (0, _) => Some(digits.replace(',', "")),
        _ => {
            let last_dot = digits.rfind('.')?;
            let last_comma = digits.rfind(',')?;
            let (decimal, grouping, decimal_count) = if last_dot > last_comma {
                ('.', ',', dots)
            } else {
                (',', '.', commas)
            };
            if decimal_count != 1 {
                return None;
            }
            Some(
                digits
                    .replace(grouping, "")
                    .replace(decimal, "."),
            )
        }
    }
}

/// Account codes: a leading code wins over a trailing name, and internal
/// separators become `/`.
pub fn normalize_account(cell: &Cell) -> Option<String> {
    let text = match cell {
        _ if cell.is_blank() => return None,
        Cell::Number(value) => format_number(*value),
        other => other.to_string(),
    };
    let text = collapse_whitespace(&text);

    if !text.starts_with(|ch: char| ch.is_ascii_digit()) {
        // "A-12.3 Каса": a leading token carrying digits is a code.
        let first = text.split_whitespace().next().unwrap_or_default();
        if first.chars().any(|ch| ch.is_ascii_digit()) {
            return join_code(first);
        }
        return Some(text).filter(|value| !value.is_empty());
    }

    let code_end = text
        .char_indices()
        .find(|(_, ch)| !(ch.is_ascii_digit() || is_account_separator(*ch)))
        .map(|(index, _)| index)
        .unwrap_or(text.len());
    let (code, rest) = text.split_at(code_end);
    let code = if rest.chars().any(char::is_alphabetic) {
        code
    } else {
        text.as_str()
    };
    join_code(code)
}

/// Rewrites every separator run of a code as a single `/`.
fn join_code(code: &str) -> Option<String> {
    let mut normalized = String::with_capacity(code.len());
    for ch in code.chars() {
        if is_account_separator(ch) {
            if !normalized.is_empty() && !normalized.ends_with('/') {
                normalized.push('/');
            }
        } else {
            normalized.push(ch);
        }
    }
    while normalized.ends_with('/') {
        normalized.pop();
    }
    Some(normalized).filter(|value| !value.is_empty())
}

fn is_account_separator(ch: char) -> bool {
    matches!(ch, '.' | '-' | '\\' | '|' | '/' | ':') || ch.is_whitespace()
}

/// Fuses an account number and its human-readable name into one code. The
/// number wins; without one, the leading code of the name is used.
pub fn fuse_account(number: &Cell, name: &Cell) -> Option<String> {
    normalize_account(number).or_else(|| normalize_account(name))
}

/// Free text: unescaped, trimmed, whitespace runs collapsed.
pub fn normalize_text(cell: &Cell) -> Option<String> {
    let text = match cell {
        _ if cell.is_blank() => return None,
        Cell::Text(text) => ESCAPES
            .iter()
            .fold(text.clone(), |acc, (from, to)| acc.replace(from, to)),
        other => other.to_string(),
    };
    Some(collapse_whitespace(&text)).filter(|value| !value.is_empty())
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
