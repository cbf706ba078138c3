//! Value normalization: dates, calendar weeks and locale decimals.
//!
//! Everything here is pure. Callers attach row/column context to errors.

use chrono::{Datelike, NaiveDate};

use crate::domain::WeekLabel;
use crate::error::ParseError;

/// Date format used by both sheets.
pub const SHEET_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse `text` strictly with `format`; blanks are rejected too.
pub fn parse_date(text: &str, format: &str) -> Result<NaiveDate, ParseError> {
    let trimmed = text.trim();
    NaiveDate::parse_from_str(trimmed, format)
        .map_err(|_| ParseError::new(trimmed, format!("date (expected {format})")))
}

/// ISO-8601 week number (1..=53).
pub fn week_number(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

pub fn derive_week_label(date: NaiveDate) -> WeekLabel {
    WeekLabel::from_week(week_number(date))
}

/// Parse a decimal that may use `,` as its separator.
pub fn normalize_decimal(text: &str) -> Result<f64, ParseError> {
    let replaced = text.trim().replace(',', ".");
    match replaced.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ParseError::new(text.trim(), "decimal")),
    }
}
