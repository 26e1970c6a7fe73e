//! Shared parsing utilities for registry readers.
//!
//! Common date and number parsing functions used across multiple dialect
//! readers.

use chrono::{NaiveDate, NaiveDateTime};

/// Date formats seen in the registries, most common first.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];

/// Date-time formats seen in the registries, most common first.
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
];

/// Parses a calendar date. Accepts plain dates as well as date-times, in
/// which case the time of day is discarded.
#[must_use]
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
        .or_else(|| parse_date_time(s).map(|dt| dt.date()))
}

/// Parses a date-time in any of the registry formats.
#[must_use]
pub fn parse_date_time(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
}

/// Parses an optional date field: empty means absent, anything else must
/// parse.
///
/// # Errors
///
/// Returns the offending text when it is non-empty and not a date.
pub fn parse_optional_date(s: &str) -> Result<Option<NaiveDate>, String> {
    if s.trim().is_empty() {
        return Ok(None);
    }
    parse_date(s)
        .map(Some)
        .ok_or_else(|| format!("invalid date {s:?}"))
}

/// Parses a floating-point field, accepting a decimal comma.
///
/// # Errors
///
/// Returns a description of the failure.
pub fn parse_f64(field: &str, s: &str) -> Result<f64, String> {
    let trimmed = s.trim();
    trimmed
        .parse::<f64>()
        .or_else(|_| trimmed.replace(',', ".").parse::<f64>())
        .map_err(|_| format!("invalid {field} {s:?}"))
}

/// Returns `None` for empty or whitespace-only strings, otherwise the
/// trimmed value.
#[must_use]
pub fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
