//! Daily station readings.
//!
//! A station file is the concatenation of monthly downloads with their
//! header rows stripped. Columns are positional; only the date parts and
//! the daily maximum temperature are used.

use std::io::Read;

use chrono::NaiveDate;

use crate::ClimateError;

const YEAR_COLUMN: usize = 5;
const MONTH_COLUMN: usize = 6;
const DAY_COLUMN: usize = 7;
const MAX_TEMP_COLUMN: usize = 9;

/// One day's maximum temperature at a station.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyReading {
    pub date: NaiveDate,
    /// Maximum temperature in °C.
    pub max_temp: f64,
}

/// Reads a station file and returns its readings sorted by date.
///
/// Days without a maximum temperature are skipped. The sort is stable, so
/// repeated dates keep their file order.
///
/// # Errors
///
/// Returns [`ClimateError::Malformed`] for the first row whose date or
/// temperature does not parse.
pub fn read_daily(reader: impl Read, label: &str) -> Result<Vec<DailyReading>, ClimateError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut readings = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let row = result?;
        let malformed = |message: String| ClimateError::Malformed {
            source_name: label.to_string(),
            row: i + 1,
            message,
        };

        let max_temp = row.get(MAX_TEMP_COLUMN).unwrap_or_default().trim();
        if max_temp.is_empty() {
            continue;
        }
        let max_temp: f64 = max_temp
            .parse()
            .map_err(|_| malformed(format!("invalid max temperature {max_temp:?}")))?;

        let field = |column: usize| row.get(column).unwrap_or_default().trim();
        let date = match (
            field(YEAR_COLUMN).parse::<i32>(),
            field(MONTH_COLUMN).parse::<u32>(),
            field(DAY_COLUMN).parse::<u32>(),
        ) {
            (Ok(y), Ok(m), Ok(d)) => NaiveDate::from_ymd_opt(y, m, d),
            _ => None,
        }
        .ok_or_else(|| {
            malformed(format!(
                "invalid date {}-{}-{}",
                field(YEAR_COLUMN),
                field(MONTH_COLUMN),
                field(DAY_COLUMN)
            ))
        })?;

        readings.push(DailyReading { date, max_temp });
    }

    readings.sort_by_key(|r| r.date);
    Ok(readings)
}
