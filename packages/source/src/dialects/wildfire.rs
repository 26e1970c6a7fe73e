//! Forest-fire registry.
//!
//! CSV export of the registry attribute table. Only the columns used
//! downstream are read; the numeric key is stored as a decimal in the
//! export (`"412.0"`). The event year comes from `DATE_DEBUT`.

use std::io::Read;

use climate_map_source_models::{RawRecord, WildfireRecord};
use serde::Deserialize;

use crate::SourceError;
use crate::dialects::malformed;
use crate::parsing::{parse_date, parse_f64};

#[derive(Debug, Deserialize)]
struct WildfireRow {
    #[serde(rename = "CLE")]
    key: String,
    #[serde(rename = "DATE_DEBUT")]
    started_on: String,
    #[serde(rename = "LATITUDE")]
    latitude: String,
    #[serde(rename = "LONGITUDE")]
    longitude: String,
    #[serde(rename = "SUP_HA")]
    area_ha: String,
}

/// Reads a forest-fire registry export.
///
/// # Errors
///
/// Returns [`SourceError`] on CSV errors or the first row with a field that
/// does not parse.
pub fn read(reader: impl Read, label: &str) -> Result<Vec<RawRecord>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let mut records = Vec::new();
    for (i, result) in reader.deserialize::<WildfireRow>().enumerate() {
        let row = result?;
        let record = convert(&row).map_err(|message| malformed(label, i + 1, message))?;
        records.push(RawRecord::Wildfire(record));
    }
    Ok(records)
}

#[allow(clippy::cast_possible_truncation)]
fn convert(row: &WildfireRow) -> Result<WildfireRecord, String> {
    let key = parse_f64("CLE", &row.key)?;
    let started_on = parse_date(&row.started_on)
        .ok_or_else(|| format!("invalid DATE_DEBUT {:?}", row.started_on))?;

    Ok(WildfireRecord {
        key: key.trunc() as i64,
        started_on,
        latitude: parse_f64("LATITUDE", &row.latitude)?,
        longitude: parse_f64("LONGITUDE", &row.longitude)?,
        area_ha: parse_f64("SUP_HA", &row.area_ha)?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn reads_rows() {
        let csv = "CLE,ANNEE,DATE_DEBUT,LATITUDE,LONGITUDE,SUP_HA,CAUSE\n\
                   412.0,2011.0,2011-07-02,49.51,-74.32,1520.4,Foudre\n\
                   413,2012,2012/06/15,48.2,-77.0,\"0,5\",Humaine\n";
        let records = read(csv.as_bytes(), "fires").unwrap();
        assert_eq!(records.len(), 2);

        let RawRecord::Wildfire(first) = &records[0] else {
            panic!("expected wildfire record");
        };
        assert_eq!(first.key, 412);
        assert_eq!(first.started_on, NaiveDate::from_ymd_opt(2011, 7, 2).unwrap());
        assert!((first.area_ha - 1520.4).abs() < 1e-9);

        let RawRecord::Wildfire(second) = &records[1] else {
            panic!("expected wildfire record");
        };
        assert!((second.area_ha - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn year_column_is_not_required() {
        let csv = "CLE,DATE_DEBUT,LATITUDE,LONGITUDE,SUP_HA\n\
                   7,2015-08-20,50.1,-72.0,12.5\n";
        let records = read(csv.as_bytes(), "fires").unwrap();
        let RawRecord::Wildfire(fire) = &records[0] else {
            panic!("expected wildfire record");
        };
        assert_eq!(fire.started_on, NaiveDate::from_ymd_opt(2015, 8, 20).unwrap());
    }

    #[test]
    fn rejects_missing_area() {
        let csv = "CLE,ANNEE,DATE_DEBUT,LATITUDE,LONGITUDE,SUP_HA\n\
                   1,2011,2011-07-02,49.5,-74.3,\n";
        let err = read(csv.as_bytes(), "fires").unwrap_err();
        assert!(matches!(err, SourceError::Malformed { row: 1, .. }), "{err}");
    }
}
