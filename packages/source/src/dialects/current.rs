//! Post-2020 civil-security events.
//!
//! Positional CSV with a header row and 14 columns:
//!
//! | # | column |
//! |---|--------|
//! | 0 | `code_alea` |
//! | 1 | `alea` |
//! | 2 | `code_municipalite` |
//! | 3 | `municipalite` |
//! | 4 | `precision_localisation` |
//! | 6 | `severite` |
//! | 7 | `date_signalement` |
//! | 8 | `date_debut` |
//! | 12 | `coord_x` (longitude) |
//! | 13 | `coord_y` (latitude) |

use std::io::Read;

use climate_map_source_models::{CurrentRecord, RawRecord};

use crate::SourceError;
use crate::dialects::malformed;
use crate::parsing::{parse_f64, parse_optional_date};

const COLUMN_COUNT: usize = 14;

/// Reads a current-registry CSV.
///
/// # Errors
///
/// Returns [`SourceError`] on CSV errors, rows with the wrong column count,
/// unparseable dates or coordinates, and rows with neither a start nor a
/// reported date.
pub fn read(reader: impl Read, label: &str) -> Result<Vec<RawRecord>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let row = result?;
        let record = parse_row(&row).map_err(|message| malformed(label, i + 1, message))?;
        records.push(RawRecord::Current(record));
    }
    Ok(records)
}

fn parse_row(row: &csv::StringRecord) -> Result<CurrentRecord, String> {
    if row.len() != COLUMN_COUNT {
        return Err(format!(
            "expected {COLUMN_COUNT} columns, found {}",
            row.len()
        ));
    }
    let field = |i: usize| row.get(i).unwrap_or_default();

    let reported_on = parse_optional_date(field(7))?;
    let started_on = parse_optional_date(field(8))?;
    if reported_on.is_none() && started_on.is_none() {
        return Err("missing both date_debut and date_signalement".to_string());
    }

    Ok(CurrentRecord {
        hazard_code: field(0).trim().to_string(),
        hazard: field(1).to_string(),
        municipality_code: field(2).trim().to_string(),
        municipality: field(3).trim().to_string(),
        location_precision: field(4).trim().to_string(),
        severity: field(6).to_string(),
        reported_on,
        started_on,
        coord_x: parse_f64("coord_x", field(12))?,
        coord_y: parse_f64("coord_y", field(13))?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    const HEADER: &str = "code_alea,alea,code_municipalite,municipalite,precision_localisation,\
        nom_cours_eau,severite,date_signalement,date_debut,date_fin,commentaire,source,coord_x,coord_y\n";

    #[test]
    fn reads_rows() {
        let csv = format!(
            "{HEADER}\
             8,Inondation,23027,Québec,Imprécise,,Menace importante,2021-04-10,2021-04-09,,,,-71.22,46.81\n\
             139,Tornade,66023,Montréal,Précise,,Menace mineure,2022-06-01,,,,,-73.57,45.50\n"
        );
        let records = read(csv.as_bytes(), "sample").unwrap();
        assert_eq!(records.len(), 2);

        let RawRecord::Current(first) = &records[0] else {
            panic!("expected current record");
        };
        assert_eq!(first.hazard_code, "8");
        assert_eq!(first.municipality_code, "23027");
        assert_eq!(first.location_precision, "Imprécise");
        assert_eq!(first.started_on, NaiveDate::from_ymd_opt(2021, 4, 9));
        assert!((first.coord_x + 71.22).abs() < f64::EPSILON);
        assert!((first.coord_y - 46.81).abs() < f64::EPSILON);

        let RawRecord::Current(second) = &records[1] else {
            panic!("expected current record");
        };
        assert_eq!(second.started_on, None);
        assert_eq!(second.reported_on, NaiveDate::from_ymd_opt(2022, 6, 1));
    }

    #[test]
    fn rejects_short_row() {
        let csv = format!("{HEADER}8,Inondation,23027\n");
        let err = read(csv.as_bytes(), "sample").unwrap_err();
        assert!(matches!(err, SourceError::Malformed { row: 1, .. }), "{err}");
    }

    #[test]
    fn rejects_bad_coordinate() {
        let csv = format!(
            "{HEADER}8,Inondation,23027,Québec,,,Menace importante,2021-04-10,,,,,west,46.81\n"
        );
        assert!(read(csv.as_bytes(), "sample").is_err());
    }

    #[test]
    fn rejects_missing_dates() {
        let csv = format!(
            "{HEADER}8,Inondation,23027,Québec,,,Menace importante,,,,,,-71.2,46.8\n"
        );
        assert!(read(csv.as_bytes(), "sample").is_err());
    }
}
