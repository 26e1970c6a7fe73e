//! Heat-wave registry written by the station derivation step.

use std::io::{Read, Write};

use climate_map_source_models::{HeatWaveRecord, RawRecord};

use crate::SourceError;

/// Column header of the heat-wave registry.
pub const HEADER: [&str; 6] = [
    "name",
    "station_id",
    "longitude",
    "latitude",
    "start_date",
    "duration_days",
];

/// Reads a heat-wave registry.
///
/// # Errors
///
/// Returns [`SourceError::Csv`] on the first row that does not deserialize.
pub fn read(reader: impl Read, _label: &str) -> Result<Vec<RawRecord>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    reader
        .deserialize::<HeatWaveRecord>()
        .map(|result| result.map(RawRecord::HeatWave).map_err(SourceError::from))
        .collect()
}

/// Writes heat-wave rows with a header, in the order given.
///
/// # Errors
///
/// Returns [`SourceError::Csv`] if a row cannot be written.
pub fn write<'a>(
    writer: impl Write,
    records: impl IntoIterator<Item = &'a HeatWaveRecord>,
) -> Result<(), SourceError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(HEADER)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush().map_err(|e| SourceError::Io {
        path: "heat-wave registry".into(),
        source: e,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn record(name: &str, day: u32, duration_days: u32) -> HeatWaveRecord {
        HeatWaveRecord {
            name: name.to_string(),
            station_id: "7024745".to_string(),
            longitude: -73.74,
            latitude: 45.47,
            start_date: NaiveDate::from_ymd_opt(2018, 7, day).unwrap(),
            duration_days,
        }
    }

    #[test]
    fn written_registry_reads_back() {
        let rows = vec![record("Montréal", 1, 6), record("", 20, 3)];
        let mut buf = Vec::new();
        write(&mut buf, &rows).unwrap();

        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.starts_with("name,station_id,longitude,latitude,start_date,duration_days\n"));
        assert!(text.contains("2018-07-01,6"));

        let records = read(buf.as_slice(), "heat").unwrap();
        assert_eq!(records, vec![
            RawRecord::HeatWave(rows[0].clone()),
            RawRecord::HeatWave(rows[1].clone()),
        ]);
    }

    #[test]
    fn rejects_bad_duration() {
        let csv = "name,station_id,longitude,latitude,start_date,duration_days\n\
                   Laval,702,-73.7,45.5,2018-07-01,three\n";
        assert!(matches!(
            read(csv.as_bytes(), "heat"),
            Err(SourceError::Csv(_))
        ));
    }
}
