//! Heat-wave registry generation from downloaded station files.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;

use climate_map_source::dialects::heat_wave;
use climate_map_source::progress::ProgressCallback;
use climate_map_source_models::HeatWaveRecord;
use rayon::prelude::*;

use crate::ClimateError;
use crate::readings::{DailyReading, read_daily};
use crate::runs::heat_wave_runs;
use crate::stations::Station;

/// Heat waves found in one station's readings, in date order.
#[must_use]
pub fn station_heat_waves(station: &Station, readings: &[DailyReading]) -> Vec<HeatWaveRecord> {
    heat_wave_runs(readings)
        .into_iter()
        .map(|run| HeatWaveRecord {
            name: station.name.clone(),
            station_id: station.climate_id.clone(),
            longitude: station.location.lng,
            latitude: station.location.lat,
            start_date: run.start,
            duration_days: run.length,
        })
        .collect()
}

/// Path of a station's downloaded readings.
#[must_use]
pub fn station_file(climate_dir: &Path, climate_id: &str) -> std::path::PathBuf {
    climate_dir.join(format!("{climate_id}.csv"))
}

/// Scans every station's file and writes the heat-wave registry to
/// `output`. Rows are grouped by station, in `stations` order. The
/// registry is only replaced once every station has been scanned.
///
/// Returns the number of heat waves written.
///
/// # Errors
///
/// Returns [`ClimateError`] if a station file is missing or malformed, or
/// the registry cannot be written.
pub fn write_heat_wave_registry(
    stations: &[Station],
    climate_dir: &Path,
    output: &Path,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<usize, ClimateError> {
    progress.set_total(stations.len() as u64);
    progress.set_message("Scanning station readings".to_string());

    let per_station: Vec<Vec<HeatWaveRecord>> = stations
        .par_iter()
        .map(|station| {
            let result = scan_station(station, climate_dir);
            progress.inc(1);
            result
        })
        .collect::<Result<_, _>>()?;
    let records: Vec<HeatWaveRecord> = per_station.into_iter().flatten().collect();

    let file = File::create(output).map_err(|e| ClimateError::io(output, e))?;
    heat_wave::write(BufWriter::new(file), &records)?;

    progress.finish(format!("{} heat waves found", records.len()));
    log::info!(
        "Wrote {} heat waves from {} stations to {}",
        records.len(),
        stations.len(),
        output.display()
    );
    Ok(records.len())
}

fn scan_station(station: &Station, climate_dir: &Path) -> Result<Vec<HeatWaveRecord>, ClimateError> {
    let path = station_file(climate_dir, &station.climate_id);
    let file = File::open(&path).map_err(|e| ClimateError::io(&path, e))?;

    let readings = read_daily(BufReader::new(file), &path.display().to_string())?;
    let heat_waves = station_heat_waves(station, &readings);
    log::debug!(
        "Station {}: {} readings, {} heat waves",
        station.climate_id,
        readings.len(),
        heat_waves.len()
    );
    Ok(heat_waves)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use climate_map_catastrophe_models::LngLat;
    use climate_map_source::progress::null_progress;

    use super::*;

    fn station(id: &str) -> Station {
        Station {
            climate_id: id.to_string(),
            name: "Montréal".to_string(),
            location: LngLat::new(-73.74, 45.47),
            first_year: 1990,
            last_year: 2024,
        }
    }

    #[test]
    fn labels_runs_with_station() {
        let start = NaiveDate::from_ymd_opt(2018, 6, 30).unwrap();
        let readings: Vec<DailyReading> = [25.0, 31.0, 32.0, 33.0, 34.0, 20.0]
            .iter()
            .zip(start.iter_days())
            .map(|(&max_temp, date)| DailyReading { date, max_temp })
            .collect();

        let records = station_heat_waves(&station("7025250"), &readings);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].station_id, "7025250");
        assert_eq!(records[0].name, "Montréal");
        assert_eq!(records[0].start_date, NaiveDate::from_ymd_opt(2018, 7, 1).unwrap());
        assert_eq!(records[0].duration_days, 4);
    }

    #[test]
    fn writes_registry_from_station_files() {
        let dir = std::env::temp_dir().join(format!("climate_map_heat_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let mut rows = String::new();
        for (day, temp) in [(1, 25.0), (2, 31.0), (3, 31.5), (4, 32.0), (5, 22.0)] {
            rows.push_str(&format!(
                "-73.74,45.47,MONTREAL,7025250,2018-07-0{day},2018,07,0{day},,{temp},,18.0\n"
            ));
        }
        std::fs::write(station_file(&dir, "7025250"), rows).unwrap();

        let output = dir.join("heat_waves.csv");
        let count =
            write_heat_wave_registry(&[station("7025250")], &dir, &output, &null_progress())
                .unwrap();
        assert_eq!(count, 1);

        let written = std::fs::read_to_string(&output).unwrap();
        assert!(written.contains("Montréal,7025250,-73.74,45.47,2018-07-02,3"), "{written}");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_station_file_keeps_existing_registry() {
        let dir = std::env::temp_dir().join(format!("climate_map_heat_missing_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let output = dir.join("heat_waves.csv");
        let existing = "name,station_id,longitude,latitude,start_date,duration_days\n\
                        Montréal,7025250,-73.74,45.47,2018-07-02,5\n";
        std::fs::write(&output, existing).unwrap();

        let err = write_heat_wave_registry(&[station("7025250")], &dir, &output, &null_progress())
            .unwrap_err();
        assert!(
            matches!(&err, ClimateError::Io { path, .. } if path.ends_with("7025250.csv")),
            "{err}"
        );
        assert_eq!(std::fs::read_to_string(&output).unwrap(), existing);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
