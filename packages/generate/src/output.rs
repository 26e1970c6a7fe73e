//! Generated documents.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write as _};
use std::path::Path;

use climate_map_catastrophe_models::Event;
use climate_map_geography::DistrictMap;
use geo::MultiPolygon;
use serde::Serialize;

use crate::GenerateError;
use crate::aggregate::YearlyData;

/// District map, one feature per district.
pub const MAP_FILE: &str = "carte_electorale.json";

/// Area inside the mask bounds covered by no district.
pub const MASK_FILE: &str = "masque_electoral.json";

/// All events, keyed by year.
pub const CATASTROPHES_FILE: &str = "catastrophes.json";

/// Directory of per-year documents.
pub const YEARLY_DIR: &str = "yearly_data";

/// Serializes `value` to `path`, creating parent directories.
///
/// # Errors
///
/// Returns [`GenerateError`] if the file cannot be written.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), GenerateError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| GenerateError::io(parent, e))?;
    }

    let file = File::create(path).map_err(|e| GenerateError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value)?;
    writer.flush().map_err(|e| GenerateError::io(path, e))?;
    Ok(())
}

/// Writes the district map and the outside mask.
///
/// # Errors
///
/// Returns [`GenerateError`] if a file cannot be written.
pub fn write_map(
    output_dir: &Path,
    map: &DistrictMap,
    mask: &MultiPolygon<f64>,
) -> Result<(), GenerateError> {
    let map_path = output_dir.join(MAP_FILE);
    write_json(&map_path, &map.to_feature_collection())?;

    let mask_path = output_dir.join(MASK_FILE);
    write_json(&mask_path, &geojson::Geometry::new(geojson::Value::from(mask)))?;

    log::info!(
        "Wrote {} districts to {} and mask to {}",
        map.len(),
        map_path.display(),
        mask_path.display()
    );
    Ok(())
}

/// Writes every event grouped by year.
///
/// # Errors
///
/// Returns [`GenerateError`] if the file cannot be written.
pub fn write_catastrophes(
    output_dir: &Path,
    years: &BTreeMap<i32, Vec<Event>>,
) -> Result<(), GenerateError> {
    let path = output_dir.join(CATASTROPHES_FILE);
    write_json(&path, years)?;
    log::info!(
        "Wrote {} events over {} years to {}",
        years.values().map(Vec::len).sum::<usize>(),
        years.len(),
        path.display()
    );
    Ok(())
}

/// Writes `yearly_data/<year>.json` for every year.
///
/// # Errors
///
/// Returns [`GenerateError`] on the first file that cannot be written.
pub fn write_yearly(
    output_dir: &Path,
    yearly: &BTreeMap<i32, YearlyData>,
) -> Result<(), GenerateError> {
    let dir = output_dir.join(YEARLY_DIR);
    for (year, data) in yearly {
        write_json(&dir.join(format!("{year}.json")), data)?;
    }
    log::info!("Wrote {} yearly documents to {}", yearly.len(), dir.display());
    Ok(())
}
