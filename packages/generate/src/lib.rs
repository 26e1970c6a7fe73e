#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Pipeline steps producing the climate map's data files.
//!
//! Steps, in dependency order:
//!
//! 1. **map**: builds the electoral district map from the reference list
//!    and boundary features, writes it with the outside mask.
//! 2. **fetch**: downloads daily readings for every kept weather station.
//! 3. **heat-waves**: scans the readings and writes the heat-wave registry.
//! 4. **catastrophes**: normalizes every registry, assigns districts from
//!    the written map and writes the events grouped by year.
//! 5. **yearly**: merges events with region statistics into one document
//!    per year.
//!
//! Each step reads its inputs from files, so any of them can be re-run on
//! its own.

pub mod aggregate;
pub mod catastrophes;
pub mod config;
pub mod output;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr as _;
use std::sync::Arc;

use climate_map_climate::ClimateError;
use climate_map_climate::fetch::{FetchError, FetchSummary, fetch_all};
use climate_map_climate::heat_waves::write_heat_wave_registry;
use climate_map_climate::stations::{Municipalities, Station, read_station_list};
use climate_map_climate::statistics::RegionStatistics;
use climate_map_geography::{DistrictDirectory, DistrictMap, MapError, build_district_map, outside_mask};
use climate_map_source::progress::ProgressCallback;
use climate_map_source::{ClassifierError, SourceError};
use climate_map_spatial::SpatialError;
use geojson::FeatureCollection;
use thiserror::Error;

pub use config::PipelineConfig;

/// Errors that can occur while running a pipeline step.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// A file could not be opened, read or written.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A `GeoJSON` document could not be parsed.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The configuration file is invalid.
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// A catastrophe registry could not be read.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The hazard vocabulary is inconsistent.
    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    /// The district map could not be built.
    #[error(transparent)]
    Map(#[from] MapError),

    /// The written district map could not be indexed.
    #[error(transparent)]
    Spatial(#[from] SpatialError),

    /// Station readings or climate statistics could not be read.
    #[error(transparent)]
    Climate(#[from] ClimateError),

    /// Downloading station readings failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl GenerateError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

// ── Map ──────────────────────────────────────────────────────────

/// Builds the district map and writes it with the outside mask.
///
/// # Errors
///
/// Returns [`GenerateError`] if an input is missing or malformed, a
/// boundary name is not in the reference list, or an output cannot be
/// written.
pub fn generate_map(config: &PipelineConfig) -> Result<DistrictMap, GenerateError> {
    let list_path = config.data_path(&config.map.district_list);
    let directory = DistrictDirectory::read(open(&list_path)?)?;

    let boundaries = read_feature_collection(&config.data_path(&config.map.boundaries))?;
    let map = build_district_map(&boundaries, &directory, &config.map.splits)?;
    let mask = outside_mask(&map, config.map.mask_bounds, config.map.mask_margin);

    output::write_map(&config.output_dir, &map, &mask)?;
    Ok(map)
}

// ── Climate ──────────────────────────────────────────────────────

/// Reads the station inventory and keeps the stations in the configured
/// province with daily data in the years of interest.
///
/// # Errors
///
/// Returns [`GenerateError`] if either list is missing or malformed.
pub fn load_stations(config: &PipelineConfig) -> Result<Vec<Station>, GenerateError> {
    let municipalities_path = config.data_path(&config.climate.municipalities);
    let municipalities = Municipalities::read(open(&municipalities_path)?)?;

    let station_path = config.data_path(&config.climate.station_list);
    let stations = read_station_list(
        open(&station_path)?,
        &config.station_filter(),
        &municipalities,
    )?;
    Ok(stations)
}

/// Downloads daily readings for every kept station.
///
/// # Errors
///
/// Returns [`GenerateError`] if the station lists cannot be read or a
/// download fails.
pub async fn fetch_readings(
    config: &PipelineConfig,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<FetchSummary, GenerateError> {
    let stations = load_stations(config)?;
    let readings_dir = config.data_path(&config.climate.readings_dir);
    Ok(fetch_all(&stations, &readings_dir, &config.fetch_options(), progress).await?)
}

/// Scans the downloaded readings and writes the heat-wave registry.
/// Returns the number of heat waves written.
///
/// # Errors
///
/// Returns [`GenerateError`] if the station lists or a readings file are
/// malformed, or the registry cannot be written.
pub fn generate_heat_waves(
    config: &PipelineConfig,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<usize, GenerateError> {
    let stations = load_stations(config)?;
    let readings_dir = config.data_path(&config.climate.readings_dir);
    let output = config.data_path(&config.climate.heat_waves);
    Ok(write_heat_wave_registry(&stations, &readings_dir, &output, progress)?)
}

// ── Catastrophes & yearly data ───────────────────────────────────

/// Normalizes every registry and writes `catastrophes.json`.
/// Returns the number of events written.
///
/// # Errors
///
/// Returns [`GenerateError`] if a registry or the district map cannot be
/// read, or the output cannot be written.
pub fn generate_catastrophes(config: &PipelineConfig) -> Result<usize, GenerateError> {
    let events = catastrophes::collect_events(config)?;
    let count = events.len();
    output::write_catastrophes(&config.output_dir, &aggregate::group_by_year(events))?;
    Ok(count)
}

/// Merges events with region statistics and writes one document per
/// year. Returns the number of years written.
///
/// # Errors
///
/// Returns [`GenerateError`] if an input cannot be read or an output
/// cannot be written.
pub fn generate_yearly(config: &PipelineConfig) -> Result<usize, GenerateError> {
    let events = catastrophes::collect_events(config)?;
    let statistics = RegionStatistics::load(&config.data_dir, &config.statistics)?;
    let yearly = aggregate::aggregate(events, &statistics);
    output::write_yearly(&config.output_dir, &yearly)?;
    Ok(yearly.len())
}

/// Runs the catastrophes and yearly steps over a single normalization
/// pass.
///
/// # Errors
///
/// See [`generate_catastrophes`] and [`generate_yearly`].
pub fn generate_documents(config: &PipelineConfig) -> Result<(), GenerateError> {
    let events = catastrophes::collect_events(config)?;
    let statistics = RegionStatistics::load(&config.data_dir, &config.statistics)?;

    output::write_catastrophes(&config.output_dir, &aggregate::group_by_year(events.clone()))?;
    output::write_yearly(
        &config.output_dir,
        &aggregate::aggregate(events, &statistics),
    )?;
    Ok(())
}

// ── Helpers ──────────────────────────────────────────────────────

pub(crate) fn open(path: &Path) -> Result<BufReader<File>, GenerateError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| GenerateError::io(path, e))
}

pub(crate) fn read_feature_collection(path: &Path) -> Result<FeatureCollection, GenerateError> {
    let text = std::fs::read_to_string(path).map_err(|e| GenerateError::io(path, e))?;
    Ok(FeatureCollection::from_str(&text)?)
}
