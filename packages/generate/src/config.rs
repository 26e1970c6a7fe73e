//! Pipeline configuration.
//!
//! Every field has a default matching the published data layout, so an
//! empty file (or no file at all) is a valid configuration. Relative paths
//! resolve against `data_dir`, except outputs which go to `output_dir`.
//!
//! ```toml
//! data_dir = "tools/data"
//! output_dir = "public/data"
//!
//! [[map.splits]]
//! district = "Ungava"
//! new_id = 938
//! new_name = "Ungava-Nord"
//! cut = [[-79.5, 55.0], [-57.1, 55.0]]
//!
//! [[sources]]
//! id = "heat_waves"
//! dialect = "heat_wave"
//! path = "heat_waves.csv"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use climate_map_climate::fetch::{DEFAULT_URL_TEMPLATE, FetchOptions};
use climate_map_climate::stations::StationFilter;
use climate_map_geography_models::{MaskBounds, SplitRule};
use climate_map_source::normalize::DEFAULT_MIN_YEAR;
use climate_map_source_models::{Dialect, SourceDefinition};
use serde::{Deserialize, Serialize};

use crate::GenerateError;

/// Overrides [`PipelineConfig::data_dir`].
pub const DATA_DIR_ENV: &str = "CLIMATE_MAP_DATA_DIR";

/// Overrides [`PipelineConfig::output_dir`].
pub const OUTPUT_DIR_ENV: &str = "CLIMATE_MAP_OUTPUT_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding the raw inputs.
    pub data_dir: PathBuf,
    /// Directory receiving the generated documents.
    pub output_dir: PathBuf,
    /// Events dated before this year are dropped.
    pub min_year: i32,
    /// Replaces the built-in hazard vocabulary.
    pub vocabulary: Option<PathBuf>,
    pub map: MapConfig,
    /// Catastrophe registries, normalized in this order.
    pub sources: Vec<SourceDefinition>,
    /// Region statistics tables: metric name -> file.
    pub statistics: BTreeMap<String, PathBuf>,
    pub climate: ClimateConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("data/generated"),
            min_year: DEFAULT_MIN_YEAR,
            vocabulary: None,
            map: MapConfig::default(),
            sources: default_sources(),
            statistics: default_statistics(),
            climate: ClimateConfig::default(),
        }
    }
}

/// District map inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Reference list, `id;name`.
    pub district_list: PathBuf,
    /// Boundary `GeoJSON` feature collection.
    pub boundaries: PathBuf,
    pub splits: Vec<SplitRule>,
    /// Fixed outside-mask box. Derived from the districts when absent.
    pub mask_bounds: Option<MaskBounds>,
    /// Degrees added around the derived box.
    pub mask_margin: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            district_list: PathBuf::from("liste_circonscriptions2017.csv"),
            boundaries: PathBuf::from("carte2017simple.geojson"),
            splits: Vec::new(),
            mask_bounds: None,
            mask_margin: 5.0,
        }
    }
}

/// Weather station download and heat-wave settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateConfig {
    /// National station inventory.
    pub station_list: PathBuf,
    /// Municipality names used to label stations.
    pub municipalities: PathBuf,
    /// Province as spelled in the inventory.
    pub province: String,
    pub url_template: String,
    /// Stations downloaded at the same time.
    pub concurrency: usize,
    /// Downloaded daily readings, one file per station.
    pub readings_dir: PathBuf,
    /// Heat-wave registry written from the readings.
    pub heat_waves: PathBuf,
}

impl Default for ClimateConfig {
    fn default() -> Self {
        Self {
            station_list: PathBuf::from("station_inventory.csv"),
            municipalities: PathBuf::from("municipalites.csv"),
            province: "QUEBEC".to_string(),
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            concurrency: 8,
            readings_dir: PathBuf::from("raw_climate_data"),
            heat_waves: PathBuf::from("heat_waves.csv"),
        }
    }
}

fn default_sources() -> Vec<SourceDefinition> {
    [
        ("civil_security_pre2020", Dialect::Legacy, "catastrophes_pre2020.json"),
        ("civil_security_post2020", Dialect::Current, "catastrophes_post2020.csv"),
        ("forest_fires", Dialect::Wildfire, "feux_pt_ori_1972_2021.csv"),
        ("heat_waves", Dialect::HeatWave, "heat_waves.csv"),
    ]
    .into_iter()
    .map(|(id, dialect, path)| SourceDefinition {
        id: id.to_string(),
        dialect,
        path: PathBuf::from(path),
    })
    .collect()
}

fn default_statistics() -> BTreeMap<String, PathBuf> {
    [
        ("avg_temp", "temperatures_moy_regions.csv"),
        ("avg_prec", "precipitations_moy_regions.csv"),
        ("avg_liq_prec", "precipitations_liq_moy_regions.csv"),
        ("days_above_30", "nb_jours_plus_30_deg.csv"),
        ("days_below_min_25", "nb_jours_moins_25_deg.csv"),
    ]
    .into_iter()
    .map(|(metric, file)| (metric.to_string(), PathBuf::from(file)))
    .collect()
}

impl PipelineConfig {
    /// Parses a configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::Config`] if the document is not valid TOML
    /// or has fields of the wrong type.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, GenerateError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Loads the configuration from `path`, or the defaults when no path
    /// is given, then applies the environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError`] if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, GenerateError> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| GenerateError::io(path, e))?;
                log::info!("Loaded configuration from {}", path.display());
                Self::from_toml_str(&text)?
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = var(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = var(OUTPUT_DIR_ENV).filter(|v| !v.is_empty()) {
            self.output_dir = PathBuf::from(dir);
        }
    }

    /// Resolves an input path against the data directory.
    #[must_use]
    pub fn data_path(&self, path: &Path) -> PathBuf {
        self.data_dir.join(path)
    }

    #[must_use]
    pub fn station_filter(&self) -> StationFilter {
        StationFilter {
            province: self.climate.province.clone(),
            min_year: self.min_year,
        }
    }

    #[must_use]
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            url_template: self.climate.url_template.clone(),
            concurrency: self.climate.concurrency,
            ..FetchOptions::default()
        }
    }
}
