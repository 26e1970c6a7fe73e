#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Catastrophe registry dialects and source definition types.
//!
//! The registries evolved over time and each generation uses its own
//! column layout, date format and coordinate order. Each layout is one
//! variant of [`RawRecord`], carrying exactly the fields that dialect
//! provides, so the normalizer can dispatch with a single `match`.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use climate_map_catastrophe_models::LngLat;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// The historically distinct registry layouts.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Dialect {
    /// Pre-2020 civil-security observations (`GeoJSON` points).
    Legacy,
    /// Post-2020 civil-security events (positional CSV).
    Current,
    /// Forest-fire registry attribute table (CSV export).
    Wildfire,
    /// Heat waves derived from daily station readings (CSV).
    HeatWave,
}

/// A catastrophe source file, as declared in the pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDefinition {
    /// Unique identifier (e.g., `"civil_security_pre2020"`).
    pub id: String,
    /// Layout of the file.
    pub dialect: Dialect,
    /// File path, relative to the data directory unless absolute.
    pub path: PathBuf,
}

/// A pre-2020 observation.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyRecord {
    /// `no_seq_observation`: source sequence number.
    pub sequence: String,
    /// `date_observation`.
    pub observed_at: NaiveDateTime,
    /// `type`: free-text hazard name.
    pub hazard: String,
    /// `severite`: literal severity word.
    pub severity: String,
    /// `nom`: municipality name.
    pub city: Option<String>,
    /// `imprecision`: which attribute the source flags as imprecise.
    pub imprecision: Option<String>,
    /// Point geometry, already in `[lng, lat]` order.
    pub location: LngLat,
}

/// A post-2020 event row.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentRecord {
    /// `code_alea`.
    pub hazard_code: String,
    /// `alea`: free-text hazard name.
    pub hazard: String,
    /// `code_municipalite`.
    pub municipality_code: String,
    /// `municipalite`.
    pub municipality: String,
    /// `precision_localisation`.
    pub location_precision: String,
    /// `severite`: free-text phrase embedding the severity word.
    pub severity: String,
    /// `date_signalement`.
    pub reported_on: Option<NaiveDate>,
    /// `date_debut`.
    pub started_on: Option<NaiveDate>,
    /// `coord_x` (longitude).
    pub coord_x: f64,
    /// `coord_y` (latitude).
    pub coord_y: f64,
}

/// A forest-fire registry row.
#[derive(Debug, Clone, PartialEq)]
pub struct WildfireRecord {
    /// `CLE`: registry key.
    pub key: i64,
    /// `DATE_DEBUT`.
    pub started_on: NaiveDate,
    /// `LATITUDE`.
    pub latitude: f64,
    /// `LONGITUDE`.
    pub longitude: f64,
    /// `SUP_HA`: burnt area in hectares.
    pub area_ha: f64,
}

/// A heat-wave run detected at a weather station.
///
/// Written by the heat-wave derivation step and read back as a registry
/// of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatWaveRecord {
    /// Municipality matched to the station, empty when none matched.
    pub name: String,
    /// Climate station identifier.
    pub station_id: String,
    /// Station longitude.
    pub longitude: f64,
    /// Station latitude.
    pub latitude: f64,
    /// First day of the run.
    pub start_date: NaiveDate,
    /// Run length in days.
    pub duration_days: u32,
}

/// A raw registry record in one of the supported dialects.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRecord {
    Legacy(LegacyRecord),
    Current(CurrentRecord),
    Wildfire(WildfireRecord),
    HeatWave(HeatWaveRecord),
}

impl RawRecord {
    /// Returns the dialect tag of this record.
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        match self {
            Self::Legacy(_) => Dialect::Legacy,
            Self::Current(_) => Dialect::Current,
            Self::Wildfire(_) => Dialect::Wildfire,
            Self::HeatWave(_) => Dialect::HeatWave,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_definition_from_toml() {
        let def: SourceDefinition = toml::from_str(
            r#"
            id = "heat_waves"
            dialect = "heat_wave"
            path = "heat_waves.csv"
            "#,
        )
        .unwrap();
        assert_eq!(def.dialect, Dialect::HeatWave);
        assert_eq!(def.path, PathBuf::from("heat_waves.csv"));
    }

    #[test]
    fn dialect_names() {
        assert_eq!(Dialect::Wildfire.as_ref(), "wildfire");
        assert_eq!("legacy".parse::<Dialect>().unwrap(), Dialect::Legacy);
    }
}
