#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Electoral district map building.
//!
//! Resolves boundary feature names against the reference district list,
//! applies split rules, and derives the "outside" mask drawn over
//! everything that is not a district.

pub mod directory;
pub mod map;
pub mod mask;
pub mod split;

use climate_map_catastrophe_models::DistrictId;
use thiserror::Error;

pub use directory::DistrictDirectory;
pub use map::{DistrictMap, build_district_map};
pub use mask::outside_mask;

/// Errors that can occur while building the district map.
#[derive(Debug, Error)]
pub enum MapError {
    /// A boundary feature names a district absent from the reference list.
    #[error("Unknown district {name:?}")]
    UnknownDistrict {
        /// Trimmed feature name.
        name: String,
    },

    /// A reference district has no boundary feature.
    #[error("District {id} ({name:?}) has no boundary")]
    MissingDistrict {
        /// Reference id.
        id: DistrictId,
        /// Reference name.
        name: String,
    },

    /// The same name or id appears twice.
    #[error("Duplicate district {id} ({name:?})")]
    DuplicateDistrict {
        /// Offending id.
        id: DistrictId,
        /// Offending name.
        name: String,
    },

    /// A split rule cannot be applied.
    #[error("Invalid split of {district:?}: {message}")]
    InvalidSplit {
        /// District named by the rule.
        district: String,
        /// Description of what went wrong.
        message: String,
    },

    /// A reference list id is not a number.
    #[error("Invalid reference id {value:?} at row {row}")]
    InvalidReference {
        /// 1-based data row.
        row: usize,
        /// Raw id cell.
        value: String,
    },

    /// A boundary feature is not usable.
    #[error("Invalid boundary feature {index}: {message}")]
    InvalidFeature {
        /// Position of the feature in the collection.
        index: usize,
        /// Description of what went wrong.
        message: String,
    },

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// `GeoJSON` parsing or conversion failed.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),
}
