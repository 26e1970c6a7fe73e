#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Electoral district reference and map-building types.
//!
//! The reference list gives every district its official id; boundary
//! features only carry names. Split rules and mask bounds are part of the
//! pipeline configuration.

use climate_map_catastrophe_models::DistrictId;
use serde::{Deserialize, Serialize};

/// One entry of the reference district list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistrictRecord {
    /// Official district number.
    pub id: DistrictId,
    /// Official district name, as spelled in the boundary data.
    pub name: String,
}

/// Divides a district in two along a cut line.
///
/// The part north of the line becomes a new district; the remainder keeps
/// the original id and name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitRule {
    /// Name of the district to divide.
    pub district: String,
    /// Id given to the northern part.
    pub new_id: DistrictId,
    /// Name given to the northern part.
    pub new_name: String,
    /// Cut polyline as `[lng, lat]` vertices. Vertices are taken in
    /// longitude order and the line is extended horizontally past the
    /// district's bounds at both ends.
    pub cut: Vec<[f64; 2]>,
}

/// Bounding box of the outside mask, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaskBounds {
    pub min_lng: f64,
    pub min_lat: f64,
    pub max_lng: f64,
    pub max_lat: f64,
}

impl MaskBounds {
    /// Grows the box by `margin` degrees on every side.
    #[must_use]
    pub fn expand(self, margin: f64) -> Self {
        Self {
            min_lng: self.min_lng - margin,
            min_lat: self.min_lat - margin,
            max_lng: self.max_lng + margin,
            max_lat: self.max_lat + margin,
        }
    }
}
