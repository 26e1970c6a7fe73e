#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Catastrophe type taxonomy, severity scale, and canonical event
//! definitions.
//!
//! Every registry dialect (legacy observations, current civil-security
//! events, wildfires, derived heat waves) is normalized into the shared
//! [`Event`] type defined here, so downstream stages never see
//! source-specific vocabulary.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Severity level for a catastrophe, from 0 (unknown) to 4 (extreme).
///
/// The derived ordering is the threshold ordering: an event is only
/// reportable when its severity is `>=` the minimum configured for its
/// [`EventType`].
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
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
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Level 0: severity could not be determined from the source
    #[default]
    Unknown = 0,
    /// Level 1: minor event
    Minor = 1,
    /// Level 2: moderate event
    Moderate = 2,
    /// Level 3: important event
    Important = 3,
    /// Level 4: extreme event
    Extreme = 4,
}

impl Severity {
    /// Returns the numeric value of this severity level.
    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Creates a severity level from a numeric value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not in the range 0-4.
    pub const fn from_value(value: u8) -> Result<Self, InvalidSeverityError> {
        match value {
            0 => Ok(Self::Unknown),
            1 => Ok(Self::Minor),
            2 => Ok(Self::Moderate),
            3 => Ok(Self::Important),
            4 => Ok(Self::Extreme),
            _ => Err(InvalidSeverityError { value }),
        }
    }

    /// Clamps an arbitrary signed level into `Minor..=Extreme`.
    ///
    /// Derived severities (e.g. from a heat-wave length) never resolve to
    /// [`Severity::Unknown`].
    #[must_use]
    pub const fn saturating_from(level: i64) -> Self {
        if level <= 1 {
            Self::Minor
        } else if level == 2 {
            Self::Moderate
        } else if level == 3 {
            Self::Important
        } else {
            Self::Extreme
        }
    }
}

/// Error returned when attempting to create a [`Severity`] from an invalid
/// numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidSeverityError {
    /// The invalid severity value that was provided.
    pub value: u8,
}

impl fmt::Display for InvalidSeverityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid severity value {}: expected 0-4", self.value)
    }
}

impl std::error::Error for InvalidSeverityError {}

/// Canonical catastrophe types.
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
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// Riverine or coastal flooding
    Flood,
    /// Forest fire
    ForestFire,
    /// Violent thunderstorm or hurricane
    ViolentStorm,
    /// Tornado
    Tornado,
    /// Freezing rain
    FreezingRain,
    /// Winter storm
    WinterStorm,
    /// Storm-force winds
    StormWinds,
    /// Multi-day heat wave derived from station readings
    HeatWave,
}

impl EventType {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Flood,
            Self::ForestFire,
            Self::ViolentStorm,
            Self::Tornado,
            Self::FreezingRain,
            Self::WinterStorm,
            Self::StormWinds,
            Self::HeatWave,
        ]
    }
}

/// Integer identifier of an electoral district.
///
/// `0` is reserved for "outside every district".
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DistrictId(pub u32);

impl DistrictId {
    /// Sentinel for events not contained by any district polygon.
    pub const UNASSIGNED: Self = Self(0);

    /// Whether this id is the unassigned sentinel.
    #[must_use]
    pub const fn is_unassigned(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for DistrictId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A WGS84 position, serialized as `[lng, lat]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LngLat {
    /// Longitude in degrees.
    pub lng: f64,
    /// Latitude in degrees.
    pub lat: f64,
}

impl LngLat {
    #[must_use]
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

impl From<[f64; 2]> for LngLat {
    fn from([lng, lat]: [f64; 2]) -> Self {
        Self { lng, lat }
    }
}

impl From<LngLat> for [f64; 2] {
    fn from(value: LngLat) -> Self {
        [value.lng, value.lat]
    }
}

/// A catastrophe normalized to the canonical schema.
///
/// Created by the normalizer with [`DistrictId::UNASSIGNED`]; the district
/// is resolved once by point-in-polygon assignment through
/// [`Event::with_district`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Source-derived identifier.
    pub id: String,
    /// Event position.
    pub location: LngLat,
    /// Canonical type.
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Calendar date of the event (start date for multi-day events).
    pub date: NaiveDate,
    /// Classified severity, serialized as its numeric level.
    #[serde(with = "severity_value")]
    pub severity: Severity,
    /// Containing district, or `0` when outside every district.
    #[serde(default)]
    pub district: DistrictId,
    /// Municipality or station display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Whether the source flags the location as imprecise.
    pub loc_approx: bool,
}

impl Event {
    /// Returns this event with its district resolved.
    #[must_use]
    pub fn with_district(self, district: DistrictId) -> Self {
        Self { district, ..self }
    }
}

/// Serializes a [`Severity`] as its numeric level (`0`-`4`), the form the
/// front-end expects.
pub mod severity_value {
    use serde::{Deserialize as _, Deserializer, Serializer, de::Error as _};

    use crate::Severity;

    /// # Errors
    ///
    /// Propagates serializer errors.
    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(severity: &Severity, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(severity.value())
    }

    /// # Errors
    ///
    /// Fails when the value is not an integer in `0..=4`.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Severity, D::Error> {
        let value = u8::deserialize(deserializer)?;
        Severity::from_value(value).map_err(D::Error::custom)
    }
}
