//! Hazard vocabulary configuration.
//!
//! The vocabulary is the only place where registry wording (hazard names,
//! severity words, thresholds) lives. It is loaded from TOML, either the
//! definition embedded at compile time or an override file, and handed to
//! [`crate::classify::Classifier::new`].

use climate_map_catastrophe_models::{EventType, Severity};
use serde::Deserialize;

use crate::SourceError;

/// Vocabulary embedded at compile time.
const BUILTIN_VOCABULARY: &str = include_str!("../vocabulary.toml");

/// Event type and minimum reportable severity for one hazard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Threshold {
    /// Canonical type the hazard maps to.
    pub event_type: EventType,
    /// Events below this severity are dropped.
    pub min_severity: Severity,
}

/// One hazard and all the names the registries use for it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HazardEntry {
    /// Hazard names (case-insensitive aliases).
    pub names: Vec<String>,
    /// Canonical type the hazard maps to.
    pub event_type: EventType,
    /// Events below this severity are dropped.
    pub min_severity: Severity,
}

impl HazardEntry {
    #[must_use]
    pub const fn threshold(&self) -> Threshold {
        Threshold {
            event_type: self.event_type,
            min_severity: self.min_severity,
        }
    }
}

/// Literal severity words mapping to one [`Severity`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeverityWords {
    /// Words as written by the legacy registry.
    pub words: Vec<String>,
    /// Severity they denote.
    pub severity: Severity,
}

/// Thresholds for sources that carry no hazard name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DerivedThresholds {
    /// Forest-fire registry (severity from burnt area).
    pub wildfire: Threshold,
    /// Heat waves (severity from run length).
    pub heat_wave: Threshold,
}

/// Complete classifier vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Vocabulary {
    /// Phrase preceding the severity word in current-registry descriptions
    /// (e.g. `"menace"` in `"Menace importante pour la population"`).
    pub severity_lead_in: String,
    /// Hazard table.
    pub hazards: Vec<HazardEntry>,
    /// Severity word table.
    pub severity_words: Vec<SeverityWords>,
    /// Thresholds for derived and wildfire sources.
    pub derived: DerivedThresholds,
}

impl Vocabulary {
    /// Returns the vocabulary embedded at compile time.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML fails to parse. Since it is a
    /// compile-time constant, a parse failure is a development error and is
    /// caught by the tests.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_toml_str(BUILTIN_VOCABULARY)
            .unwrap_or_else(|e| panic!("Failed to parse builtin vocabulary: {e}"))
    }

    /// Parses a vocabulary from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Config`] if the TOML is invalid.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, SourceError> {
        Ok(toml::de::from_str(toml_str)?)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn builtin_vocabulary_parses() {
        let vocabulary = Vocabulary::builtin();
        assert_eq!(vocabulary.severity_lead_in, "menace");
        assert_eq!(vocabulary.hazards.len(), 7);
        assert_eq!(
            vocabulary.derived.heat_wave,
            Threshold {
                event_type: EventType::HeatWave,
                min_severity: Severity::Important,
            }
        );
    }

    #[test]
    fn builtin_covers_every_registry_type() {
        let vocabulary = Vocabulary::builtin();
        let covered: BTreeSet<EventType> = vocabulary
            .hazards
            .iter()
            .map(|h| h.event_type)
            .chain([
                vocabulary.derived.wildfire.event_type,
                vocabulary.derived.heat_wave.event_type,
            ])
            .collect();
        for event_type in EventType::all() {
            assert!(covered.contains(event_type), "{event_type} not covered");
        }
    }

    #[test]
    fn rejects_unknown_severity_name() {
        let result = Vocabulary::from_toml_str(
            r#"
            severity_lead_in = "menace"
            hazards = [{ names = ["x"], event_type = "FLOOD", min_severity = "HUGE" }]
            severity_words = []
            [derived.wildfire]
            event_type = "FOREST_FIRE"
            min_severity = "IMPORTANT"
            [derived.heat_wave]
            event_type = "HEAT_WAVE"
            min_severity = "IMPORTANT"
            "#,
        );
        assert!(result.is_err());
    }
}
