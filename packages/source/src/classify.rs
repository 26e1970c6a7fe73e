//! Catastrophe type and severity classification.
//!
//! Maps registry-specific hazard names and severity descriptors to the
//! canonical ([`EventType`], [`Severity`]) pair. Each registry generation
//! phrases severity differently, so descriptors are tagged with their
//! dialect (see [`SeverityDescriptor`]).

use std::collections::BTreeMap;

use climate_map_catastrophe_models::{EventType, Severity};
use regex::Regex;

use crate::vocabulary::{Threshold, Vocabulary};

/// Burnt-area breakpoints in hectares (`Moderate`, `Important`, `Extreme`).
const BURN_AREA_MODERATE_HA: f64 = 100.0;
const BURN_AREA_IMPORTANT_HA: f64 = 1_000.0;
const BURN_AREA_EXTREME_HA: f64 = 10_000.0;

/// Errors raised while building a [`Classifier`].
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// The severity lead-in did not produce a valid pattern.
    #[error("Invalid severity lead-in pattern: {0}")]
    LeadIn(#[from] regex::Error),

    /// Two vocabulary entries disagree on what a name means.
    #[error("Conflicting vocabulary entries for {name:?}")]
    ConflictingName {
        /// The name (lowercased or uppercased) defined twice.
        name: String,
    },
}

/// A severity as expressed by one registry dialect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeverityDescriptor<'a> {
    /// A literal word (`"FAIBLE"`, `"IMPORTANTE"`, ...).
    Legacy(&'a str),
    /// A phrase embedding the word after the lead-in
    /// (`"Menace modérée pour la population"`).
    Current(&'a str),
    /// Burnt area in hectares.
    BurnArea(f64),
    /// Heat-wave run length in days.
    RunLength(u32),
}

/// Sources whose type is implied rather than named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedSource {
    Wildfire,
    HeatWave,
}

/// Result of classifying one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Canonical type.
    pub event_type: EventType,
    /// Severity parsed from the descriptor.
    pub severity: Severity,
    /// Minimum reportable severity for the type.
    pub min_severity: Severity,
}

impl Classification {
    /// Whether the record clears its type's threshold.
    #[must_use]
    pub fn is_reportable(&self) -> bool {
        self.severity >= self.min_severity
    }
}

/// Immutable classifier built from a [`Vocabulary`].
#[derive(Debug, Clone)]
pub struct Classifier {
    /// Lowercased hazard name -> threshold.
    hazards: BTreeMap<String, Threshold>,
    /// Uppercased severity word -> severity.
    severity_words: BTreeMap<String, Severity>,
    /// Captures the word following the lead-in phrase.
    lead_in: Regex,
    wildfire: Threshold,
    heat_wave: Threshold,
}

impl Classifier {
    /// Builds a classifier from a vocabulary.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError`] if the lead-in cannot be compiled or a
    /// hazard name or severity word is defined twice with different
    /// meanings. Repeating a name with the same meaning is accepted.
    pub fn new(vocabulary: Vocabulary) -> Result<Self, ClassifierError> {
        let mut hazards = BTreeMap::new();
        for entry in &vocabulary.hazards {
            for name in &entry.names {
                let key = name.trim().to_lowercase();
                if let Some(existing) = hazards.insert(key.clone(), entry.threshold())
                    && existing != entry.threshold()
                {
                    return Err(ClassifierError::ConflictingName { name: key });
                }
            }
        }

        let mut severity_words = BTreeMap::new();
        for entry in &vocabulary.severity_words {
            for word in &entry.words {
                let key = word.trim().to_uppercase();
                if let Some(existing) = severity_words.insert(key.clone(), entry.severity)
                    && existing != entry.severity
                {
                    return Err(ClassifierError::ConflictingName { name: key });
                }
            }
        }

        let lead_in = Regex::new(&format!(
            r"(?i){}\s+(\w+)",
            regex::escape(vocabulary.severity_lead_in.trim())
        ))?;

        Ok(Self {
            hazards,
            severity_words,
            lead_in,
            wildfire: vocabulary.derived.wildfire,
            heat_wave: vocabulary.derived.heat_wave,
        })
    }

    /// Looks up a hazard name (case-insensitive, surrounding whitespace
    /// ignored).
    #[must_use]
    pub fn lookup(&self, hazard: &str) -> Option<Threshold> {
        self.hazards.get(&hazard.trim().to_lowercase()).copied()
    }

    /// Parses a severity descriptor. Unrecognized descriptors resolve to
    /// [`Severity::Unknown`].
    #[must_use]
    pub fn severity(&self, descriptor: SeverityDescriptor<'_>) -> Severity {
        match descriptor {
            SeverityDescriptor::Legacy(word) => self.legacy_severity(word),
            SeverityDescriptor::Current(phrase) => self
                .lead_in
                .captures(phrase)
                .and_then(|captures| captures.get(1))
                .map_or(Severity::Unknown, |word| self.legacy_severity(word.as_str())),
            SeverityDescriptor::BurnArea(hectares) => burn_area_severity(hectares),
            SeverityDescriptor::RunLength(days) => {
                Severity::saturating_from(i64::from(days) - 2)
            }
        }
    }

    /// Classifies a record by hazard name. Returns `None` when the hazard
    /// is not part of the vocabulary.
    #[must_use]
    pub fn classify(
        &self,
        hazard: &str,
        descriptor: SeverityDescriptor<'_>,
    ) -> Option<Classification> {
        let threshold = self.lookup(hazard)?;
        Some(self.apply(threshold, descriptor))
    }

    /// Like [`Self::classify`], but only returns reportable classifications.
    #[must_use]
    pub fn classify_reportable(
        &self,
        hazard: &str,
        descriptor: SeverityDescriptor<'_>,
    ) -> Option<Classification> {
        self.classify(hazard, descriptor)
            .filter(Classification::is_reportable)
    }

    /// Classifies a record from a source whose type is implied.
    #[must_use]
    pub fn classify_derived(
        &self,
        source: DerivedSource,
        descriptor: SeverityDescriptor<'_>,
    ) -> Classification {
        let threshold = match source {
            DerivedSource::Wildfire => self.wildfire,
            DerivedSource::HeatWave => self.heat_wave,
        };
        self.apply(threshold, descriptor)
    }

    fn apply(&self, threshold: Threshold, descriptor: SeverityDescriptor<'_>) -> Classification {
        Classification {
            event_type: threshold.event_type,
            severity: self.severity(descriptor),
            min_severity: threshold.min_severity,
        }
    }

    fn legacy_severity(&self, word: &str) -> Severity {
        self.severity_words
            .get(&word.trim().to_uppercase())
            .copied()
            .unwrap_or_default()
    }
}

/// Maps a burnt area to a severity using fixed breakpoints.
fn burn_area_severity(hectares: f64) -> Severity {
    if hectares.is_nan() {
        Severity::Unknown
    } else if hectares < BURN_AREA_MODERATE_HA {
        Severity::Minor
    } else if hectares < BURN_AREA_IMPORTANT_HA {
        Severity::Moderate
    } else if hectares < BURN_AREA_EXTREME_HA {
        Severity::Important
    } else {
        Severity::Extreme
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> Classifier {
        Classifier::new(Vocabulary::builtin()).unwrap()
    }

    #[test]
    fn tornado_minor_is_reportable() {
        let c = classifier()
            .classify("tornade", SeverityDescriptor::Legacy("FAIBLE"))
            .unwrap();
        assert_eq!(c.event_type, EventType::Tornado);
        assert_eq!(c.severity, Severity::Minor);
        assert!(c.is_reportable());
    }

    #[test]
    fn flood_minor_is_dropped() {
        let classifier = classifier();
        let c = classifier
            .classify("inondation", SeverityDescriptor::Legacy("FAIBLE"))
            .unwrap();
        assert_eq!(c.event_type, EventType::Flood);
        assert!(!c.is_reportable());
        assert!(
            classifier
                .classify_reportable("inondation", SeverityDescriptor::Legacy("FAIBLE"))
                .is_none()
        );
    }

    #[test]
    fn hazard_lookup_is_case_insensitive() {
        let classifier = classifier();
        assert_eq!(
            classifier.lookup("Pluie Verglaçante").map(|t| t.event_type),
            Some(EventType::FreezingRain)
        );
        assert_eq!(
            classifier.lookup(" INONDATION ").map(|t| t.event_type),
            Some(EventType::Flood)
        );
    }

    #[test]
    fn unknown_hazard_is_none() {
        assert!(
            classifier()
                .classify("glissement de terrain", SeverityDescriptor::Legacy("EXTRÊME"))
                .is_none()
        );
    }

    #[test]
    fn aliases_share_type_and_threshold() {
        let classifier = classifier();
        assert_eq!(classifier.lookup("orage violent"), classifier.lookup("ouragan"));
        assert_eq!(classifier.lookup("vent violent"), classifier.lookup("vent de tempête"));
    }

    #[test]
    fn legacy_words() {
        let classifier = classifier();
        let cases = [
            ("EXTRAORDINAIRE", Severity::Extreme),
            ("extrême", Severity::Extreme),
            ("IMPORTANTE", Severity::Important),
            ("Possible", Severity::Moderate),
            ("MODÉRÉE", Severity::Moderate),
            ("MINEURE", Severity::Minor),
            ("", Severity::Unknown),
            ("ÉLEVÉE", Severity::Unknown),
        ];
        for (word, expected) in cases {
            assert_eq!(
                classifier.severity(SeverityDescriptor::Legacy(word)),
                expected,
                "{word:?}"
            );
        }
    }

    #[test]
    fn current_phrases() {
        let classifier = classifier();
        assert_eq!(
            classifier.severity(SeverityDescriptor::Current(
                "Menace modérée à la sécurité de la population"
            )),
            Severity::Moderate
        );
        assert_eq!(
            classifier.severity(SeverityDescriptor::Current("MENACE IMPORTANTE")),
            Severity::Important
        );
        assert_eq!(
            classifier.severity(SeverityDescriptor::Current("Aucune menace")),
            Severity::Unknown
        );
        assert_eq!(
            classifier.severity(SeverityDescriptor::Current("Menace inconnue")),
            Severity::Unknown
        );
    }

    #[test]
    fn burn_area_breakpoints() {
        let classifier = classifier();
        let cases = [
            (0.5, Severity::Minor),
            (99.9, Severity::Minor),
            (100.0, Severity::Moderate),
            (999.0, Severity::Moderate),
            (1_000.0, Severity::Important),
            (9_999.9, Severity::Important),
            (10_000.0, Severity::Extreme),
            (f64::NAN, Severity::Unknown),
        ];
        for (hectares, expected) in cases {
            assert_eq!(
                classifier.severity(SeverityDescriptor::BurnArea(hectares)),
                expected,
                "{hectares}"
            );
        }
    }

    #[test]
    fn run_length_severity_is_clamped() {
        let classifier = classifier();
        let severity = |days| classifier.severity(SeverityDescriptor::RunLength(days));
        assert_eq!(severity(3), Severity::Minor);
        assert_eq!(severity(4), Severity::Moderate);
        assert_eq!(severity(5), Severity::Important);
        assert_eq!(severity(6), Severity::Extreme);
        assert_eq!(severity(12), Severity::Extreme);
    }

    #[test]
    fn derived_heat_wave_threshold() {
        let classifier = classifier();
        let short = classifier.classify_derived(DerivedSource::HeatWave, SeverityDescriptor::RunLength(4));
        assert_eq!(short.event_type, EventType::HeatWave);
        assert!(!short.is_reportable());
        let long = classifier.classify_derived(DerivedSource::HeatWave, SeverityDescriptor::RunLength(5));
        assert!(long.is_reportable());
    }

    #[test]
    fn conflicting_alias_is_rejected() {
        let mut vocabulary = Vocabulary::builtin();
        vocabulary.hazards[1].names.push("Inondation".to_string());
        assert!(matches!(
            Classifier::new(vocabulary),
            Err(ClassifierError::ConflictingName { .. })
        ));
    }
}
