#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Catastrophe registry readers, classification and normalization.
//!
//! Raw records are read per [`Dialect`](climate_map_source_models::Dialect)
//! by [`dialects::load_source`], classified against the hazard
//! [`vocabulary::Vocabulary`] and turned into canonical events by
//! [`normalize::Normalizer`].

pub mod classify;
pub mod dialects;
pub mod normalize;
pub mod parsing;
pub mod progress;
pub mod vocabulary;

use std::path::PathBuf;

pub use classify::{Classifier, ClassifierError};
pub use normalize::Normalizer;

/// Errors that can occur while reading or normalizing a registry.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// A file could not be opened or read.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// `GeoJSON` parsing failed.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Vocabulary TOML could not be parsed.
    #[error("Vocabulary parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// The vocabulary is inconsistent.
    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    /// A row is missing a required field or has one that does not parse.
    #[error("Malformed record in {source_name} at row {row}: {message}")]
    Malformed {
        /// File the row came from.
        source_name: String,
        /// 1-based data row number (header excluded).
        row: usize,
        /// Description of what went wrong.
        message: String,
    },
}
