#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Weather station data for the climate map.
//!
//! Covers the station catalogue, downloading daily station readings,
//! deriving heat waves from them with the run-length extractor, and
//! loading the per-region climate statistics tables.

pub mod fetch;
pub mod heat_waves;
pub mod readings;
pub mod retry;
pub mod runs;
pub mod stations;
pub mod statistics;

use std::path::PathBuf;

use climate_map_source::SourceError;
use thiserror::Error;

pub use fetch::FetchError;

/// Errors that can occur while reading station data.
#[derive(Debug, Error)]
pub enum ClimateError {
    /// A file could not be opened, read or written.
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

    /// A row has a field that does not parse.
    #[error("Malformed record in {source_name} at row {row}: {message}")]
    Malformed {
        /// File the row came from.
        source_name: String,
        /// 1-based row number.
        row: usize,
        /// Description of what went wrong.
        message: String,
    },

    /// Writing the heat-wave registry failed.
    #[error(transparent)]
    Registry(#[from] SourceError),
}

impl ClimateError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
