//! Registry file readers, one per [`Dialect`].
//!
//! Each reader turns a file into [`RawRecord`]s and fails fast on the first
//! malformed row: a registry that cannot be read completely is not used at
//! all.

pub mod current;
pub mod heat_wave;
pub mod legacy;
pub mod wildfire;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use climate_map_source_models::{Dialect, RawRecord, SourceDefinition};

use crate::SourceError;

/// Reads every record of a configured source.
///
/// Relative paths are resolved against `data_dir`.
///
/// # Errors
///
/// Returns [`SourceError::Io`] if the file cannot be opened, or any
/// parsing error raised by the dialect reader.
pub fn load_source(def: &SourceDefinition, data_dir: &Path) -> Result<Vec<RawRecord>, SourceError> {
    let path = data_dir.join(&def.path);
    let file = File::open(&path).map_err(|e| SourceError::Io {
        path: path.clone(),
        source: e,
    })?;
    let reader = BufReader::new(file);
    let label = path.display().to_string();

    let records = match def.dialect {
        Dialect::Legacy => legacy::read(reader, &label)?,
        Dialect::Current => current::read(reader, &label)?,
        Dialect::Wildfire => wildfire::read(reader, &label)?,
        Dialect::HeatWave => heat_wave::read(reader, &label)?,
    };

    log::info!(
        "[{}] Read {} {} records from {label}",
        def.id,
        records.len(),
        def.dialect
    );

    Ok(records)
}

/// Builds a [`SourceError::Malformed`] for a 1-based row number.
pub(crate) fn malformed(label: &str, row: usize, message: impl Into<String>) -> SourceError {
    SourceError::Malformed {
        source_name: label.to_string(),
        row,
        message: message.into(),
    }
}
