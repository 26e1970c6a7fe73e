//! Pre-2020 civil-security observations.
//!
//! A `GeoJSON` `FeatureCollection` of points; attributes live in the
//! feature properties and the date carries a time of day.

use std::io::Read;

use climate_map_catastrophe_models::LngLat;
use climate_map_source_models::{LegacyRecord, RawRecord};
use geojson::{Feature, FeatureCollection, GeoJson};

use crate::SourceError;
use crate::dialects::malformed;
use crate::parsing::{non_empty, parse_date_time};

/// Reads a legacy observation collection.
///
/// # Errors
///
/// Returns [`SourceError`] if the document is not a feature collection or
/// any feature lacks a required property or point geometry.
pub fn read(mut reader: impl Read, label: &str) -> Result<Vec<RawRecord>, SourceError> {
    let mut text = String::new();
    reader.read_to_string(&mut text).map_err(|e| SourceError::Io {
        path: label.into(),
        source: e,
    })?;

    let geojson: GeoJson = text.parse()?;
    let collection = FeatureCollection::try_from(geojson)?;

    collection
        .features
        .iter()
        .enumerate()
        .map(|(i, feature)| parse_feature(feature).map_err(|message| malformed(label, i + 1, message)))
        .map(|result| result.map(RawRecord::Legacy))
        .collect()
}

fn parse_feature(feature: &Feature) -> Result<LegacyRecord, String> {
    let sequence = property(feature, "no_seq_observation")
        .ok_or("missing no_seq_observation")?;
    let raw_date = property(feature, "date_observation").ok_or("missing date_observation")?;
    let observed_at =
        parse_date_time(&raw_date).ok_or_else(|| format!("invalid date_observation {raw_date:?}"))?;

    let location = match feature.geometry.as_ref().map(|g| &g.value) {
        Some(geojson::Value::Point(position)) if position.len() >= 2 => {
            LngLat::new(position[0], position[1])
        }
        _ => return Err("geometry is not a point".to_string()),
    };

    Ok(LegacyRecord {
        sequence,
        observed_at,
        hazard: property(feature, "type").ok_or("missing type")?,
        severity: property(feature, "severite").ok_or("missing severite")?,
        city: property(feature, "nom").as_deref().and_then(non_empty),
        imprecision: property(feature, "imprecision").as_deref().and_then(non_empty),
        location,
    })
}

/// Reads a string or numeric property as text.
fn property(feature: &Feature, key: &str) -> Option<String> {
    match feature.property(key)? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
