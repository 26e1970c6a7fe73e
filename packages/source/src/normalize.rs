//! Conversion of raw registry records into canonical [`Event`]s.
//!
//! Each dialect has its own rules for the event identifier, the event date
//! and the approximate-location flag. Records that do not classify, that
//! fall below their type's severity threshold, or that predate the
//! configured first year are dropped.

use chrono::Datelike;
use climate_map_catastrophe_models::{DistrictId, Event, LngLat};
use climate_map_source_models::{
    CurrentRecord, HeatWaveRecord, LegacyRecord, RawRecord, WildfireRecord,
};

use crate::classify::{Classification, Classifier, DerivedSource, SeverityDescriptor};
use crate::parsing::non_empty;

/// First year kept by default.
pub const DEFAULT_MIN_YEAR: i32 = 1990;

/// Value of the legacy `imprecision` attribute marking an approximate
/// location.
const LEGACY_IMPRECISE_LOCATION: &str = "localisation";

/// Value of the current `precision_localisation` column marking an
/// approximate location.
const CURRENT_IMPRECISE_LOCATION: &str = "imprécise";

/// Normalizes raw records against a shared [`Classifier`].
#[derive(Debug, Clone, Copy)]
pub struct Normalizer<'a> {
    classifier: &'a Classifier,
    min_year: i32,
}

impl<'a> Normalizer<'a> {
    #[must_use]
    pub const fn new(classifier: &'a Classifier, min_year: i32) -> Self {
        Self {
            classifier,
            min_year,
        }
    }

    /// Normalizes one record, or returns `None` if it is not kept.
    #[must_use]
    pub fn normalize(&self, record: &RawRecord) -> Option<Event> {
        let event = match record {
            RawRecord::Legacy(r) => self.legacy(r),
            RawRecord::Current(r) => self.current(r),
            RawRecord::Wildfire(r) => self.wildfire(r),
            RawRecord::HeatWave(r) => self.heat_wave(r),
        }?;

        (event.date.year() >= self.min_year).then_some(event)
    }

    /// Normalizes a batch, preserving input order among kept records.
    #[must_use]
    pub fn normalize_all(&self, records: &[RawRecord]) -> Vec<Event> {
        let events: Vec<Event> = records.iter().filter_map(|r| self.normalize(r)).collect();
        log::debug!(
            "Kept {} of {} records (min year {})",
            events.len(),
            records.len(),
            self.min_year
        );
        events
    }

    fn legacy(&self, r: &LegacyRecord) -> Option<Event> {
        let class = self
            .classifier
            .classify_reportable(&r.hazard, SeverityDescriptor::Legacy(&r.severity))?;

        Some(build(
            r.sequence.clone(),
            r.location,
            class,
            r.observed_at.date(),
            r.city.clone(),
            r.imprecision
                .as_deref()
                .is_some_and(|v| v.trim().eq_ignore_ascii_case(LEGACY_IMPRECISE_LOCATION)),
        ))
    }

    fn current(&self, r: &CurrentRecord) -> Option<Event> {
        let class = self
            .classifier
            .classify_reportable(&r.hazard, SeverityDescriptor::Current(&r.severity))?;
        let date = r.started_on.or(r.reported_on)?;

        Some(build(
            format!(
                "{}{}{}",
                r.hazard_code,
                r.municipality_code,
                date.format("%Y%m%d")
            ),
            LngLat::new(r.coord_x, r.coord_y),
            class,
            date,
            non_empty(&r.municipality),
            r.location_precision.trim().to_lowercase() == CURRENT_IMPRECISE_LOCATION,
        ))
    }

    fn wildfire(&self, r: &WildfireRecord) -> Option<Event> {
        let class = self
            .classifier
            .classify_derived(DerivedSource::Wildfire, SeverityDescriptor::BurnArea(r.area_ha));
        if !class.is_reportable() {
            return None;
        }

        Some(build(
            r.key.to_string(),
            LngLat::new(r.longitude, r.latitude),
            class,
            r.started_on,
            None,
            false,
        ))
    }

    fn heat_wave(&self, r: &HeatWaveRecord) -> Option<Event> {
        let class = self.classifier.classify_derived(
            DerivedSource::HeatWave,
            SeverityDescriptor::RunLength(r.duration_days),
        );
        if !class.is_reportable() {
            return None;
        }

        Some(build(
            format!("{}_{}", r.station_id, r.start_date.format("%Y%m%d")),
            LngLat::new(r.longitude, r.latitude),
            class,
            r.start_date,
            non_empty(&r.name),
            true,
        ))
    }
}

fn build(
    id: String,
    location: LngLat,
    class: Classification,
    date: chrono::NaiveDate,
    city: Option<String>,
    loc_approx: bool,
) -> Event {
    Event {
        id,
        location,
        event_type: class.event_type,
        date,
        severity: class.severity,
        district: DistrictId::UNASSIGNED,
        city,
        loc_approx,
    }
}
