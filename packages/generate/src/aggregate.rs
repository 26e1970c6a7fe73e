//! Groups events and region statistics by year.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Datelike as _;
use climate_map_catastrophe_models::Event;
use climate_map_climate::statistics::{RegionStatistics, RegionValues};
use serde::Serialize;

/// Content of `yearly_data/<year>.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct YearlyData {
    /// Events of the year, in date order.
    pub catastrophes: Vec<Event>,
    /// Region id -> metric -> value. Metrics without a value are absent.
    pub statistics: RegionValues,
}

/// Buckets events by year after a stable sort by date, so events sharing
/// a date keep their collection order.
#[must_use]
pub fn group_by_year(mut events: Vec<Event>) -> BTreeMap<i32, Vec<Event>> {
    events.sort_by_key(|event| event.date);

    let mut years: BTreeMap<i32, Vec<Event>> = BTreeMap::new();
    for event in events {
        years.entry(event.date.year()).or_default().push(event);
    }
    years
}

/// Builds one [`YearlyData`] per year that has events or statistics.
#[must_use]
pub fn aggregate(events: Vec<Event>, statistics: &RegionStatistics) -> BTreeMap<i32, YearlyData> {
    let mut by_year = group_by_year(events);
    let years: BTreeSet<i32> = by_year.keys().copied().chain(statistics.years()).collect();

    years
        .into_iter()
        .map(|year| {
            let data = YearlyData {
                catastrophes: by_year.remove(&year).unwrap_or_default(),
                statistics: statistics.for_year(year).cloned().unwrap_or_default(),
            };
            (year, data)
        })
        .collect()
}
