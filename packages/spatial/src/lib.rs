#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory spatial index for district assignment.
//!
//! Builds an R-tree over district envelopes once per run and answers
//! point-in-district lookups against it. The index is read-only after
//! construction, so lookups from many threads need no synchronisation.

mod shape;

use climate_map_catastrophe_models::{DistrictId, Event, LngLat};
use geojson::FeatureCollection;
use rayon::prelude::*;
use rstar::{AABB, RTree, RTreeObject};

pub use shape::DistrictShape;

/// Errors raised while reading district boundaries.
#[derive(Debug, thiserror::Error)]
pub enum SpatialError {
    /// A feature has no usable numeric `id` property.
    #[error("Feature {index} has no numeric \"id\" property")]
    MissingId {
        /// Position of the feature in the collection.
        index: usize,
    },

    /// A feature geometry could not be converted.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),
}

/// A district shape stored in the R-tree with its id.
struct DistrictEntry {
    id: DistrictId,
    envelope: AABB<[f64; 2]>,
    shape: DistrictShape,
}

impl RTreeObject for DistrictEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Spatial index over district shapes.
pub struct DistrictIndex {
    districts: RTree<DistrictEntry>,
}

impl DistrictIndex {
    /// Builds the index. Shapes without any polygon area are skipped.
    #[must_use]
    pub fn new(shapes: impl IntoIterator<Item = (DistrictId, DistrictShape)>) -> Self {
        let entries: Vec<DistrictEntry> = shapes
            .into_iter()
            .filter_map(|(id, shape)| {
                let Some(rect) = shape.bounding_rect() else {
                    log::warn!("District {id} has an empty shape, skipping");
                    return None;
                };
                Some(DistrictEntry {
                    id,
                    envelope: AABB::from_corners(
                        [rect.min().x, rect.min().y],
                        [rect.max().x, rect.max().y],
                    ),
                    shape,
                })
            })
            .collect();

        log::info!("Loaded {} districts into spatial index", entries.len());

        Self {
            districts: RTree::bulk_load(entries),
        }
    }

    /// Builds the index from a written district map, where each feature
    /// carries its district in an `id` property (number or numeric string).
    ///
    /// Features sharing an id are merged into one multi-piece shape.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError`] if a feature lacks an id or its geometry
    /// cannot be converted.
    pub fn from_feature_collection(collection: &FeatureCollection) -> Result<Self, SpatialError> {
        let mut shapes: std::collections::BTreeMap<DistrictId, Vec<DistrictShape>> =
            std::collections::BTreeMap::new();

        for (index, feature) in collection.features.iter().enumerate() {
            let id = feature
                .property("id")
                .and_then(|value| match value {
                    serde_json::Value::Number(n) => n.as_u64(),
                    serde_json::Value::String(s) => s.trim().parse().ok(),
                    _ => None,
                })
                .and_then(|id| u32::try_from(id).ok())
                .ok_or(SpatialError::MissingId { index })?;

            let Some(geometry) = feature.geometry.clone() else {
                log::warn!("District {id} feature has no geometry, skipping");
                continue;
            };
            let geometry: geo::Geometry<f64> = geometry.try_into()?;
            if let Some(shape) = DistrictShape::from_geometry(geometry) {
                shapes.entry(DistrictId(id)).or_default().push(shape);
            }
        }

        Ok(Self::new(shapes.into_iter().filter_map(|(id, pieces)| {
            DistrictShape::collection(pieces).map(|shape| (id, shape))
        })))
    }

    /// Number of indexed districts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.districts.size()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.districts.size() == 0
    }

    /// Looks up the district covering a point.
    ///
    /// Boundary points count as covered. When simplified boundaries make
    /// several districts cover the point, the lowest id wins.
    #[must_use]
    pub fn containing_district(&self, location: LngLat) -> Option<DistrictId> {
        let point = geo::Point::new(location.lng, location.lat);
        let query_env = AABB::from_point([location.lng, location.lat]);

        self.districts
            .locate_in_envelope_intersecting(&query_env)
            .filter(|entry| entry.shape.covers(&point))
            .map(|entry| entry.id)
            .min()
    }
}

/// Sets the event's district from its location, or
/// [`DistrictId::UNASSIGNED`] when no district covers it.
#[must_use]
pub fn assign(event: Event, index: &DistrictIndex) -> Event {
    let district = index
        .containing_district(event.location)
        .unwrap_or(DistrictId::UNASSIGNED);
    event.with_district(district)
}

/// Assigns every event in parallel, preserving order.
#[must_use]
pub fn assign_all(events: Vec<Event>, index: &DistrictIndex) -> Vec<Event> {
    let assigned: Vec<Event> = events
        .into_par_iter()
        .map(|event| assign(event, index))
        .collect();

    let unassigned = assigned
        .iter()
        .filter(|e| e.district.is_unassigned())
        .count();
    if unassigned > 0 {
        log::info!(
            "{unassigned} of {} events fall outside every district",
            assigned.len()
        );
    }

    assigned
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use climate_map_catastrophe_models::{EventType, Severity};
    use geo::{Polygon, polygon};

    use super::*;

    fn square(x: f64, y: f64, size: f64) -> Polygon<f64> {
        polygon![
            (x: x, y: y),
            (x: x + size, y: y),
            (x: x + size, y: y + size),
            (x: x, y: y + size),
        ]
    }

    /// Districts 1 and 2 share the edge x = 1; district 3 has two pieces.
    fn index() -> DistrictIndex {
        DistrictIndex::new([
            (DistrictId(2), DistrictShape::Polygon(square(1.0, 0.0, 1.0))),
            (DistrictId(1), DistrictShape::Polygon(square(0.0, 0.0, 1.0))),
            (
                DistrictId(3),
                DistrictShape::Collection(vec![
                    DistrictShape::Polygon(square(10.0, 10.0, 1.0)),
                    DistrictShape::Polygon(square(20.0, 20.0, 1.0)),
                ]),
            ),
        ])
    }

    fn event(lng: f64, lat: f64) -> Event {
        Event {
            id: "1".to_string(),
            location: LngLat::new(lng, lat),
            event_type: EventType::Flood,
            date: NaiveDate::from_ymd_opt(2019, 4, 20).unwrap(),
            severity: Severity::Important,
            district: DistrictId::UNASSIGNED,
            city: None,
            loc_approx: false,
        }
    }

    #[test]
    fn finds_containing_district() {
        let index = index();
        assert_eq!(index.len(), 3);
        assert_eq!(
            index.containing_district(LngLat::new(0.5, 0.5)),
            Some(DistrictId(1))
        );
        assert_eq!(
            index.containing_district(LngLat::new(1.5, 0.5)),
            Some(DistrictId(2))
        );
    }

    #[test]
    fn shared_boundary_resolves_to_lower_id() {
        let index = index();
        assert_eq!(
            index.containing_district(LngLat::new(1.0, 0.5)),
            Some(DistrictId(1))
        );
    }

    #[test]
    fn any_piece_matches() {
        let index = index();
        assert_eq!(
            index.containing_district(LngLat::new(20.5, 20.5)),
            Some(DistrictId(3))
        );
        assert_eq!(index.containing_district(LngLat::new(15.0, 15.0)), None);
    }

    #[test]
    fn outside_point_is_unassigned() {
        let index = index();
        let assigned = assign(event(-5.0, -5.0), &index);
        assert_eq!(assigned.district, DistrictId::UNASSIGNED);
    }

    #[test]
    fn assignment_is_idempotent_and_ordered() {
        let index = index();
        let events = vec![event(0.5, 0.5), event(1.5, 0.5), event(10.5, 10.5), event(50.0, 50.0)];
        let once = assign_all(events, &index);
        let districts: Vec<u32> = once.iter().map(|e| e.district.0).collect();
        assert_eq!(districts, vec![1, 2, 3, 0]);

        let twice = assign_all(once.clone(), &index);
        assert_eq!(once, twice);
    }

    #[test]
    fn builds_from_feature_collection() {
        let collection: FeatureCollection = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": { "id": 7, "name": "Ungava" },
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]
                    }
                },
                {
                    "type": "Feature",
                    "properties": { "id": 7, "name": "Ungava" },
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[5.0, 5.0], [6.0, 5.0], [6.0, 6.0], [5.0, 6.0], [5.0, 5.0]]]
                    }
                }
            ]
        }"#
        .parse()
        .unwrap();

        let index = DistrictIndex::from_feature_collection(&collection).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(
            index.containing_district(LngLat::new(5.5, 5.5)),
            Some(DistrictId(7))
        );
    }

    #[test]
    fn feature_without_id_is_rejected() {
        let collection: FeatureCollection = r#"{
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "properties": { "name": "?" }, "geometry": null }
            ]
        }"#
        .parse()
        .unwrap();

        assert!(matches!(
            DistrictIndex::from_feature_collection(&collection),
            Err(SpatialError::MissingId { index: 0 })
        ));
    }
}
