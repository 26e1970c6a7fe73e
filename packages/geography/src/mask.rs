//! The "outside" mask: everything inside a bounding box that no district
//! covers. Only drawn by the map front-end; never used for assignment.

use climate_map_geography_models::MaskBounds;
use geo::{BooleanOps, BoundingRect, MultiPolygon, Rect, coord};

use crate::DistrictMap;

/// Union of all district shapes.
#[must_use]
pub fn district_union(map: &DistrictMap) -> MultiPolygon<f64> {
    map.iter()
        .map(|(_, district)| district.shape.to_multi_polygon())
        .fold(MultiPolygon(vec![]), |acc, shape| acc.union(&shape))
}

/// Subtracts the union of all districts from `bounds`, or from the union's
/// own bounding box grown by `margin` when no bounds are given.
#[must_use]
pub fn outside_mask(
    map: &DistrictMap,
    bounds: Option<MaskBounds>,
    margin: f64,
) -> MultiPolygon<f64> {
    let union = district_union(map);

    let bounds = bounds.or_else(|| {
        union.bounding_rect().map(|rect| {
            MaskBounds {
                min_lng: rect.min().x,
                min_lat: rect.min().y,
                max_lng: rect.max().x,
                max_lat: rect.max().y,
            }
            .expand(margin)
        })
    });
    let Some(bounds) = bounds else {
        log::warn!("District map is empty, outside mask is empty too");
        return MultiPolygon(vec![]);
    };

    let frame = Rect::new(
        coord! { x: bounds.min_lng, y: bounds.min_lat },
        coord! { x: bounds.max_lng, y: bounds.max_lat },
    )
    .to_polygon();

    MultiPolygon(vec![frame]).difference(&union)
}

#[cfg(test)]
mod tests {
    use climate_map_catastrophe_models::DistrictId;
    use climate_map_spatial::DistrictShape;
    use geo::{Area, Contains, Point, Polygon, polygon};

    use super::*;
    use crate::map::District;

    fn square(x: f64, y: f64) -> Polygon<f64> {
        polygon![
            (x: x, y: y),
            (x: x + 1.0, y: y),
            (x: x + 1.0, y: y + 1.0),
            (x: x, y: y + 1.0),
        ]
    }

    fn map() -> DistrictMap {
        DistrictMap::from_districts([
            (
                DistrictId(1),
                District {
                    name: "Ouest".to_string(),
                    shape: DistrictShape::Polygon(square(0.0, 0.0)),
                },
            ),
            (
                DistrictId(2),
                District {
                    name: "Est".to_string(),
                    shape: DistrictShape::Polygon(square(1.0, 0.0)),
                },
            ),
        ])
    }

    #[test]
    fn union_merges_neighbours() {
        let union = district_union(&map());
        assert!((union.unsigned_area() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn mask_with_margin() {
        let mask = outside_mask(&map(), None, 1.0);
        // Frame is 4 x 3, districts cover 2.
        assert!((mask.unsigned_area() - 10.0).abs() < 1e-9);
        assert!(!mask.contains(&Point::new(0.5, 0.5)));
        assert!(mask.contains(&Point::new(-0.5, -0.5)));
    }

    #[test]
    fn mask_with_configured_bounds() {
        let bounds = MaskBounds {
            min_lng: -10.0,
            min_lat: -10.0,
            max_lng: 10.0,
            max_lat: 10.0,
        };
        let mask = outside_mask(&map(), Some(bounds), 1.0);
        assert!((mask.unsigned_area() - 398.0).abs() < 1e-9);
    }

    #[test]
    fn empty_map_has_empty_mask() {
        let mask = outside_mask(&DistrictMap::default(), None, 1.0);
        assert!(mask.0.is_empty());
    }
}
