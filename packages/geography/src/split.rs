//! Division of one district in two along a cut line.

use geo::{BooleanOps, BoundingRect, LineString, MultiPolygon, Polygon};

use crate::MapError;

/// Horizontal overshoot past the shape's bounds, in degrees.
const OVERSHOOT: f64 = 1.0;

/// Splits `shape` into its parts (north of `cut`, south of `cut`).
///
/// The cut vertices are ordered by longitude and the line is extended
/// horizontally past the shape's bounds at both ends, so every point of the
/// shape lies on exactly one side. Either part may be empty.
///
/// # Errors
///
/// Returns [`MapError::InvalidSplit`] if the cut has fewer than two
/// vertices, a non-finite coordinate, or the shape is empty.
pub fn split_north(
    district: &str,
    shape: &MultiPolygon<f64>,
    cut: &[[f64; 2]],
) -> Result<(MultiPolygon<f64>, MultiPolygon<f64>), MapError> {
    let invalid = |message: &str| MapError::InvalidSplit {
        district: district.to_string(),
        message: message.to_string(),
    };

    if cut.len() < 2 {
        return Err(invalid("cut line needs at least two vertices"));
    }
    if cut.iter().flatten().any(|c| !c.is_finite()) {
        return Err(invalid("cut line has a non-finite coordinate"));
    }
    let bounds = shape
        .bounding_rect()
        .ok_or_else(|| invalid("district shape is empty"))?;

    let mut vertices = cut.to_vec();
    vertices.sort_by(|a, b| a[0].total_cmp(&b[0]));

    let west = bounds.min().x.min(vertices[0][0]) - OVERSHOOT;
    let east = bounds.max().x.max(vertices[vertices.len() - 1][0]) + OVERSHOOT;
    let top = bounds.max().y.max(vertices.iter().map(|v| v[1]).fold(f64::MIN, f64::max)) + OVERSHOOT;

    let mut ring = Vec::with_capacity(vertices.len() + 4);
    ring.push((west, vertices[0][1]));
    ring.extend(vertices.iter().map(|v| (v[0], v[1])));
    ring.push((east, vertices[vertices.len() - 1][1]));
    ring.push((east, top));
    ring.push((west, top));

    let north_half = Polygon::new(LineString::from(ring), vec![]);
    let north = shape.intersection(&north_half);
    let south = shape.difference(&north_half);

    Ok((north, south))
}

#[cfg(test)]
mod tests {
    use geo::{Area, Contains, Point, polygon};

    use super::*;

    fn unit_square() -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![
            (x: 0.0, y: 0.0),
            (x: 10.0, y: 0.0),
            (x: 10.0, y: 10.0),
            (x: 0.0, y: 10.0),
        ]])
    }

    #[test]
    fn horizontal_cut_halves_area() {
        let (north, south) = split_north("Test", &unit_square(), &[[2.0, 6.0], [8.0, 6.0]]).unwrap();
        assert!((north.unsigned_area() - 40.0).abs() < 1e-6);
        assert!((south.unsigned_area() - 60.0).abs() < 1e-6);
        assert!(north.contains(&Point::new(5.0, 8.0)));
        assert!(south.contains(&Point::new(5.0, 2.0)));
    }

    #[test]
    fn unordered_cut_is_sorted_by_longitude() {
        let (north, south) = split_north(
            "Test",
            &unit_square(),
            &[[10.0, 8.0], [0.0, 4.0], [5.0, 4.0]],
        )
        .unwrap();
        let total = north.unsigned_area() + south.unsigned_area();
        assert!((total - 100.0).abs() < 1e-6);
        assert!(north.contains(&Point::new(2.0, 6.0)));
        assert!(south.contains(&Point::new(9.0, 5.0)));
    }

    #[test]
    fn cut_above_shape_leaves_north_empty() {
        let (north, south) = split_north("Test", &unit_square(), &[[0.0, 20.0], [10.0, 20.0]]).unwrap();
        assert!(north.0.is_empty());
        assert!((south.unsigned_area() - 100.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_degenerate_cut() {
        assert!(matches!(
            split_north("Test", &unit_square(), &[[0.0, 5.0]]),
            Err(MapError::InvalidSplit { .. })
        ));
        assert!(split_north("Test", &unit_square(), &[[0.0, f64::NAN], [1.0, 1.0]]).is_err());
        assert!(split_north("Test", &MultiPolygon(vec![]), &[[0.0, 5.0], [1.0, 5.0]]).is_err());
    }
}
