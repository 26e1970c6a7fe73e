//! District geometry.

use geo::{BoundingRect, Geometry, Intersects, MultiPolygon, Point, Polygon, Rect};

/// The territory of one district: a single polygon or a collection of
/// disjoint pieces (islands, or parts left over from a boundary redraw).
#[derive(Debug, Clone, PartialEq)]
pub enum DistrictShape {
    Polygon(Polygon<f64>),
    Collection(Vec<DistrictShape>),
}

impl DistrictShape {
    /// Converts a geometry, keeping only its areal parts.
    ///
    /// Returns `None` when nothing areal remains (points, lines, empty
    /// collections).
    #[must_use]
    pub fn from_geometry(geometry: Geometry<f64>) -> Option<Self> {
        match geometry {
            Geometry::Polygon(p) => Some(Self::Polygon(p)),
            Geometry::MultiPolygon(mp) => {
                Self::collection(mp.0.into_iter().map(Self::Polygon).collect())
            }
            Geometry::GeometryCollection(gc) => {
                Self::collection(gc.0.into_iter().filter_map(Self::from_geometry).collect())
            }
            Geometry::Rect(r) => Some(Self::Polygon(r.to_polygon())),
            Geometry::Triangle(t) => Some(Self::Polygon(t.to_polygon())),
            _ => None,
        }
    }

    /// Wraps pieces, collapsing a single piece to itself.
    #[must_use]
    pub fn collection(mut pieces: Vec<Self>) -> Option<Self> {
        match pieces.len() {
            0 => None,
            1 => pieces.pop(),
            _ => Some(Self::Collection(pieces)),
        }
    }

    /// Whether the point lies inside or on the boundary of any piece.
    #[must_use]
    pub fn covers(&self, point: &Point<f64>) -> bool {
        match self {
            Self::Polygon(p) => p.intersects(point),
            Self::Collection(pieces) => pieces.iter().any(|piece| piece.covers(point)),
        }
    }

    /// Flattens every piece into one [`MultiPolygon`].
    #[must_use]
    pub fn to_multi_polygon(&self) -> MultiPolygon<f64> {
        let mut polygons = Vec::new();
        self.collect_polygons(&mut polygons);
        MultiPolygon(polygons)
    }

    fn collect_polygons(&self, out: &mut Vec<Polygon<f64>>) {
        match self {
            Self::Polygon(p) => out.push(p.clone()),
            Self::Collection(pieces) => {
                for piece in pieces {
                    piece.collect_polygons(out);
                }
            }
        }
    }

    /// Polygon for single-piece districts, multi-polygon otherwise.
    #[must_use]
    pub fn to_geometry(&self) -> Geometry<f64> {
        match self {
            Self::Polygon(p) => Geometry::Polygon(p.clone()),
            Self::Collection(_) => Geometry::MultiPolygon(self.to_multi_polygon()),
        }
    }

    #[must_use]
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        self.to_multi_polygon().bounding_rect()
    }
}
