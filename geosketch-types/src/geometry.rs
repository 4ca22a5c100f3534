use serde::{Deserialize, Serialize};

use crate::{GeoPoint2d, GeoRect, TypesError};

/// Geometry type declared by an editable layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum GeometryKind {
    /// Point features.
    Point,
    /// Line features.
    Line,
    /// Polygon features.
    Polygon,
}

impl GeometryKind {
    /// Returns true if a geometry can be stored in a layer of this kind.
    ///
    /// Multi-variants are compatible with the base kind: a layer declared as
    /// `Polygon` accepts both polygons and multipolygons.
    pub fn is_compatible(&self, geometry: &Geom) -> bool {
        *self == geometry.kind()
    }

    /// Minimum number of distinct vertices needed for a committable geometry.
    pub fn min_vertices(&self) -> usize {
        match self {
            GeometryKind::Point => 1,
            GeometryKind::Line => 2,
            GeometryKind::Polygon => 3,
        }
    }
}

impl std::fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryKind::Point => write!(f, "point"),
            GeometryKind::Line => write!(f, "line"),
            GeometryKind::Polygon => write!(f, "polygon"),
        }
    }
}

/// Concrete geometry value.
///
/// A thin sum type over the `geo-types` primitives the editing engine works
/// with. Coordinates are WGS84 degrees with `x = longitude`, `y = latitude`.
#[derive(Debug, Clone, PartialEq)]
pub enum Geom {
    /// Single point.
    Point(geo_types::Point<f64>),
    /// Set of points.
    MultiPoint(geo_types::MultiPoint<f64>),
    /// Single line string.
    Line(geo_types::LineString<f64>),
    /// Set of line strings.
    MultiLine(geo_types::MultiLineString<f64>),
    /// Single polygon.
    Polygon(geo_types::Polygon<f64>),
    /// Set of polygons.
    MultiPolygon(geo_types::MultiPolygon<f64>),
}

impl Geom {
    /// The layer kind this geometry belongs to.
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geom::Point(_) | Geom::MultiPoint(_) => GeometryKind::Point,
            Geom::Line(_) | Geom::MultiLine(_) => GeometryKind::Line,
            Geom::Polygon(_) | Geom::MultiPolygon(_) => GeometryKind::Polygon,
        }
    }

    /// Number of single geometries contained in this value.
    pub fn geometry_count(&self) -> usize {
        match self {
            Geom::Point(_) | Geom::Line(_) | Geom::Polygon(_) => 1,
            Geom::MultiPoint(v) => v.0.len(),
            Geom::MultiLine(v) => v.0.len(),
            Geom::MultiPolygon(v) => v.0.len(),
        }
    }

    /// Constructs a line from an ordered coordinate sequence.
    pub fn line_from(points: &[GeoPoint2d]) -> Result<Self, TypesError> {
        if points.len() < 2 {
            return Err(TypesError::NotEnoughPoints("line"));
        }
        Ok(Geom::Line(geo_types::LineString(
            points.iter().map(|p| (*p).into()).collect(),
        )))
    }

    /// Constructs a polygon from an ordered coordinate sequence.
    ///
    /// The ring is closed automatically: the first coordinate is appended as
    /// the last one.
    pub fn polygon_from(points: &[GeoPoint2d]) -> Result<Self, TypesError> {
        if points.len() < 3 {
            return Err(TypesError::NotEnoughPoints("polygon"));
        }
        let mut coords: Vec<geo_types::Coord<f64>> = points.iter().map(|p| (*p).into()).collect();
        if coords.first() != coords.last() {
            coords.push(coords[0]);
        }
        Ok(Geom::Polygon(geo_types::Polygon::new(
            geo_types::LineString(coords),
            vec![],
        )))
    }

    /// Constructs a point or multipoint from a coordinate sequence.
    pub fn points_from(points: &[GeoPoint2d]) -> Result<Self, TypesError> {
        match points {
            [] => Err(TypesError::NotEnoughPoints("point")),
            [single] => Ok(Geom::Point((*single).into())),
            multiple => Ok(Geom::MultiPoint(geo_types::MultiPoint(
                multiple.iter().map(|p| (*p).into()).collect(),
            ))),
        }
    }

    /// Bounding box of the geometry, or `None` for an empty one.
    pub fn bounding_rect(&self) -> Option<GeoRect> {
        let mut bounds: Option<GeoRect> = None;
        self.visit_coords(&mut |coord| {
            let point = GeoRect::from_point(coord.into());
            bounds = Some(match bounds {
                Some(current) => current.merge(&point),
                None => point,
            });
        });
        bounds
    }

    fn visit_coords(&self, visitor: &mut impl FnMut(geo_types::Coord<f64>)) {
        fn visit_line(line: &geo_types::LineString<f64>, v: &mut impl FnMut(geo_types::Coord<f64>)) {
            for coord in &line.0 {
                v(*coord);
            }
        }
        fn visit_polygon(
            polygon: &geo_types::Polygon<f64>,
            v: &mut impl FnMut(geo_types::Coord<f64>),
        ) {
            visit_line(polygon.exterior(), v);
            for interior in polygon.interiors() {
                visit_line(interior, v);
            }
        }

        match self {
            Geom::Point(p) => visitor(p.0),
            Geom::MultiPoint(points) => {
                for p in &points.0 {
                    visitor(p.0);
                }
            }
            Geom::Line(line) => visit_line(line, visitor),
            Geom::MultiLine(lines) => {
                for line in &lines.0 {
                    visit_line(line, visitor);
                }
            }
            Geom::Polygon(polygon) => visit_polygon(polygon, visitor),
            Geom::MultiPolygon(polygons) => {
                for polygon in &polygons.0 {
                    visit_polygon(polygon, visitor);
                }
            }
        }
    }
}

impl TryFrom<geo_types::Geometry<f64>> for Geom {
    type Error = TypesError;

    fn try_from(value: geo_types::Geometry<f64>) -> Result<Self, Self::Error> {
        match value {
            geo_types::Geometry::Point(v) => Ok(Geom::Point(v)),
            geo_types::Geometry::MultiPoint(v) => Ok(Geom::MultiPoint(v)),
            geo_types::Geometry::LineString(v) => Ok(Geom::Line(v)),
            geo_types::Geometry::MultiLineString(v) => Ok(Geom::MultiLine(v)),
            geo_types::Geometry::Polygon(v) => Ok(Geom::Polygon(v)),
            geo_types::Geometry::MultiPolygon(v) => Ok(Geom::MultiPolygon(v)),
            geo_types::Geometry::GeometryCollection(_) => {
                Err(TypesError::UnsupportedGeometry("geometry collection"))
            }
            geo_types::Geometry::Line(_) => Err(TypesError::UnsupportedGeometry("line segment")),
            geo_types::Geometry::Rect(_) => Err(TypesError::UnsupportedGeometry("rect")),
            geo_types::Geometry::Triangle(_) => Err(TypesError::UnsupportedGeometry("triangle")),
        }
    }
}

impl From<Geom> for geo_types::Geometry<f64> {
    fn from(value: Geom) -> Self {
        match value {
            Geom::Point(v) => geo_types::Geometry::Point(v),
            Geom::MultiPoint(v) => geo_types::Geometry::MultiPoint(v),
            Geom::Line(v) => geo_types::Geometry::LineString(v),
            Geom::MultiLine(v) => geo_types::Geometry::MultiLineString(v),
            Geom::Polygon(v) => geo_types::Geometry::Polygon(v),
            Geom::MultiPolygon(v) => geo_types::Geometry::MultiPolygon(v),
        }
    }
}
