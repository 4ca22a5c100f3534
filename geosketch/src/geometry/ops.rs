//! Union, difference and proximity operations over [`Geom`] values.

use geo::line_intersection::{line_intersection, LineIntersection};
use geo::{BooleanOps, EuclideanDistance};
use geo_types::{Coord, Line, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};
use geosketch_types::{Geom, GeoPoint2d, GeometryKind};

use crate::error::EditError;

/// Tolerance for treating two coordinates as the same vertex.
const COORD_EPS: f64 = 1e-9;

/// Union of two geometries of the same kind.
///
/// Polygons are combined with a boolean union. Lines sharing an endpoint are
/// merged into a single line string, otherwise collected into a multi line.
/// Point sets are concatenated with duplicates removed.
pub fn union(a: &Geom, b: &Geom) -> Result<Geom, EditError> {
    match (a.kind(), b.kind()) {
        (GeometryKind::Polygon, GeometryKind::Polygon) => {
            let left = multi_polygon_of(a);
            let right = multi_polygon_of(b);
            Ok(normalize_polygons(left.union(&right)))
        }
        (GeometryKind::Line, GeometryKind::Line) => {
            let mut lines = lines_of(a);
            lines.extend(lines_of(b));
            if let [first, second] = &lines[..] {
                return Ok(merge_lines(first.clone(), second.clone()));
            }
            Ok(Geom::MultiLine(MultiLineString(lines)))
        }
        (GeometryKind::Point, GeometryKind::Point) => {
            let mut points = points_of(a);
            for candidate in points_of(b) {
                if !points
                    .iter()
                    .any(|p| coords_close(p.0, candidate.0))
                {
                    points.push(candidate);
                }
            }
            Ok(normalize_points(points))
        }
        (ka, kb) => Err(EditError::Geometry(format!(
            "cannot combine {ka} and {kb} geometries"
        ))),
    }
}

/// Difference of two geometries of the same kind: `a` minus `b`.
///
/// Not commutative - the first argument survives with the second removed
/// from it.
pub fn difference(a: &Geom, b: &Geom) -> Result<Geom, EditError> {
    match (a.kind(), b.kind()) {
        (GeometryKind::Polygon, GeometryKind::Polygon) => {
            let left = multi_polygon_of(a);
            let right = multi_polygon_of(b);
            Ok(normalize_polygons(left.difference(&right)))
        }
        (GeometryKind::Line, GeometryKind::Line) => {
            Ok(line_difference(lines_of(a), &lines_of(b)))
        }
        (GeometryKind::Point, GeometryKind::Point) => {
            let removed = points_of(b);
            let remaining: Vec<Point<f64>> = points_of(a)
                .into_iter()
                .filter(|p| !removed.iter().any(|r| coords_close(p.0, r.0)))
                .collect();
            Ok(normalize_points(remaining))
        }
        (ka, kb) => Err(EditError::Geometry(format!(
            "cannot subtract {kb} from {ka} geometries"
        ))),
    }
}

/// Distance in coordinate units between a point and the nearest part of the
/// geometry. Zero for points inside a polygon.
pub fn distance_to(geom: &Geom, point: GeoPoint2d) -> f64 {
    let query: Point<f64> = point.into();
    match geom {
        Geom::Point(p) => query.euclidean_distance(p),
        Geom::MultiPoint(points) => points
            .0
            .iter()
            .map(|p| query.euclidean_distance(p))
            .fold(f64::INFINITY, f64::min),
        Geom::Line(line) => query.euclidean_distance(line),
        Geom::MultiLine(lines) => lines
            .0
            .iter()
            .map(|l| query.euclidean_distance(l))
            .fold(f64::INFINITY, f64::min),
        Geom::Polygon(polygon) => query.euclidean_distance(polygon),
        Geom::MultiPolygon(polygons) => polygons
            .0
            .iter()
            .map(|p| query.euclidean_distance(p))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Returns true if the point lies on or within `tolerance` of the geometry.
pub fn intersects_point(geom: &Geom, point: GeoPoint2d, tolerance: f64) -> bool {
    distance_to(geom, point) <= tolerance
}

/// Checks that a closed ring does not intersect itself.
///
/// Consecutive duplicate vertices are collapsed before the check; adjacent
/// segments may only share their common endpoint.
pub fn ring_is_simple(ring: &LineString<f64>) -> bool {
    let mut coords: Vec<Coord<f64>> = vec![];
    for coord in &ring.0 {
        if coords.last().map(|c| coords_close(*c, *coord)) != Some(true) {
            coords.push(*coord);
        }
    }
    if coords.len() > 1 && coords.first() == coords.last() {
        coords.pop();
    }
    if coords.len() < 3 {
        return true;
    }

    let count = coords.len();
    let segments: Vec<Line<f64>> = (0..count)
        .map(|i| Line::new(coords[i], coords[(i + 1) % count]))
        .collect();

    for i in 0..count {
        for j in (i + 1)..count {
            let adjacent = j == i + 1 || (i == 0 && j == count - 1);
            match line_intersection(segments[i], segments[j]) {
                None => {}
                Some(LineIntersection::SinglePoint { is_proper, .. }) => {
                    if is_proper || !adjacent {
                        return false;
                    }
                }
                Some(LineIntersection::Collinear { .. }) => return false,
            }
        }
    }

    true
}

/// Returns true if the polygon's rings are simple.
pub fn polygon_is_valid(polygon: &Polygon<f64>) -> bool {
    ring_is_simple(polygon.exterior()) && polygon.interiors().iter().all(ring_is_simple)
}

fn coords_close(a: Coord<f64>, b: Coord<f64>) -> bool {
    (a.x - b.x).abs() <= COORD_EPS && (a.y - b.y).abs() <= COORD_EPS
}

fn multi_polygon_of(geom: &Geom) -> MultiPolygon<f64> {
    match geom {
        Geom::Polygon(p) => MultiPolygon(vec![p.clone()]),
        Geom::MultiPolygon(mp) => mp.clone(),
        _ => MultiPolygon(vec![]),
    }
}

fn lines_of(geom: &Geom) -> Vec<LineString<f64>> {
    match geom {
        Geom::Line(l) => vec![l.clone()],
        Geom::MultiLine(ml) => ml.0.clone(),
        _ => vec![],
    }
}

fn points_of(geom: &Geom) -> Vec<Point<f64>> {
    match geom {
        Geom::Point(p) => vec![*p],
        Geom::MultiPoint(mp) => mp.0.clone(),
        _ => vec![],
    }
}

fn normalize_polygons(mut result: MultiPolygon<f64>) -> Geom {
    if result.0.len() == 1 {
        match result.0.pop() {
            Some(single) => Geom::Polygon(single),
            None => Geom::MultiPolygon(result),
        }
    } else {
        Geom::MultiPolygon(result)
    }
}

fn normalize_points(mut points: Vec<Point<f64>>) -> Geom {
    if points.len() == 1 {
        match points.pop() {
            Some(single) => Geom::Point(single),
            None => Geom::MultiPoint(MultiPoint(points)),
        }
    } else {
        Geom::MultiPoint(MultiPoint(points))
    }
}

fn merge_lines(a: LineString<f64>, b: LineString<f64>) -> Geom {
    if a.0.is_empty() {
        return Geom::Line(b);
    }
    if b.0.is_empty() {
        return Geom::Line(a);
    }

    let a_first = a.0[0];
    let a_last = a.0[a.0.len() - 1];
    let b_first = b.0[0];
    let b_last = b.0[b.0.len() - 1];

    let chained: Option<Vec<Coord<f64>>> = if coords_close(a_last, b_first) {
        Some(a.0.iter().chain(b.0.iter().skip(1)).copied().collect())
    } else if coords_close(b_last, a_first) {
        Some(b.0.iter().chain(a.0.iter().skip(1)).copied().collect())
    } else if coords_close(a_last, b_last) {
        Some(a.0.iter().chain(b.0.iter().rev().skip(1)).copied().collect())
    } else if coords_close(a_first, b_first) {
        Some(a.0.iter().rev().chain(b.0.iter().skip(1)).copied().collect())
    } else {
        None
    };

    match chained {
        Some(coords) => Geom::Line(LineString(coords)),
        None => Geom::MultiLine(MultiLineString(vec![a, b])),
    }
}

fn line_difference(lines: Vec<LineString<f64>>, removed: &[LineString<f64>]) -> Geom {
    let on_removed = |coord: Coord<f64>| {
        let point = Point(coord);
        removed
            .iter()
            .map(|l| point.euclidean_distance(l))
            .fold(f64::INFINITY, f64::min)
            <= COORD_EPS
    };

    let mut chains: Vec<LineString<f64>> = vec![];
    for line in lines {
        let mut current: Vec<Coord<f64>> = vec![];
        for segment in line.lines() {
            let midpoint = Coord {
                x: (segment.start.x + segment.end.x) / 2.0,
                y: (segment.start.y + segment.end.y) / 2.0,
            };
            let covered =
                on_removed(segment.start) && on_removed(segment.end) && on_removed(midpoint);
            if covered {
                if current.len() >= 2 {
                    chains.push(LineString(std::mem::take(&mut current)));
                } else {
                    current.clear();
                }
            } else {
                if current.is_empty() {
                    current.push(segment.start);
                }
                current.push(segment.end);
            }
        }
        if current.len() >= 2 {
            chains.push(LineString(current));
        }
    }

    if chains.len() == 1 {
        match chains.pop() {
            Some(single) => Geom::Line(single),
            None => Geom::MultiLine(MultiLineString(chains)),
        }
    } else {
        Geom::MultiLine(MultiLineString(chains))
    }
}
