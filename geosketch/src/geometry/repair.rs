//! Repair of topologically invalid polygons.
//!
//! A polygon whose exterior ring crosses itself cannot be stored as-is. The
//! repair nodes the ring segments at every crossing and extracts the bounded
//! faces of the resulting planar subdivision, turning one self-intersecting
//! ring into a set of simple polygons covering the same linework.

use std::collections::{HashMap, HashSet};

use geo::line_intersection::{line_intersection, LineIntersection};
use geo_types::{Coord, Line, LineString, Polygon};

/// Quantization factor for vertex identity. Coordinates are WGS84 degrees,
/// so this keeps precision well below a millimetre.
const SNAP: f64 = 1e9;

const AREA_EPS: f64 = 1e-12;

type VertexKey = (i64, i64);

/// Splits a polygon with a self-intersecting exterior ring into the simple
/// polygons bounded by its linework.
///
/// A polygon that is already simple comes back unchanged (as the single
/// face of its own subdivision). Returns an empty vector when no bounded
/// face can be extracted; the caller decides the fallback.
pub fn split_invalid_polygon(polygon: &Polygon<f64>) -> Vec<Polygon<f64>> {
    let segments = node_segments(polygon.exterior());
    if segments.is_empty() {
        return vec![];
    }
    extract_faces(&segments)
}

fn vertex_key(coord: Coord<f64>) -> VertexKey {
    ((coord.x * SNAP).round() as i64, (coord.y * SNAP).round() as i64)
}

/// Splits every ring segment at its intersections with all other segments,
/// returning deduplicated noded segments.
fn node_segments(ring: &LineString<f64>) -> Vec<(Coord<f64>, Coord<f64>)> {
    let lines: Vec<Line<f64>> = ring
        .lines()
        .filter(|l| vertex_key(l.start) != vertex_key(l.end))
        .collect();

    let mut seen: HashSet<(VertexKey, VertexKey)> = HashSet::new();
    let mut result = vec![];

    for (i, line) in lines.iter().enumerate() {
        let mut cuts = vec![0.0, 1.0];
        for (j, other) in lines.iter().enumerate() {
            if i == j {
                continue;
            }
            match line_intersection(*line, *other) {
                Some(LineIntersection::SinglePoint { intersection, .. }) => {
                    cuts.push(parameter_of(line, intersection));
                }
                Some(LineIntersection::Collinear { intersection }) => {
                    cuts.push(parameter_of(line, intersection.start));
                    cuts.push(parameter_of(line, intersection.end));
                }
                None => {}
            }
        }
        cuts.sort_by(f64::total_cmp);

        for pair in cuts.windows(2) {
            let start = point_at(line, pair[0].clamp(0.0, 1.0));
            let end = point_at(line, pair[1].clamp(0.0, 1.0));
            let (start_key, end_key) = (vertex_key(start), vertex_key(end));
            if start_key == end_key {
                continue;
            }
            let id = if start_key < end_key {
                (start_key, end_key)
            } else {
                (end_key, start_key)
            };
            if seen.insert(id) {
                result.push((start, end));
            }
        }
    }

    result
}

fn parameter_of(line: &Line<f64>, point: Coord<f64>) -> f64 {
    let delta = line.delta();
    if delta.x.abs() >= delta.y.abs() {
        if delta.x == 0.0 {
            0.0
        } else {
            (point.x - line.start.x) / delta.x
        }
    } else {
        (point.y - line.start.y) / delta.y
    }
}

fn point_at(line: &Line<f64>, t: f64) -> Coord<f64> {
    if t <= 0.0 {
        line.start
    } else if t >= 1.0 {
        line.end
    } else {
        Coord {
            x: line.start.x + (line.end.x - line.start.x) * t,
            y: line.start.y + (line.end.y - line.start.y) * t,
        }
    }
}

/// Walks the faces of the planar subdivision formed by the noded segments.
///
/// Every segment contributes two directed half-edges. At each vertex the
/// outgoing edges are ordered by angle; the edge following `u -> v` within a
/// face is the clockwise predecessor of `v -> u` around `v`. Bounded faces
/// come out counter-clockwise and are kept; the unbounded face comes out
/// clockwise and is dropped.
fn extract_faces(segments: &[(Coord<f64>, Coord<f64>)]) -> Vec<Polygon<f64>> {
    let mut coords: HashMap<VertexKey, Coord<f64>> = HashMap::new();
    let mut outgoing: HashMap<VertexKey, Vec<VertexKey>> = HashMap::new();

    for (start, end) in segments {
        let start_key = vertex_key(*start);
        let end_key = vertex_key(*end);
        coords.entry(start_key).or_insert(*start);
        coords.entry(end_key).or_insert(*end);
        outgoing.entry(start_key).or_default().push(end_key);
        outgoing.entry(end_key).or_default().push(start_key);
    }

    for (vertex, targets) in outgoing.iter_mut() {
        let Some(origin) = coords.get(vertex).copied() else {
            continue;
        };
        targets.sort_by(|a, b| {
            let angle = |k: &VertexKey| {
                let c = coords.get(k).copied().unwrap_or(origin);
                (c.y - origin.y).atan2(c.x - origin.x)
            };
            angle(a).total_cmp(&angle(b))
        });
        targets.dedup();
    }

    let edge_limit = segments.len() * 2 + 1;
    let mut visited: HashSet<(VertexKey, VertexKey)> = HashSet::new();
    let mut faces = vec![];

    for (start, end) in segments {
        for first in [
            (vertex_key(*start), vertex_key(*end)),
            (vertex_key(*end), vertex_key(*start)),
        ] {
            if visited.contains(&first) {
                continue;
            }

            let mut ring_keys = vec![];
            let mut closed = false;
            let (mut u, mut v) = first;
            loop {
                if !visited.insert((u, v)) {
                    break;
                }
                ring_keys.push(u);

                let Some(targets) = outgoing.get(&v) else {
                    break;
                };
                let Some(index) = targets.iter().position(|&w| w == u) else {
                    break;
                };
                let next = targets[(index + targets.len() - 1) % targets.len()];
                u = v;
                v = next;

                if (u, v) == first {
                    closed = true;
                    break;
                }
                if ring_keys.len() > edge_limit {
                    break;
                }
            }

            if !closed || ring_keys.len() < 3 {
                continue;
            }
            let ring: Vec<Coord<f64>> = ring_keys
                .iter()
                .filter_map(|k| coords.get(k).copied())
                .collect();
            if ring.len() != ring_keys.len() {
                continue;
            }
            if signed_area(&ring) > AREA_EPS {
                let mut closed = ring;
                closed.push(closed[0]);
                faces.push(Polygon::new(LineString(closed), vec![]));
            }
        }
    }

    faces
}

fn signed_area(ring: &[Coord<f64>]) -> f64 {
    let count = ring.len();
    let mut doubled = 0.0;
    for i in 0..count {
        let a = ring[i];
        let b = ring[(i + 1) % count];
        doubled += a.x * b.y - b.x * a.y;
    }
    doubled / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use geo::Area;

    #[test]
    fn bowtie_splits_into_two_triangles() {
        let bowtie = Polygon::new(
            LineString(vec![
                Coord { x: 0.0, y: 0.0 },
                Coord { x: 4.0, y: 4.0 },
                Coord { x: 4.0, y: 0.0 },
                Coord { x: 0.0, y: 4.0 },
                Coord { x: 0.0, y: 0.0 },
            ]),
            vec![],
        );

        let mut parts = split_invalid_polygon(&bowtie);
        assert_eq!(parts.len(), 2);

        parts.sort_by(|a, b| a.unsigned_area().total_cmp(&b.unsigned_area()));
        assert_abs_diff_eq!(parts[0].unsigned_area(), 4.0, epsilon = 1e-9);
        assert_abs_diff_eq!(parts[1].unsigned_area(), 4.0, epsilon = 1e-9);
    }

    #[test]
    fn simple_polygon_is_returned_unchanged() {
        let square = Polygon::new(
            LineString(vec![
                Coord { x: 0.0, y: 0.0 },
                Coord { x: 1.0, y: 0.0 },
                Coord { x: 1.0, y: 1.0 },
                Coord { x: 0.0, y: 1.0 },
                Coord { x: 0.0, y: 0.0 },
            ]),
            vec![],
        );

        let parts = split_invalid_polygon(&square);
        assert_eq!(parts.len(), 1);
        assert_abs_diff_eq!(parts[0].unsigned_area(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn degenerate_ring_yields_nothing() {
        let degenerate = Polygon::new(
            LineString(vec![
                Coord { x: 0.0, y: 0.0 },
                Coord { x: 0.0, y: 0.0 },
            ]),
            vec![],
        );
        assert!(split_invalid_polygon(&degenerate).is_empty());
    }
}
