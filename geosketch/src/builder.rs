//! Incremental construction of a candidate geometry.

use geosketch_types::{Geom, GeoPoint2d, GeometryKind};

use crate::geometry::ops;

/// Non-blocking warning raised while editing a candidate geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidityWarning {
    /// The polygon ring built from the current vertices intersects itself.
    SelfIntersectingPolygon,
}

/// Accumulates an ordered sequence of coordinates into a candidate geometry.
///
/// The derived geometry is recomputed from scratch on every mutation, never
/// patched. Invalid intermediate states are allowed: a self-intersecting
/// polygon is reported through a [`ValidityWarning`] exactly once - after
/// the first warning the builder stays silent even if the ring becomes valid
/// and then invalid again (carried behavior of the original editor).
#[derive(Debug)]
pub struct GeometryBuilder {
    kind: GeometryKind,
    coordinates: Vec<GeoPoint2d>,
    derived: Option<Geom>,
    first_invalid: bool,
}

impl GeometryBuilder {
    /// Creates an empty builder for the given geometry kind.
    pub fn new(kind: GeometryKind) -> Self {
        Self {
            kind,
            coordinates: vec![],
            derived: None,
            first_invalid: true,
        }
    }

    /// The geometry kind being built.
    pub fn kind(&self) -> GeometryKind {
        self.kind
    }

    /// Appends a coordinate to the sequence. Never fails.
    pub fn add_vertex(&mut self, coordinate: GeoPoint2d) -> Option<ValidityWarning> {
        self.coordinates.push(coordinate);
        self.recompute()
    }

    /// Removes the last coordinate, returning the number of remaining ones.
    pub fn undo_last_vertex(&mut self) -> usize {
        self.coordinates.pop();
        self.recompute();
        self.coordinates.len()
    }

    /// The current derived geometry, or `None` while below the minimum
    /// vertex count for the kind.
    pub fn candidate(&self) -> Option<&Geom> {
        self.derived.as_ref()
    }

    /// Coordinates added so far, in insertion order.
    pub fn coordinates(&self) -> &[GeoPoint2d] {
        &self.coordinates
    }

    /// Number of coordinates added so far.
    pub fn vertex_count(&self) -> usize {
        self.coordinates.len()
    }

    /// Whether enough vertices are present for the commit action to be
    /// offered: two for lines, three for polygons, one for points.
    pub fn commit_ready(&self) -> bool {
        self.coordinates.len() >= self.kind.min_vertices()
    }

    /// Discards all coordinates and the derived geometry.
    pub fn clear(&mut self) {
        self.coordinates.clear();
        self.derived = None;
    }

    fn recompute(&mut self) -> Option<ValidityWarning> {
        self.derived = match self.kind {
            GeometryKind::Line => Geom::line_from(&self.coordinates).ok(),
            GeometryKind::Polygon => Geom::polygon_from(&self.coordinates).ok(),
            GeometryKind::Point => Geom::points_from(&self.coordinates).ok(),
        };

        if let Some(Geom::Polygon(polygon)) = &self.derived {
            if !ops::polygon_is_valid(polygon) && self.first_invalid {
                self.first_invalid = false;
                return Some(ValidityWarning::SelfIntersectingPolygon);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geosketch_types::latlon;

    #[test]
    fn line_has_no_geometry_below_two_vertices() {
        let mut builder = GeometryBuilder::new(GeometryKind::Line);
        assert!(builder.candidate().is_none());

        builder.add_vertex(latlon!(45.0, 10.0));
        assert!(builder.candidate().is_none());
        assert!(!builder.commit_ready());

        builder.add_vertex(latlon!(45.1, 10.1));
        let Some(Geom::Line(line)) = builder.candidate() else {
            panic!("expected a line candidate");
        };
        assert_eq!(line.0.len(), 2);
        assert!(builder.commit_ready());
    }

    #[test]
    fn vertices_keep_insertion_order() {
        let mut builder = GeometryBuilder::new(GeometryKind::Line);
        builder.add_vertex(latlon!(45.0, 10.0));
        builder.add_vertex(latlon!(45.1, 10.1));
        builder.add_vertex(latlon!(45.0, 10.2));

        let Some(Geom::Line(line)) = builder.candidate() else {
            panic!("expected a line candidate");
        };
        let lons: Vec<f64> = line.0.iter().map(|c| c.x).collect();
        assert_eq!(lons, vec![10.0, 10.1, 10.2]);
    }

    #[test]
    fn undo_is_the_inverse_of_add() {
        let mut builder = GeometryBuilder::new(GeometryKind::Polygon);
        builder.add_vertex(latlon!(45.0, 10.0));
        builder.add_vertex(latlon!(45.1, 10.1));
        let before = builder.coordinates().to_vec();

        builder.add_vertex(latlon!(45.2, 10.2));
        let remaining = builder.undo_last_vertex();

        assert_eq!(remaining, 2);
        assert_eq!(builder.coordinates(), &before[..]);
    }

    #[test]
    fn polygon_ring_closes_and_revalidates() {
        let mut builder = GeometryBuilder::new(GeometryKind::Polygon);
        builder.add_vertex(latlon!(0.0, 0.0));
        builder.add_vertex(latlon!(4.0, 4.0));
        assert!(builder.candidate().is_none());

        builder.add_vertex(latlon!(0.0, 4.0));
        let Some(Geom::Polygon(polygon)) = builder.candidate() else {
            panic!("expected a polygon candidate");
        };
        assert_eq!(polygon.exterior().0.first(), polygon.exterior().0.last());
    }

    #[test]
    fn self_intersection_warns_only_once() {
        let mut builder = GeometryBuilder::new(GeometryKind::Polygon);
        builder.add_vertex(latlon!(0.0, 0.0));
        builder.add_vertex(latlon!(4.0, 4.0));
        builder.add_vertex(latlon!(0.0, 4.0));

        // closing the bowtie: segments cross
        let warning = builder.add_vertex(latlon!(4.0, 0.0));
        assert_eq!(warning, Some(ValidityWarning::SelfIntersectingPolygon));

        // still invalid, but the warning is not repeated
        assert_eq!(builder.add_vertex(latlon!(4.5, 0.0)), None);
    }
}
