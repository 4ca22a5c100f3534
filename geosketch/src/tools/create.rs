//! Creation of new point, line and polygon features.

use geosketch_types::{Geom, GeoPoint2d, GeometryKind, ScreenPoint};

use crate::builder::{GeometryBuilder, ValidityWarning};
use crate::control::{EventPropagation, PointerEvent};
use crate::feature::Feature;
use crate::geometry::{ops, repair};
use crate::render::{self, paints, Overlay, OverlayShape};
use crate::tools::{TaskOutcome, ToolAction, ToolContext, Transition};

/// Tool group that accumulates vertices into a candidate geometry and
/// commits it as a new feature.
///
/// Vertices arrive from three sources: tap-on-map (while the toggle is on),
/// the GPS stream, and one-shot map-center snapshots. Tap-to-add and
/// GPS-stream are mutually exclusive; enabling one disables the other.
pub(crate) struct CreateFeatureToolGroup {
    builder: GeometryBuilder,
    gps_stream_active: bool,
    tap_to_add_active: bool,
    continued_feature: Option<Feature>,
}

impl CreateFeatureToolGroup {
    /// Creates the group for a fresh feature of the given kind.
    pub fn new(kind: GeometryKind) -> Self {
        Self {
            builder: GeometryBuilder::new(kind),
            gps_stream_active: false,
            tap_to_add_active: false,
            continued_feature: None,
        }
    }

    /// Creates the group seeded with an existing line feature. Committing
    /// updates that feature's geometry instead of inserting a new row.
    pub fn continuing(feature: Feature) -> Result<Self, crate::error::EditError> {
        let mut builder = GeometryBuilder::new(GeometryKind::Line);
        if let Geom::Line(line) = feature.geometry()? {
            for coord in &line.0 {
                builder.add_vertex(GeoPoint2d::latlon(coord.y, coord.x));
            }
        }
        Ok(Self {
            builder,
            gps_stream_active: false,
            tap_to_add_active: false,
            continued_feature: Some(feature),
        })
    }

    pub fn commit_ready(&self) -> bool {
        self.builder.commit_ready()
    }

    pub fn disable(&mut self) {
        self.gps_stream_active = false;
        self.tap_to_add_active = false;
    }

    pub fn on_pointer_event(
        &mut self,
        ctx: &ToolContext<'_>,
        event: &PointerEvent,
    ) -> EventPropagation {
        if !self.tap_to_add_active {
            return EventPropagation::Propagate;
        }
        match event {
            PointerEvent::Tap(position) => {
                if let Some(coordinate) = ctx.map.screen_to_geo(*position) {
                    self.add_vertex(ctx, coordinate);
                }
                EventPropagation::Consume
            }
            _ => EventPropagation::Propagate,
        }
    }

    pub fn on_action(
        &mut self,
        ctx: &ToolContext<'_>,
        action: &ToolAction,
    ) -> Option<Transition> {
        match action {
            ToolAction::AddVertexAtCenter => {
                self.gps_stream_active = false;
                self.tap_to_add_active = false;
                match ctx.map.center().or_else(|| ctx.preferences.map_center()) {
                    Some(coordinate) => self.add_vertex(ctx, coordinate),
                    None => log::debug!("no map center available for vertex insertion"),
                }
                None
            }
            ToolAction::AddGpsVertex => {
                self.tap_to_add_active = false;
                self.add_gps_vertex(ctx);
                None
            }
            ToolAction::ToggleGpsStream => {
                self.gps_stream_active = !self.gps_stream_active;
                self.tap_to_add_active = false;
                ctx.messenger.request_redraw();
                None
            }
            ToolAction::ToggleTapToAdd => {
                self.tap_to_add_active = !self.tap_to_add_active;
                self.gps_stream_active = false;
                ctx.messenger.request_redraw();
                None
            }
            ToolAction::Undo => {
                if self.builder.vertex_count() == 0 {
                    return Some(Transition::Exit);
                }
                let remaining = self.builder.undo_last_vertex();
                ctx.messenger.request_redraw();
                if remaining == 0 {
                    return Some(Transition::Exit);
                }
                None
            }
            ToolAction::Commit => {
                self.commit(ctx);
                None
            }
            _ => None,
        }
    }

    pub fn on_gps_update(&mut self, ctx: &ToolContext<'_>, position: GeoPoint2d) {
        if self.gps_stream_active {
            self.add_vertex(ctx, position);
        }
    }

    pub fn on_task_outcome(
        &mut self,
        ctx: &ToolContext<'_>,
        outcome: TaskOutcome,
    ) -> Option<Transition> {
        let TaskOutcome::CreateCommitted(result) = outcome else {
            return None;
        };
        match result {
            Ok(count) => {
                log::debug!("committed {count} geometries to {}", ctx.layer.table);
                ctx.feedback.toast("geometry saved");
                self.builder.clear();
                ctx.messenger.request_map_refresh();
                Some(Transition::Exit)
            }
            Err(error) if error.is_conflict() => {
                ctx.feedback
                    .warning("the geometry violates a unique constraint in the layer");
                self.builder.clear();
                ctx.messenger.request_redraw();
                Some(Transition::Exit)
            }
            Err(error) => {
                log::error!("failed to save geometry: {error}");
                ctx.feedback.warning("failed to save the geometry");
                None
            }
        }
    }

    pub fn overlay(&self, ctx: &ToolContext<'_>) -> Overlay {
        let mut overlay = Overlay::new();

        if let Some(candidate) = self.builder.candidate() {
            for shape in render::geometry_shapes(
                candidate,
                ctx.map,
                paints::CREATED_HALO,
                Some(paints::CREATED_FILL),
            ) {
                overlay.push(shape);
            }
            for shape in
                render::geometry_shapes(candidate, ctx.map, paints::CREATED_STROKE, None)
            {
                overlay.push(shape);
            }
        }

        let projected: Vec<ScreenPoint> = self
            .builder
            .coordinates()
            .iter()
            .filter_map(|c| ctx.map.geo_to_screen(c))
            .collect();

        // a polygon of two vertices has no candidate yet; show the edge
        if self.builder.kind() == GeometryKind::Polygon && projected.len() == 2 {
            overlay.push(OverlayShape::Path {
                points: projected.clone(),
                line: paints::CREATED_HALO,
            });
            overlay.push(OverlayShape::Path {
                points: projected.clone(),
                line: paints::CREATED_STROKE,
            });
        }

        for vertex in projected {
            overlay.push(OverlayShape::Circle {
                center: vertex,
                radius: 10.0,
                line: paints::CREATED_HALO,
                fill: None,
            });
            overlay.push(OverlayShape::Circle {
                center: vertex,
                radius: 10.0,
                line: paints::CREATED_STROKE,
                fill: None,
            });
        }

        overlay
    }

    fn add_vertex(&mut self, ctx: &ToolContext<'_>, coordinate: GeoPoint2d) {
        if let Some(ValidityWarning::SelfIntersectingPolygon) = self.builder.add_vertex(coordinate)
        {
            ctx.feedback.warning("the drawn polygon intersects itself");
        }
        ctx.messenger.request_redraw();
    }

    fn add_gps_vertex(&mut self, ctx: &ToolContext<'_>) {
        match ctx.gps_fix {
            Some(coordinate) => self.add_vertex(ctx, coordinate),
            None => ctx
                .feedback
                .warning(&crate::error::EditError::NoGpsFix.to_string()),
        }
    }

    /// Persists the candidate. An invalid polygon is first split into simple
    /// parts; every resulting geometry is inserted. A continued feature is
    /// updated in place instead.
    fn commit(&mut self, ctx: &ToolContext<'_>) {
        if !self.builder.commit_ready() {
            log::debug!("commit requested below the minimum vertex count, ignored");
            return;
        }
        let Some(candidate) = self.builder.candidate().cloned() else {
            return;
        };

        let geometries = match &candidate {
            Geom::Polygon(polygon) if !ops::polygon_is_valid(polygon) => {
                let parts = repair::split_invalid_polygon(polygon);
                if parts.is_empty() {
                    log::warn!("could not repair the invalid polygon, storing it as drawn");
                    vec![candidate]
                } else {
                    parts.into_iter().map(Geom::Polygon).collect()
                }
            }
            _ => vec![candidate],
        };

        let store = ctx.store.clone();
        let layer = ctx.layer.clone();
        let srid = ctx.layer.srid;
        let continued = self.continued_feature.as_ref().map(|f| f.id());

        let started = ctx.tasks.try_start(ctx.messenger.clone(), async move {
            let result = async {
                match continued {
                    Some(id) => {
                        let count = geometries.len();
                        for geometry in &geometries {
                            store.update_geometry(&layer, id, geometry, srid).await?;
                        }
                        Ok(count)
                    }
                    None => {
                        let mut count = 0;
                        for geometry in &geometries {
                            store.insert(&layer, geometry, srid).await?;
                            count += 1;
                        }
                        Ok(count)
                    }
                }
            }
            .await;
            TaskOutcome::CreateCommitted(result)
        });

        if !started {
            log::debug!("commit skipped: another operation is in flight");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geosketch_types::latlon;

    #[test]
    fn continuing_seeds_the_existing_vertices() {
        use crate::feature::{FeatureId, SourceId};
        use crate::geometry::wkb;

        let line = Geom::line_from(&[latlon!(45.0, 11.0), latlon!(45.1, 11.1)])
            .expect("valid line input");
        let feature = Feature::new(
            SourceId::from("db"),
            "roads",
            FeatureId(7),
            wkb::to_wkb(&line).expect("wkb encoding"),
        );

        let group = CreateFeatureToolGroup::continuing(feature).expect("line feature");
        assert_eq!(group.builder.vertex_count(), 2);
        assert!(group.commit_ready());
    }
}
