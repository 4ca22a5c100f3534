//! Two-point cut and extend gesture.

use geosketch_types::{Geom, GeoPoint2d, GeoRect, ScreenPoint};

use crate::control::{EventPropagation, PointerEvent};
use crate::error::EditError;
use crate::feature::Feature;
use crate::geometry::ops;
use crate::render::{paints, Overlay, OverlayShape};
use crate::tools::{TaskOutcome, ToolContext};

/// Which boolean operation the gesture applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutExtendOp {
    /// The first geometry minus the second.
    Cut,
    /// Union of both geometries.
    Extend,
}

/// Staged result of a resolved cut/extend gesture.
///
/// `updated` keeps the identity of the feature under the gesture's start
/// point and carries the computed geometry; `remove` is the consumed feature
/// under the end point. The commit must apply both changes together.
pub(crate) struct CutExtendPreview {
    pub updated: Feature,
    pub remove: Feature,
    pub geometry: Geom,
}

/// Tool handling the press-drag-release gesture that picks the two features
/// a cut or extend operates on.
///
/// Storage is never touched while the gesture runs; the resolved preview is
/// staged by the owning tool group until an explicit commit.
pub(crate) struct CutExtendTool {
    op: CutExtendOp,
    start: Option<ScreenPoint>,
    path: Vec<ScreenPoint>,
}

impl CutExtendTool {
    pub fn new(op: CutExtendOp) -> Self {
        Self {
            op,
            start: None,
            path: vec![],
        }
    }

    pub fn op(&self) -> CutExtendOp {
        self.op
    }

    pub fn on_pointer_event(
        &mut self,
        ctx: &ToolContext<'_>,
        event: &PointerEvent,
    ) -> EventPropagation {
        match event {
            PointerEvent::DragStarted(position) => {
                self.start = Some(*position);
                self.path = vec![*position];
                EventPropagation::Consume
            }
            PointerEvent::Drag { to, .. } => {
                if self.start.is_some() {
                    self.path.push(*to);
                    ctx.messenger.request_redraw();
                }
                EventPropagation::Consume
            }
            PointerEvent::DragEnded(position) => {
                if let Some(start) = self.start.take() {
                    self.resolve(ctx, start, *position);
                }
                self.path.clear();
                ctx.messenger.request_redraw();
                EventPropagation::Consume
            }
            _ => EventPropagation::Propagate,
        }
    }

    pub fn overlay(&self, _ctx: &ToolContext<'_>) -> Overlay {
        let mut overlay = Overlay::new();
        let Some(start) = self.start else {
            return overlay;
        };

        overlay.push(OverlayShape::Circle {
            center: start,
            radius: 15.0,
            line: paints::GESTURE_STROKE,
            fill: Some(paints::GESTURE_FILL),
        });
        overlay.push(OverlayShape::Path {
            points: self.path.clone(),
            line: paints::GESTURE_STROKE,
        });
        if let Some(end) = self.path.last() {
            overlay.push(OverlayShape::Circle {
                center: *end,
                radius: 15.0,
                line: paints::GESTURE_STROKE,
                fill: Some(paints::GESTURE_FILL),
            });
        }

        overlay
    }

    /// Resolves both gesture points to features with a bounding-box query
    /// and computes the preview geometry on the background task.
    fn resolve(&self, ctx: &ToolContext<'_>, start: ScreenPoint, end: ScreenPoint) {
        let Some(start_geo) = ctx.map.screen_to_geo(start) else {
            return;
        };
        let Some(end_geo) = ctx.map.screen_to_geo(end) else {
            return;
        };

        let tolerance = screen_tolerance(ctx, end, ctx.options.selection_tolerance_px);
        let bounds = GeoRect::from_corners(start_geo, end_geo)
            .expand_degenerate(ctx.options.degenerate_bbox_eps);

        let store = ctx.store.clone();
        let layer = ctx.layer.clone();
        let op = self.op;

        let started = ctx.tasks.try_start(ctx.messenger.clone(), async move {
            let result = resolve_preview(
                store.as_ref(),
                &layer,
                bounds,
                start_geo,
                end_geo,
                tolerance,
                op,
            )
            .await;
            TaskOutcome::CutExtendResolved(result)
        });

        if !started {
            log::debug!("cut/extend resolution skipped: another operation is in flight");
        }
    }
}

async fn resolve_preview(
    store: &dyn crate::store::SpatialStore,
    layer: &crate::store::EditableLayer,
    bounds: GeoRect,
    start: GeoPoint2d,
    end: GeoPoint2d,
    tolerance: f64,
    op: CutExtendOp,
) -> Result<CutExtendPreview, EditError> {
    let features = store.query_bbox(layer, bounds).await?;

    let mut start_hit: Option<(Feature, Geom)> = None;
    let mut end_hit: Option<(Feature, Geom)> = None;
    for feature in features {
        if start_hit.is_some() && end_hit.is_some() {
            break;
        }
        let geometry = match feature.geometry() {
            Ok(geometry) => geometry,
            Err(error) => {
                log::warn!("skipping feature {} with bad geometry: {error}", feature.id());
                continue;
            }
        };
        if start_hit.is_none() && ops::intersects_point(&geometry, start, tolerance) {
            start_hit = Some((feature, geometry));
        } else if end_hit.is_none() && ops::intersects_point(&geometry, end, tolerance) {
            end_hit = Some((feature, geometry));
        }
    }

    let Some((start_feature, start_geometry)) = start_hit else {
        return Err(EditError::NothingTouched("start"));
    };
    let Some((end_feature, end_geometry)) = end_hit else {
        return Err(EditError::NothingTouched("end"));
    };

    let geometry = match op {
        CutExtendOp::Extend => ops::union(&start_geometry, &end_geometry)?,
        CutExtendOp::Cut => ops::difference(&start_geometry, &end_geometry)?,
    };

    let mut updated = start_feature;
    updated.set_geometry(&geometry)?;

    Ok(CutExtendPreview {
        updated,
        remove: end_feature,
        geometry,
    })
}

/// Width in degrees of `pixels` screen pixels around the given position.
fn screen_tolerance(ctx: &ToolContext<'_>, at: ScreenPoint, pixels: f64) -> f64 {
    let shifted = ScreenPoint::new(at.x + pixels, at.y);
    match (ctx.map.screen_to_geo(at), ctx.map.screen_to_geo(shifted)) {
        (Some(a), Some(b)) => (b.lon() - a.lon()).abs(),
        _ => 0.0,
    }
}
