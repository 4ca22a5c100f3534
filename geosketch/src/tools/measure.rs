//! Tap-to-measure distance readout.

use geo::HaversineDistance;
use geosketch_types::GeoPoint2d;

use crate::control::{EventPropagation, PointerEvent};
use crate::render::{paints, Overlay, OverlayShape};
use crate::tools::{ToolAction, ToolContext, Transition};

const FEET_PER_METER: f64 = 3.28084;
const FEET_PER_MILE: f64 = 5280.0;

/// Tool that accumulates tapped coordinates and reports the cumulative
/// distance along them. Nothing is persisted; leaving the mode discards the
/// points.
pub(crate) struct MeasureTool {
    points: Vec<GeoPoint2d>,
}

impl MeasureTool {
    pub fn new() -> Self {
        Self { points: vec![] }
    }

    /// Total path length in meters.
    pub fn distance_meters(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| {
                let a: geo_types::Point<f64> = pair[0].into();
                let b: geo_types::Point<f64> = pair[1].into();
                a.haversine_distance(&b)
            })
            .sum()
    }

    /// The distance formatted for display, metric or imperial depending on
    /// the preferences.
    pub fn formatted_distance(&self, imperial: bool) -> String {
        let meters = self.distance_meters();
        if imperial {
            let feet = meters * FEET_PER_METER;
            if feet < FEET_PER_MILE {
                format!("{feet:.0} ft")
            } else {
                format!("{:.2} mi", feet / FEET_PER_MILE)
            }
        } else if meters < 1000.0 {
            format!("{meters:.0} m")
        } else {
            format!("{:.2} km", meters / 1000.0)
        }
    }

    pub fn on_pointer_event(
        &mut self,
        ctx: &ToolContext<'_>,
        event: &PointerEvent,
    ) -> EventPropagation {
        match event {
            PointerEvent::Tap(position) => {
                if let Some(coordinate) = ctx.map.screen_to_geo(*position) {
                    self.points.push(coordinate);
                    ctx.messenger.request_redraw();
                }
                EventPropagation::Consume
            }
            _ => EventPropagation::Propagate,
        }
    }

    pub fn on_action(&mut self, ctx: &ToolContext<'_>, action: &ToolAction) -> Option<Transition> {
        if action == &ToolAction::Undo {
            self.points.pop();
            ctx.messenger.request_redraw();
            if self.points.is_empty() {
                return Some(Transition::Exit);
            }
        }
        None
    }

    pub fn overlay(&self, ctx: &ToolContext<'_>) -> Overlay {
        let mut overlay = Overlay::new();

        let projected: Vec<_> = self
            .points
            .iter()
            .filter_map(|p| ctx.map.geo_to_screen(p))
            .collect();

        if projected.len() > 1 {
            overlay.push(OverlayShape::Path {
                points: projected.clone(),
                line: paints::MEASURE_STROKE,
            });
        }
        for point in &projected {
            overlay.push(OverlayShape::Circle {
                center: *point,
                radius: 5.0,
                line: paints::MEASURE_STROKE,
                fill: None,
            });
        }
        if let Some(last) = projected.last() {
            overlay.push(OverlayShape::Label {
                position: *last,
                text: self.formatted_distance(ctx.preferences.imperial_units()),
            });
        }

        overlay
    }
}
