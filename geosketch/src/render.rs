//! Overlay primitives the editing tools hand to the host renderer.
//!
//! The engine does not draw anything itself. Every frame the active tool
//! group derives an [`Overlay`] - a list of styled screen-space shapes - as a
//! pure function of its current state, and the host renders it on top of the
//! map with whatever backend it uses. Style descriptors are immutable values
//! owned by the shapes.

use geosketch_types::{Geom, GeoPoint2d, Rect, ScreenPoint};
use serde::{Deserialize, Serialize};

use crate::map::MapView;

/// Color representation.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

impl Color {
    /// Black color: `#000000FF`
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    /// Red color: `#FF0000FF`
    pub const RED: Color = Color::rgba(255, 0, 0, 255);
    /// Gray color: `#AAAAAAFF`
    pub const GRAY: Color = Color::rgba(170, 170, 170, 255);
    /// Dark gray color: `#555555FF`
    pub const DARK_GRAY: Color = Color::rgba(85, 85, 85, 255);

    /// Constructs color from its RGBA channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// The same color with a different alpha channel value.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self {
            r: self.r,
            g: self.g,
            b: self.b,
            a,
        }
    }

    /// Converts the color into u8 array (RGBA).
    pub fn to_u8_array(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Stroke style of an overlay shape.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinePaint {
    /// Stroke color.
    pub color: Color,
    /// Stroke width in pixels.
    pub width: f32,
}

impl LinePaint {
    /// Creates a stroke style.
    pub const fn new(color: Color, width: f32) -> Self {
        Self { color, width }
    }
}

/// Fill style of an overlay shape.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillPaint {
    /// Fill color.
    pub color: Color,
}

impl FillPaint {
    /// Creates a fill style.
    pub const fn new(color: Color) -> Self {
        Self { color }
    }
}

/// A single styled shape in screen-pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayShape {
    /// Filled and/or stroked circle marker.
    Circle {
        /// Center position.
        center: ScreenPoint,
        /// Radius in pixels.
        radius: f32,
        /// Stroke style.
        line: LinePaint,
        /// Optional fill.
        fill: Option<FillPaint>,
    },
    /// Open polyline.
    Path {
        /// Path points.
        points: Vec<ScreenPoint>,
        /// Stroke style.
        line: LinePaint,
    },
    /// Closed polygon with optional fill. The first ring is the exterior.
    Polygon {
        /// Polygon rings.
        rings: Vec<Vec<ScreenPoint>>,
        /// Stroke style.
        line: LinePaint,
        /// Optional fill.
        fill: Option<FillPaint>,
    },
    /// Axis-aligned rectangle.
    Rect {
        /// Rectangle bounds.
        rect: Rect<f64>,
        /// Stroke style.
        line: LinePaint,
        /// Optional fill.
        fill: Option<FillPaint>,
    },
    /// Short text readout anchored at a screen position.
    Label {
        /// Anchor position.
        position: ScreenPoint,
        /// Text to display.
        text: String,
    },
}

/// The full overlay a tool group produces for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    shapes: Vec<OverlayShape>,
}

impl Overlay {
    /// Creates an empty overlay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a shape, drawn above the previously added ones.
    pub fn push(&mut self, shape: OverlayShape) {
        self.shapes.push(shape);
    }

    /// The shapes in draw order.
    pub fn shapes(&self) -> &[OverlayShape] {
        &self.shapes
    }

    /// Returns true if there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

/// Default paints of the editing overlay.
pub(crate) mod paints {
    use super::{Color, FillPaint, LinePaint};

    const SELECTION: Color = Color::rgba(255, 128, 0, 255);

    pub const CREATED_HALO: LinePaint = LinePaint::new(Color::BLACK, 7.0);
    pub const CREATED_STROKE: LinePaint = LinePaint::new(SELECTION, 5.0);
    pub const CREATED_FILL: FillPaint = FillPaint::new(SELECTION.with_alpha(180));

    pub const SELECT_RECT_STROKE: LinePaint = LinePaint::new(SELECTION, 1.5);
    pub const SELECT_RECT_FILL: FillPaint = FillPaint::new(SELECTION.with_alpha(80));

    pub const GESTURE_STROKE: LinePaint = LinePaint::new(Color::RED, 5.0);
    pub const GESTURE_FILL: FillPaint = FillPaint::new(Color::RED);

    pub const PREVIEW_STROKE: LinePaint = LinePaint::new(Color::DARK_GRAY, 5.0);
    pub const PREVIEW_FILL: FillPaint = FillPaint::new(Color::GRAY.with_alpha(180));

    pub const MEASURE_STROKE: LinePaint = LinePaint::new(Color::rgba(0, 100, 255, 255), 3.0);
}

/// Projects a geometry through the map view into overlay shapes.
///
/// Vertices that fall outside the projected area are skipped, matching the
/// behavior of drawing against a moving map: a partially visible geometry is
/// still drawn where it can be.
pub(crate) fn geometry_shapes(
    geom: &Geom,
    map: &dyn MapView,
    line: LinePaint,
    fill: Option<FillPaint>,
) -> Vec<OverlayShape> {
    let mut shapes = vec![];

    let project_ring = |coords: &[geo_types::Coord<f64>]| -> Vec<ScreenPoint> {
        coords
            .iter()
            .filter_map(|c| map.geo_to_screen(&GeoPoint2d::latlon(c.y, c.x)))
            .collect()
    };

    match geom {
        Geom::Point(point) => {
            if let Some(center) = map.geo_to_screen(&GeoPoint2d::latlon(point.y(), point.x())) {
                shapes.push(OverlayShape::Circle {
                    center,
                    radius: 10.0,
                    line,
                    fill,
                });
            }
        }
        Geom::MultiPoint(points) => {
            for point in &points.0 {
                if let Some(center) = map.geo_to_screen(&GeoPoint2d::latlon(point.y(), point.x())) {
                    shapes.push(OverlayShape::Circle {
                        center,
                        radius: 10.0,
                        line,
                        fill,
                    });
                }
            }
        }
        Geom::Line(linestring) => {
            shapes.push(OverlayShape::Path {
                points: project_ring(&linestring.0),
                line,
            });
        }
        Geom::MultiLine(lines) => {
            for linestring in &lines.0 {
                shapes.push(OverlayShape::Path {
                    points: project_ring(&linestring.0),
                    line,
                });
            }
        }
        Geom::Polygon(polygon) => {
            let mut rings = vec![project_ring(&polygon.exterior().0)];
            rings.extend(polygon.interiors().iter().map(|r| project_ring(&r.0)));
            shapes.push(OverlayShape::Polygon { rings, line, fill });
        }
        Geom::MultiPolygon(polygons) => {
            for polygon in &polygons.0 {
                let mut rings = vec![project_ring(&polygon.exterior().0)];
                rings.extend(polygon.interiors().iter().map(|r| project_ring(&r.0)));
                shapes.push(OverlayShape::Polygon { rings, line, fill });
            }
        }
    }

    shapes
}
