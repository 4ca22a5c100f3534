//! Coordinate and geometry primitives shared by the geosketch editing engine.

mod error;
pub use error::TypesError;

mod point;
pub use point::GeoPoint2d;

mod screen;
pub use screen::ScreenPoint;

mod rect;
pub use rect::{GeoRect, Rect};

mod geometry;
pub use geometry::{Geom, GeometryKind};
