use num_traits::Num;
use serde::{Deserialize, Serialize};

use crate::GeoPoint2d;

/// Axis-aligned rectangle, used for screen-space boxes.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rect<N = f64> {
    /// Left edge.
    pub x_min: N,
    /// Top edge (screen space grows downwards).
    pub y_min: N,
    /// Right edge.
    pub x_max: N,
    /// Bottom edge.
    pub y_max: N,
}

impl<N: Num + Copy + PartialOrd> Rect<N> {
    /// Creates a new rectangle.
    pub fn new(x_min: N, y_min: N, x_max: N, y_max: N) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Creates a rectangle from two arbitrary corner points, normalizing min/max.
    pub fn from_corners(a: (N, N), b: (N, N)) -> Self {
        let (x_min, x_max) = if a.0 < b.0 { (a.0, b.0) } else { (b.0, a.0) };
        let (y_min, y_max) = if a.1 < b.1 { (a.1, b.1) } else { (b.1, a.1) };
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Width of the rectangle.
    pub fn width(&self) -> N {
        self.x_max - self.x_min
    }

    /// Height of the rectangle.
    pub fn height(&self) -> N {
        self.y_max - self.y_min
    }

    /// Returns true if the point lies inside or on the boundary.
    pub fn contains(&self, x: N, y: N) -> bool {
        self.x_min <= x && self.x_max >= x && self.y_min <= y && self.y_max >= y
    }

    /// Smallest rectangle containing both `self` and `other`.
    pub fn merge(&self, other: Self) -> Self {
        Self {
            x_min: if self.x_min < other.x_min {
                self.x_min
            } else {
                other.x_min
            },
            y_min: if self.y_min < other.y_min {
                self.y_min
            } else {
                other.y_min
            },
            x_max: if self.x_max > other.x_max {
                self.x_max
            } else {
                other.x_max
            },
            y_max: if self.y_max > other.y_max {
                self.y_max
            } else {
                other.y_max
            },
        }
    }
}

/// Geographic bounding box in WGS84 degrees.
///
/// Unlike [`Rect`] the edges are named by compass direction, matching the way
/// spatial stores express bounding-box queries.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoRect {
    /// Northern edge latitude.
    pub north: f64,
    /// Southern edge latitude.
    pub south: f64,
    /// Eastern edge longitude.
    pub east: f64,
    /// Western edge longitude.
    pub west: f64,
}

impl GeoRect {
    /// Creates a bounding box from two arbitrary corner points.
    pub fn from_corners(a: GeoPoint2d, b: GeoPoint2d) -> Self {
        Self {
            north: a.lat().max(b.lat()),
            south: a.lat().min(b.lat()),
            east: a.lon().max(b.lon()),
            west: a.lon().min(b.lon()),
        }
    }

    /// Bounding box of a single point (zero width and height).
    pub fn from_point(point: GeoPoint2d) -> Self {
        Self::from_corners(point, point)
    }

    /// Latitude span in degrees.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Longitude span in degrees.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Returns true if either dimension is collapsed.
    pub fn is_degenerate(&self) -> bool {
        self.width() == 0.0 || self.height() == 0.0
    }

    /// Grows every edge outwards by `amount` degrees.
    pub fn expand(&self, amount: f64) -> Self {
        Self {
            north: self.north + amount,
            south: self.south - amount,
            east: self.east + amount,
            west: self.west - amount,
        }
    }

    /// Expands a collapsed dimension by `epsilon` so the box forms a valid
    /// query envelope. Non-degenerate boxes are returned unchanged.
    pub fn expand_degenerate(&self, epsilon: f64) -> Self {
        let mut result = *self;
        if result.width() == 0.0 {
            result.east += epsilon;
            result.west -= epsilon;
        }
        if result.height() == 0.0 {
            result.north += epsilon;
            result.south -= epsilon;
        }
        result
    }

    /// Returns true if the point lies inside or on the boundary.
    pub fn contains(&self, point: GeoPoint2d) -> bool {
        point.lat() <= self.north
            && point.lat() >= self.south
            && point.lon() <= self.east
            && point.lon() >= self.west
    }

    /// Returns true if the two boxes intersect.
    pub fn intersects(&self, other: &GeoRect) -> bool {
        self.west <= other.east
            && self.east >= other.west
            && self.south <= other.north
            && self.north >= other.south
    }

    /// Smallest box containing both `self` and `other`.
    pub fn merge(&self, other: &GeoRect) -> Self {
        Self {
            north: self.north.max(other.north),
            south: self.south.min(other.south),
            east: self.east.max(other.east),
            west: self.west.min(other.west),
        }
    }
}
