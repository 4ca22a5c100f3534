use serde::{Deserialize, Serialize};

/// 2d point on the surface of the Earth, in WGS84 latitude/longitude degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct GeoPoint2d {
    lat: f64,
    lon: f64,
}

impl GeoPoint2d {
    /// Creates a new point from latitude and longitude values (in degrees).
    pub fn latlon(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Latitude in radians.
    pub fn lat_rad(&self) -> f64 {
        self.lat.to_radians()
    }

    /// Longitude in radians.
    pub fn lon_rad(&self) -> f64 {
        self.lon.to_radians()
    }
}

impl From<GeoPoint2d> for geo_types::Coord<f64> {
    fn from(value: GeoPoint2d) -> Self {
        geo_types::Coord {
            x: value.lon,
            y: value.lat,
        }
    }
}

impl From<GeoPoint2d> for geo_types::Point<f64> {
    fn from(value: GeoPoint2d) -> Self {
        geo_types::Point::new(value.lon, value.lat)
    }
}

impl From<geo_types::Coord<f64>> for GeoPoint2d {
    fn from(value: geo_types::Coord<f64>) -> Self {
        Self {
            lat: value.y,
            lon: value.x,
        }
    }
}

impl From<geo_types::Point<f64>> for GeoPoint2d {
    fn from(value: geo_types::Point<f64>) -> Self {
        Self {
            lat: value.y(),
            lon: value.x(),
        }
    }
}

/// Creates a new [`GeoPoint2d`] from latitude and longitude values (in degrees).
///
/// ```
/// use geosketch_types::latlon;
///
/// let point = latlon!(45.0, 11.0);
/// assert_eq!(point.lat(), 45.0);
/// ```
#[macro_export]
macro_rules! latlon {
    ($lat:expr, $lon:expr) => {
        $crate::GeoPoint2d::latlon($lat, $lon)
    };
}
