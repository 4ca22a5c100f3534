//! Map display and preferences collaborator interfaces.

use geosketch_types::{GeoPoint2d, ScreenPoint};

/// View state of the map the editing overlay is drawn over.
///
/// The engine never renders tiles or projects coordinates itself; it asks the
/// host map view to translate between screen pixels and geographic
/// coordinates.
pub trait MapView: Send + Sync {
    /// Converts a screen pixel position into a geographic coordinate.
    ///
    /// Returns `None` if the position is outside the projected map area.
    fn screen_to_geo(&self, point: ScreenPoint) -> Option<GeoPoint2d>;

    /// Converts a geographic coordinate into a screen pixel position.
    fn geo_to_screen(&self, point: &GeoPoint2d) -> Option<ScreenPoint>;

    /// Current map center, if the view has one.
    fn center(&self) -> Option<GeoPoint2d>;
}

/// Read-only application preferences consumed by the editing engine.
pub trait Preferences: Send + Sync {
    /// Fallback map-center coordinate persisted by the application.
    fn map_center(&self) -> Option<GeoPoint2d>;

    /// Whether distances should be reported in imperial units.
    fn imperial_units(&self) -> bool {
        false
    }
}
