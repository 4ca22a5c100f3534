use nalgebra::Point2;

/// Point in screen pixel coordinates, measured from the top-left corner of the view.
pub type ScreenPoint = Point2<f64>;
