use thiserror::Error;

/// Error type for geometry conversions.
#[derive(Debug, Error)]
pub enum TypesError {
    /// The geometry variant has no representation in [`crate::Geom`].
    #[error("unsupported geometry type: {0}")]
    UnsupportedGeometry(&'static str),
    /// The geometry does not have enough points to be constructed.
    #[error("not enough points for a {0} geometry")]
    NotEnoughPoints(&'static str),
}
