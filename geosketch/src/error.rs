//! Error types used by the crate.

use thiserror::Error;

/// Failure reported by the spatial store collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store rejected a write because of a duplicate key.
    #[error("unique constraint violated")]
    UniqueConstraint,
    /// Any other query or persistence failure - details are inside.
    #[error("spatial store failure: {0}")]
    Backend(String),
}

impl StoreError {
    /// Returns true for the duplicate-key failure.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::UniqueConstraint)
    }
}

/// Editing error type.
#[derive(Debug, Error)]
pub enum EditError {
    /// A GPS vertex was requested before any GPS coordinate was received.
    #[error("no GPS coordinate acquired yet")]
    NoGpsFix,
    /// A cut/extend end point did not resolve to a feature.
    #[error("no geometry under the {0} point")]
    NothingTouched(&'static str),
    /// The geometry cannot be stored in the target layer.
    #[error("the geometry is not compatible with the target layer")]
    IncompatibleGeometry,
    /// Error encoding or decoding stored geometry bytes.
    #[error("failed to read or write geometry: {0}")]
    Wkb(String),
    /// A geometry operation could not be applied.
    #[error("geometry operation failed: {0}")]
    Geometry(String),
    /// The session is missing a required collaborator or an active layer.
    #[error("editing session is not configured: {0}")]
    Configuration(&'static str),
    /// No editable layer is active.
    #[error("no editable layer is active")]
    NoEditableLayer,
    /// Error reported by the spatial store.
    #[error(transparent)]
    Store(#[from] StoreError),
}
