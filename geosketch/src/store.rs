//! Spatial store collaborator interface and the commit gateway contract.

use async_trait::async_trait;
use geosketch_types::{Geom, GeoRect, GeometryKind};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::feature::{Feature, FeatureId, SourceId};

/// Spatial reference system identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Srid(pub i32);

/// Geographic WGS84 reference system.
pub const SRID_WGS84: Srid = Srid(4326);

/// Descriptor of an editable vector layer.
#[derive(Debug, Clone, PartialEq)]
pub struct EditableLayer {
    /// Database the table lives in.
    pub source: SourceId,
    /// Table name.
    pub table: String,
    /// Declared geometry type of the layer.
    pub kind: GeometryKind,
    /// Reference system of the stored geometries.
    pub srid: Srid,
}

impl EditableLayer {
    /// Creates a layer descriptor with the WGS84 reference system.
    pub fn new(source: SourceId, table: impl Into<String>, kind: GeometryKind) -> Self {
        Self {
            source,
            table: table.into(),
            kind,
            srid: SRID_WGS84,
        }
    }
}

/// Access to the spatial database the features are persisted in.
///
/// All operations may run on a background task; implementations must be
/// thread safe. Writes happen only from the explicit user commit action -
/// the engine never calls a mutating operation implicitly.
#[async_trait]
pub trait SpatialStore: Send + Sync {
    /// Returns all features of the layer whose geometry intersects the
    /// bounding box.
    async fn query_bbox(
        &self,
        layer: &EditableLayer,
        bounds: GeoRect,
    ) -> Result<Vec<Feature>, StoreError>;

    /// Inserts a new feature with the given geometry, returning its id.
    ///
    /// Fails with [`StoreError::UniqueConstraint`] if the store rejects the
    /// row because of a duplicate key.
    async fn insert(
        &self,
        layer: &EditableLayer,
        geometry: &Geom,
        srid: Srid,
    ) -> Result<FeatureId, StoreError>;

    /// Replaces the geometry of an existing feature.
    async fn update_geometry(
        &self,
        layer: &EditableLayer,
        id: FeatureId,
        geometry: &Geom,
        srid: Srid,
    ) -> Result<(), StoreError>;

    /// Deletes the features with the given ids.
    async fn delete(&self, layer: &EditableLayer, ids: &[FeatureId]) -> Result<(), StoreError>;

    /// Replaces the geometry of `id` and deletes `remove` in one transaction.
    ///
    /// Used by the cut/extend commit: the surviving feature takes the
    /// computed geometry and the consumed feature is removed. Implementations
    /// must apply both changes atomically - a partial result must never
    /// become visible.
    async fn replace_and_delete(
        &self,
        layer: &EditableLayer,
        id: FeatureId,
        geometry: &Geom,
        srid: Srid,
        remove: FeatureId,
    ) -> Result<(), StoreError>;
}
