//! Fixtures shared by the crate tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};

use async_trait::async_trait;
use geosketch_types::{Geom, GeoPoint2d, GeoRect, ScreenPoint};
use parking_lot::Mutex;

use crate::error::StoreError;
use crate::feature::{Feature, FeatureId};
use crate::geometry::wkb;
use crate::map::{MapView, Preferences};
use crate::messenger::{Feedback, Messenger};
use crate::store::{EditableLayer, SpatialStore, Srid};

/// Map view with a fixed linear projection: `scale` pixels per degree
/// around an origin placed at screen position (400, 300).
pub struct FixedMap {
    origin: GeoPoint2d,
    scale: f64,
}

impl FixedMap {
    /// Creates the map view centered at `origin`.
    pub fn new(origin: GeoPoint2d, scale: f64) -> Self {
        Self { origin, scale }
    }

    fn screen_center(&self) -> ScreenPoint {
        ScreenPoint::new(400.0, 300.0)
    }
}

impl MapView for FixedMap {
    fn screen_to_geo(&self, point: ScreenPoint) -> Option<GeoPoint2d> {
        let center = self.screen_center();
        Some(GeoPoint2d::latlon(
            self.origin.lat() - (point.y - center.y) / self.scale,
            self.origin.lon() + (point.x - center.x) / self.scale,
        ))
    }

    fn geo_to_screen(&self, point: &GeoPoint2d) -> Option<ScreenPoint> {
        let center = self.screen_center();
        Some(ScreenPoint::new(
            center.x + (point.lon() - self.origin.lon()) * self.scale,
            center.y - (point.lat() - self.origin.lat()) * self.scale,
        ))
    }

    fn center(&self) -> Option<GeoPoint2d> {
        Some(self.origin)
    }
}

/// Messenger counting redraw and refresh requests.
#[derive(Default)]
pub struct CountingMessenger {
    redraws: AtomicUsize,
    refreshes: AtomicUsize,
}

impl CountingMessenger {
    /// Number of redraw requests so far.
    pub fn redraws(&self) -> usize {
        self.redraws.load(Ordering::SeqCst)
    }

    /// Number of map refresh requests so far.
    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

impl Messenger for CountingMessenger {
    fn request_redraw(&self) {
        self.redraws.fetch_add(1, Ordering::SeqCst);
    }

    fn request_map_refresh(&self) {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Feedback surface recording every message.
#[derive(Default)]
pub struct RecordingFeedback {
    warnings: Mutex<Vec<String>>,
    toasts: Mutex<Vec<String>>,
}

impl RecordingFeedback {
    /// Warnings received so far.
    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().clone()
    }

    /// Toasts received so far.
    pub fn toasts(&self) -> Vec<String> {
        self.toasts.lock().clone()
    }
}

impl Feedback for RecordingFeedback {
    fn warning(&self, message: &str) {
        self.warnings.lock().push(message.to_string());
    }

    fn toast(&self, message: &str) {
        self.toasts.lock().push(message.to_string());
    }
}

/// Preferences with fixed values.
#[derive(Default)]
pub struct TestPreferences {
    /// Fallback map center.
    pub center: Option<GeoPoint2d>,
    /// Imperial units flag.
    pub imperial: bool,
}

impl Preferences for TestPreferences {
    fn map_center(&self) -> Option<GeoPoint2d> {
        self.center
    }

    fn imperial_units(&self) -> bool {
        self.imperial
    }
}

/// In-memory spatial store with failure injection knobs.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<BTreeMap<String, BTreeMap<i64, Geom>>>,
    next_id: AtomicI64,
    operations: Mutex<Vec<String>>,
    /// When set, every insert fails with a unique-constraint violation.
    pub conflict_on_insert: AtomicBool,
    /// When set, every query fails with a generic backend error.
    pub fail_queries: AtomicBool,
}

impl MemoryStore {
    /// Creates a store with the given features in `table`.
    pub fn with_features(table: &str, features: Vec<(i64, Geom)>) -> Self {
        let store = Self::default();
        let max_id = features.iter().map(|(id, _)| *id).max().unwrap_or(0);
        store.next_id.store(max_id + 1, Ordering::SeqCst);
        store
            .tables
            .lock()
            .insert(table.to_string(), features.into_iter().collect());
        store
    }

    /// Number of features currently stored in `table`.
    pub fn count(&self, table: &str) -> usize {
        self.tables
            .lock()
            .get(table)
            .map(|features| features.len())
            .unwrap_or(0)
    }

    /// The stored geometry of a feature.
    pub fn geometry_of(&self, table: &str, id: i64) -> Option<Geom> {
        self.tables.lock().get(table)?.get(&id).cloned()
    }

    /// The mutating operations performed so far, in order.
    pub fn operations(&self) -> Vec<String> {
        self.operations.lock().clone()
    }

    fn log(&self, operation: String) {
        self.operations.lock().push(operation);
    }
}

#[async_trait]
impl SpatialStore for MemoryStore {
    async fn query_bbox(
        &self,
        layer: &EditableLayer,
        bounds: GeoRect,
    ) -> Result<Vec<Feature>, StoreError> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("query failure injected".to_string()));
        }

        let tables = self.tables.lock();
        let mut result = vec![];
        if let Some(features) = tables.get(&layer.table) {
            for (id, geom) in features {
                let intersects = geom
                    .bounding_rect()
                    .map(|rect| rect.intersects(&bounds))
                    .unwrap_or(false);
                if intersects {
                    let bytes = wkb::to_wkb(geom)
                        .map_err(|e| StoreError::Backend(e.to_string()))?;
                    result.push(Feature::new(
                        layer.source.clone(),
                        layer.table.clone(),
                        FeatureId(*id),
                        bytes,
                    ));
                }
            }
        }
        Ok(result)
    }

    async fn insert(
        &self,
        layer: &EditableLayer,
        geometry: &Geom,
        _srid: Srid,
    ) -> Result<FeatureId, StoreError> {
        if self.conflict_on_insert.load(Ordering::SeqCst) {
            return Err(StoreError::UniqueConstraint);
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.tables
            .lock()
            .entry(layer.table.clone())
            .or_default()
            .insert(id, geometry.clone());
        self.log(format!("insert {} {id}", layer.table));
        Ok(FeatureId(id))
    }

    async fn update_geometry(
        &self,
        layer: &EditableLayer,
        id: FeatureId,
        geometry: &Geom,
        _srid: Srid,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.lock();
        let feature = tables
            .get_mut(&layer.table)
            .and_then(|features| features.get_mut(&id.0))
            .ok_or_else(|| StoreError::Backend(format!("no feature {id}")))?;
        *feature = geometry.clone();
        drop(tables);
        self.log(format!("update {} {id}", layer.table));
        Ok(())
    }

    async fn delete(&self, layer: &EditableLayer, ids: &[FeatureId]) -> Result<(), StoreError> {
        let mut tables = self.tables.lock();
        if let Some(features) = tables.get_mut(&layer.table) {
            for id in ids {
                features.remove(&id.0);
            }
        }
        drop(tables);
        self.log(format!(
            "delete {} {}",
            layer.table,
            ids.iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(",")
        ));
        Ok(())
    }

    async fn replace_and_delete(
        &self,
        layer: &EditableLayer,
        id: FeatureId,
        geometry: &Geom,
        _srid: Srid,
        remove: FeatureId,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.lock();
        let features = tables
            .get_mut(&layer.table)
            .ok_or_else(|| StoreError::Backend(format!("no table {}", layer.table)))?;
        let feature = features
            .get_mut(&id.0)
            .ok_or_else(|| StoreError::Backend(format!("no feature {id}")))?;
        *feature = geometry.clone();
        features.remove(&remove.0);
        drop(tables);
        self.log(format!("replace_and_delete {} {id} {remove}", layer.table));
        Ok(())
    }
}
