//! The editing session: ownership of the active layer and tool group.

use std::sync::Arc;

use geosketch_types::{GeoPoint2d, GeometryKind};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::control::{EventPropagation, EventProcessor, RawPointerEvent};
use crate::error::EditError;
use crate::feature::Feature;
use crate::map::{MapView, Preferences};
use crate::messenger::{Feedback, LogFeedback, Messenger};
use crate::render::Overlay;
use crate::store::{EditableLayer, SpatialStore};
use crate::tasks::TaskSlot;
use crate::tools::{
    CreateFeatureToolGroup, EditorState, MeasureTool, OnSelectionToolGroup, SelectionTool,
    TaskOutcome, ToolAction, ToolContext, ToolGroup, Transition,
};

/// Tunable editing behavior parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditOptions {
    /// Pixel radius used to resolve taps and gesture end points to features.
    pub selection_tolerance_px: f64,
    /// Degrees added to a collapsed bounding-box dimension so the box forms
    /// a valid query envelope.
    pub degenerate_bbox_eps: f64,
}

impl Default for EditOptions {
    fn default() -> Self {
        Self {
            selection_tolerance_px: 20.0,
            degenerate_bbox_eps: 1e-5,
        }
    }
}

/// Default [`Preferences`] used when the host supplies none.
struct NoPreferences;

impl Preferences for NoPreferences {
    fn map_center(&self) -> Option<GeoPoint2d> {
        None
    }
}

/// Builder for [`EditSession`].
///
/// The map view, spatial store and messenger are required; feedback and
/// preferences have no-op defaults.
#[derive(Default)]
pub struct EditSessionBuilder {
    map: Option<Arc<dyn MapView>>,
    store: Option<Arc<dyn SpatialStore>>,
    messenger: Option<Arc<dyn Messenger>>,
    feedback: Option<Arc<dyn Feedback>>,
    preferences: Option<Arc<dyn Preferences>>,
    options: EditOptions,
}

impl EditSessionBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the map view collaborator.
    pub fn with_map(mut self, map: Arc<dyn MapView>) -> Self {
        self.map = Some(map);
        self
    }

    /// Sets the spatial store collaborator.
    pub fn with_store(mut self, store: Arc<dyn SpatialStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the messenger collaborator.
    pub fn with_messenger(mut self, messenger: Arc<dyn Messenger>) -> Self {
        self.messenger = Some(messenger);
        self
    }

    /// Sets the user feedback collaborator.
    pub fn with_feedback(mut self, feedback: Arc<dyn Feedback>) -> Self {
        self.feedback = Some(feedback);
        self
    }

    /// Sets the preferences collaborator.
    pub fn with_preferences(mut self, preferences: Arc<dyn Preferences>) -> Self {
        self.preferences = Some(preferences);
        self
    }

    /// Overrides the editing options.
    pub fn with_options(mut self, options: EditOptions) -> Self {
        self.options = options;
        self
    }

    /// Builds the session.
    pub fn build(self) -> Result<EditSession, EditError> {
        Ok(EditSession {
            map: self.map.ok_or(EditError::Configuration("map view"))?,
            store: self.store.ok_or(EditError::Configuration("spatial store"))?,
            messenger: self
                .messenger
                .ok_or(EditError::Configuration("messenger"))?,
            feedback: self.feedback.unwrap_or_else(|| Arc::new(LogFeedback)),
            preferences: self.preferences.unwrap_or_else(|| Arc::new(NoPreferences)),
            options: self.options,
            layer: None,
            tool_group: None,
            gps_fix: RwLock::new(None),
            event_processor: EventProcessor::new(),
            tasks: TaskSlot::new(),
        })
    }
}

macro_rules! tool_ctx {
    ($self:ident, $layer:expr) => {
        ToolContext {
            map: $self.map.as_ref(),
            store: &$self.store,
            layer: $layer,
            messenger: &$self.messenger,
            feedback: &$self.feedback,
            preferences: &$self.preferences,
            tasks: &$self.tasks,
            options: &$self.options,
            gps_fix: *$self.gps_fix.read(),
        }
    };
}

/// An interactive editing session over one editable layer.
///
/// The session is the explicit context object all tools work through: it
/// owns the active layer, the active tool group, the last known GPS
/// coordinate and the single background task slot, and borrows the host
/// collaborators to the tools call by call.
///
/// All methods must be called from the host's interaction thread; the
/// session itself dispatches long-running work to the async runtime and
/// must therefore live inside a tokio runtime context.
pub struct EditSession {
    map: Arc<dyn MapView>,
    store: Arc<dyn SpatialStore>,
    messenger: Arc<dyn Messenger>,
    feedback: Arc<dyn Feedback>,
    preferences: Arc<dyn Preferences>,
    options: EditOptions,
    layer: Option<EditableLayer>,
    tool_group: Option<ToolGroup>,
    gps_fix: RwLock<Option<GeoPoint2d>>,
    event_processor: EventProcessor,
    tasks: TaskSlot<TaskOutcome>,
}

impl EditSession {
    /// Starts building a session.
    pub fn builder() -> EditSessionBuilder {
        EditSessionBuilder::new()
    }

    /// Replaces the active editable layer.
    ///
    /// Any active tool group is disabled and its pending background work is
    /// cancelled.
    pub fn set_editable_layer(&mut self, layer: Option<EditableLayer>) {
        self.drop_tool_group();
        self.layer = layer;
        self.messenger.request_redraw();
    }

    /// The active editable layer.
    pub fn editable_layer(&self) -> Option<&EditableLayer> {
        self.layer.as_ref()
    }

    /// Enters selection mode.
    pub fn start_selection(&mut self) -> Result<(), EditError> {
        self.require_layer()?;
        self.replace_group(ToolGroup::Select(SelectionTool::new()));
        Ok(())
    }

    /// Enters creation mode for the active layer's geometry kind.
    pub fn start_create(&mut self) -> Result<(), EditError> {
        let kind = self.require_layer()?.kind;
        self.replace_group(ToolGroup::Create(CreateFeatureToolGroup::new(kind)));
        Ok(())
    }

    /// Enters creation mode seeded with an existing line feature; committing
    /// updates that feature instead of inserting a new one.
    pub fn start_create_continuing(&mut self, feature: Feature) -> Result<(), EditError> {
        if self.require_layer()?.kind != GeometryKind::Line {
            return Err(EditError::IncompatibleGeometry);
        }
        let group = CreateFeatureToolGroup::continuing(feature)?;
        self.replace_group(ToolGroup::Create(group));
        Ok(())
    }

    /// Enters distance measuring mode.
    pub fn start_measure(&mut self) -> Result<(), EditError> {
        self.require_layer()?;
        self.replace_group(ToolGroup::Measure(MeasureTool::new()));
        Ok(())
    }

    /// Leaves the current editing mode, discarding staged work.
    pub fn stop_editing(&mut self) {
        self.drop_tool_group();
        self.messenger.request_redraw();
    }

    /// Starts the cut gesture on the current selection.
    pub fn begin_cut(&mut self) {
        self.action(ToolAction::BeginCut);
    }

    /// Starts the extend gesture on the current selection.
    pub fn begin_extend(&mut self) {
        self.action(ToolAction::BeginExtend);
    }

    /// Routes a palette action to the active tool group.
    pub fn action(&mut self, action: ToolAction) {
        let (Some(layer), Some(group)) = (&self.layer, &mut self.tool_group) else {
            log::debug!("action {action:?} ignored: no active tool group");
            return;
        };
        let ctx = tool_ctx!(self, layer);
        let transition = group.on_action(&ctx, &action);
        if let Some(transition) = transition {
            self.apply_transition(transition);
        }
    }

    /// Feeds a raw pointer event through the event processor into the
    /// active tool group.
    ///
    /// Returns whether the host should still apply its own handling (map
    /// pan/zoom) for this event.
    pub fn handle_event(&mut self, raw: RawPointerEvent) -> EventPropagation {
        let events = self.event_processor.process(raw);
        let mut propagation = EventPropagation::Propagate;
        for event in events {
            let (Some(layer), Some(group)) = (&self.layer, &mut self.tool_group) else {
                break;
            };
            let ctx = tool_ctx!(self, layer);
            let (event_propagation, transition) = group.on_pointer_event(&ctx, &event);
            if event_propagation == EventPropagation::Consume {
                propagation = EventPropagation::Consume;
            }
            if let Some(transition) = transition {
                self.apply_transition(transition);
            }
        }
        propagation
    }

    /// Records a GPS position update and forwards it to the active tool.
    pub fn on_gps_update(&mut self, position: GeoPoint2d) {
        *self.gps_fix.write() = Some(position);
        let (Some(layer), Some(group)) = (&self.layer, &mut self.tool_group) else {
            return;
        };
        let ctx = tool_ctx!(self, layer);
        group.on_gps_update(&ctx, position);
    }

    /// Last known GPS coordinate, if any update was received.
    pub fn last_gps_fix(&self) -> Option<GeoPoint2d> {
        *self.gps_fix.read()
    }

    /// Drains the completed background operation, if any, and applies its
    /// effect to the state machine.
    ///
    /// Must be called from the interaction thread, typically once per frame
    /// after a redraw was requested.
    pub fn poll(&mut self) {
        let Some(outcome) = self.tasks.take_ready() else {
            return;
        };
        let (Some(layer), Some(group)) = (&self.layer, &mut self.tool_group) else {
            return;
        };
        let ctx = tool_ctx!(self, layer);
        let transition = group.on_task_outcome(&ctx, outcome);
        if let Some(transition) = transition {
            self.apply_transition(transition);
        }
    }

    /// The observable state of the editing state machine.
    pub fn state(&self) -> EditorState {
        self.tool_group
            .as_ref()
            .map(|group| group.state())
            .unwrap_or(EditorState::Idle)
    }

    /// Whether the commit action applies to the staged work right now.
    pub fn commit_ready(&self) -> bool {
        self.tool_group
            .as_ref()
            .map(|group| group.commit_ready())
            .unwrap_or(false)
    }

    /// The currently selected features, empty outside of selection states.
    pub fn selection(&self) -> &[Feature] {
        self.tool_group
            .as_ref()
            .map(|group| group.selection())
            .unwrap_or(&[])
    }

    /// Whether a background query or commit is in flight.
    pub fn is_busy(&self) -> bool {
        self.tasks.is_pending()
    }

    /// Derives the editing overlay for the current frame.
    pub fn overlay(&self) -> Overlay {
        match (&self.layer, &self.tool_group) {
            (Some(layer), Some(group)) => {
                let ctx = tool_ctx!(self, layer);
                group.overlay(&ctx)
            }
            _ => Overlay::new(),
        }
    }

    fn require_layer(&self) -> Result<&EditableLayer, EditError> {
        self.layer.as_ref().ok_or(EditError::NoEditableLayer)
    }

    fn replace_group(&mut self, group: ToolGroup) {
        self.drop_tool_group();
        self.tool_group = Some(group);
        self.messenger.request_redraw();
    }

    fn drop_tool_group(&mut self) {
        if let Some(mut group) = self.tool_group.take() {
            group.disable();
        }
        self.tasks.cancel();
    }

    fn apply_transition(&mut self, transition: Transition) {
        match transition {
            Transition::Exit => {
                self.drop_tool_group();
            }
            Transition::ToSelection(features) => {
                self.tool_group = Some(ToolGroup::OnSelection(OnSelectionToolGroup::new(
                    features,
                )));
            }
        }
        self.messenger.request_redraw();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::feature::{FeatureId, SourceId};
    use crate::geometry::wkb;
    use crate::tests::{CountingMessenger, FixedMap, MemoryStore, RecordingFeedback};
    use geosketch_types::{latlon, Geom, ScreenPoint};
    use geo_types::{Coord, LineString, Polygon};

    struct Harness {
        session: EditSession,
        store: Arc<MemoryStore>,
        messenger: Arc<CountingMessenger>,
        feedback: Arc<RecordingFeedback>,
    }

    /// Session over a `FixedMap` with 100 px per degree centered at
    /// (45N, 11E) on screen position (400, 300).
    fn harness(store: MemoryStore, kind: GeometryKind, table: &str) -> Harness {
        let store = Arc::new(store);
        let messenger = Arc::new(CountingMessenger::default());
        let feedback = Arc::new(RecordingFeedback::default());
        let mut session = EditSession::builder()
            .with_map(Arc::new(FixedMap::new(latlon!(45.0, 11.0), 100.0)))
            .with_store(store.clone())
            .with_messenger(messenger.clone())
            .with_feedback(feedback.clone())
            .build()
            .expect("all collaborators provided");
        session.set_editable_layer(Some(EditableLayer::new(
            SourceId::from("test.sqlite"),
            table,
            kind,
        )));
        Harness {
            session,
            store,
            messenger,
            feedback,
        }
    }

    async fn settle(session: &mut EditSession) {
        for _ in 0..64 {
            tokio::task::yield_now().await;
            session.poll();
        }
    }

    fn tap(session: &mut EditSession, x: f64, y: f64) {
        session.handle_event(RawPointerEvent::PointerDown(ScreenPoint::new(x, y)));
        session.handle_event(RawPointerEvent::PointerUp(ScreenPoint::new(x, y)));
    }

    fn drag(session: &mut EditSession, from: (f64, f64), to: (f64, f64)) {
        session.handle_event(RawPointerEvent::PointerDown(ScreenPoint::new(
            from.0, from.1,
        )));
        session.handle_event(RawPointerEvent::PointerMoved(ScreenPoint::new(to.0, to.1)));
        session.handle_event(RawPointerEvent::PointerUp(ScreenPoint::new(to.0, to.1)));
    }

    fn point(lon: f64, lat: f64) -> Geom {
        Geom::Point(geo_types::Point::new(lon, lat))
    }

    fn square(lon_min: f64, lat_min: f64, size: f64) -> Geom {
        Geom::Polygon(Polygon::new(
            LineString(vec![
                Coord {
                    x: lon_min,
                    y: lat_min,
                },
                Coord {
                    x: lon_min + size,
                    y: lat_min,
                },
                Coord {
                    x: lon_min + size,
                    y: lat_min + size,
                },
                Coord {
                    x: lon_min,
                    y: lat_min + size,
                },
                Coord {
                    x: lon_min,
                    y: lat_min,
                },
            ]),
            vec![],
        ))
    }

    #[test]
    fn session_requires_its_collaborators() {
        let result = EditSession::builder()
            .with_map(Arc::new(FixedMap::new(latlon!(45.0, 11.0), 100.0)))
            .build();
        assert!(matches!(result, Err(EditError::Configuration(_))));
    }

    #[tokio::test]
    async fn create_line_commit_visibility_and_undo_to_idle() {
        let mut h = harness(MemoryStore::default(), GeometryKind::Line, "tracks");
        h.session.start_create().expect("layer is set");
        h.session.action(ToolAction::ToggleTapToAdd);

        // (10.0, 45.0), (10.1, 45.1), (10.2, 45.0) in screen space
        tap(&mut h.session, 300.0, 300.0);
        assert!(!h.session.commit_ready());
        tap(&mut h.session, 310.0, 290.0);
        assert!(h.session.commit_ready());
        tap(&mut h.session, 320.0, 300.0);
        assert!(h.session.commit_ready());

        h.session.action(ToolAction::Undo);
        assert_eq!(h.session.state(), EditorState::Creating);
        h.session.action(ToolAction::Undo);
        assert_eq!(h.session.state(), EditorState::Creating);
        assert!(!h.session.commit_ready());
        h.session.action(ToolAction::Undo);
        assert_eq!(h.session.state(), EditorState::Idle);
    }

    #[tokio::test]
    async fn committed_line_is_persisted_and_session_returns_to_idle() {
        let mut h = harness(MemoryStore::default(), GeometryKind::Line, "tracks");
        h.session.start_create().expect("layer is set");
        h.session.action(ToolAction::ToggleTapToAdd);
        tap(&mut h.session, 300.0, 300.0);
        tap(&mut h.session, 310.0, 290.0);

        h.session.action(ToolAction::Commit);
        assert!(h.session.is_busy());
        settle(&mut h.session).await;

        assert_eq!(h.store.count("tracks"), 1);
        assert_eq!(h.session.state(), EditorState::Idle);
        assert!(h.feedback.toasts().iter().any(|t| t == "geometry saved"));
        assert_eq!(h.messenger.refreshes(), 1);
    }

    #[tokio::test]
    async fn insert_conflict_discards_candidate_and_warns() {
        let store = MemoryStore::default();
        store.conflict_on_insert.store(true, Ordering::SeqCst);
        let mut h = harness(store, GeometryKind::Line, "tracks");

        h.session.start_create().expect("layer is set");
        h.session.action(ToolAction::ToggleTapToAdd);
        tap(&mut h.session, 300.0, 300.0);
        tap(&mut h.session, 310.0, 290.0);
        h.session.action(ToolAction::Commit);
        settle(&mut h.session).await;

        assert_eq!(h.store.count("tracks"), 0);
        assert_eq!(h.session.state(), EditorState::Idle);
        assert!(!h.feedback.warnings().is_empty());
    }

    #[tokio::test]
    async fn drag_selection_over_features_transitions_to_selected() {
        let store = MemoryStore::with_features(
            "poi",
            vec![
                (1, point(10.95, 45.0)),
                (2, point(11.0, 45.0)),
                (3, point(11.05, 45.0)),
            ],
        );
        let mut h = harness(store, GeometryKind::Point, "poi");

        h.session.start_selection().expect("layer is set");
        drag(&mut h.session, (380.0, 280.0), (420.0, 320.0));
        settle(&mut h.session).await;

        assert_eq!(h.session.state(), EditorState::Selected);
        assert_eq!(h.session.selection().len(), 3);
    }

    #[tokio::test]
    async fn drag_selection_over_nothing_leaves_state_unchanged() {
        let store = MemoryStore::with_features("poi", vec![(1, point(11.0, 45.0))]);
        let mut h = harness(store, GeometryKind::Point, "poi");

        h.session.start_selection().expect("layer is set");
        drag(&mut h.session, (100.0, 100.0), (140.0, 140.0));
        settle(&mut h.session).await;

        assert_eq!(h.session.state(), EditorState::Idle);
        assert!(h.session.selection().is_empty());
        assert!(h.feedback.warnings().is_empty());
    }

    #[tokio::test]
    async fn zero_height_drag_still_selects_via_expansion() {
        let store = MemoryStore::with_features("poi", vec![(1, point(11.0, 45.0))]);
        let mut h = harness(store, GeometryKind::Point, "poi");

        h.session.start_selection().expect("layer is set");
        drag(&mut h.session, (380.0, 300.0), (420.0, 300.0));
        settle(&mut h.session).await;

        assert_eq!(h.session.state(), EditorState::Selected);
        assert_eq!(h.session.selection().len(), 1);
    }

    #[tokio::test]
    async fn failed_query_warns_and_deactivates_the_tool() {
        let store = MemoryStore::default();
        store.fail_queries.store(true, Ordering::SeqCst);
        let mut h = harness(store, GeometryKind::Point, "poi");

        h.session.start_selection().expect("layer is set");
        drag(&mut h.session, (380.0, 280.0), (420.0, 320.0));
        settle(&mut h.session).await;

        assert_eq!(h.session.state(), EditorState::Idle);
        assert!(!h.feedback.warnings().is_empty());
    }

    #[tokio::test]
    async fn cancelled_query_changes_nothing_silently() {
        let store = MemoryStore::with_features("poi", vec![(1, point(11.0, 45.0))]);
        let mut h = harness(store, GeometryKind::Point, "poi");

        h.session.start_selection().expect("layer is set");
        drag(&mut h.session, (380.0, 280.0), (420.0, 320.0));
        h.session.stop_editing();
        settle(&mut h.session).await;

        assert_eq!(h.session.state(), EditorState::Idle);
        assert!(h.session.selection().is_empty());
        assert!(h.feedback.warnings().is_empty());
        assert!(h.feedback.toasts().is_empty());
    }

    #[tokio::test]
    async fn tap_on_point_layer_selects_the_nearest_feature() {
        let store = MemoryStore::with_features(
            "poi",
            vec![(1, point(10.95, 45.0)), (2, point(11.05, 45.0))],
        );
        let mut h = harness(store, GeometryKind::Point, "poi");

        h.session.start_selection().expect("layer is set");
        tap(&mut h.session, 398.0, 300.0);
        settle(&mut h.session).await;

        assert_eq!(h.session.state(), EditorState::Selected);
        assert_eq!(h.session.selection().len(), 1);
        assert_eq!(h.session.selection()[0].id(), FeatureId(1));
    }

    #[tokio::test]
    async fn delete_preview_and_commit_remove_the_selection() {
        let store = MemoryStore::with_features(
            "poi",
            vec![(1, point(10.95, 45.0)), (2, point(11.05, 45.0))],
        );
        let mut h = harness(store, GeometryKind::Point, "poi");

        h.session.start_selection().expect("layer is set");
        drag(&mut h.session, (380.0, 280.0), (420.0, 320.0));
        settle(&mut h.session).await;
        assert_eq!(h.session.state(), EditorState::Selected);

        h.session.action(ToolAction::DeleteSelected);
        assert_eq!(h.session.state(), EditorState::PreviewingDelete);
        assert!(h.session.commit_ready());

        // undo leaves the selection intact
        h.session.action(ToolAction::Undo);
        assert_eq!(h.session.state(), EditorState::Selected);

        h.session.action(ToolAction::DeleteSelected);
        h.session.action(ToolAction::Commit);
        settle(&mut h.session).await;

        assert_eq!(h.session.state(), EditorState::Idle);
        assert_eq!(h.store.count("poi"), 0);
    }

    #[tokio::test]
    async fn extend_gesture_unions_two_features_and_commits_atomically() {
        let store = MemoryStore::with_features(
            "parcels",
            vec![
                (1, square(10.0, 44.8, 0.4)),
                (2, square(10.6, 44.8, 0.4)),
            ],
        );
        let mut h = harness(store, GeometryKind::Polygon, "parcels");

        h.session.start_selection().expect("layer is set");
        drag(&mut h.session, (280.0, 260.0), (420.0, 340.0));
        settle(&mut h.session).await;
        assert_eq!(h.session.state(), EditorState::Selected);

        h.session.begin_extend();
        // start inside feature 1, end inside feature 2
        drag(&mut h.session, (320.0, 300.0), (380.0, 300.0));
        settle(&mut h.session).await;
        assert_eq!(h.session.state(), EditorState::PreviewingCutExtend);
        assert_eq!(h.store.count("parcels"), 2);

        h.session.action(ToolAction::Commit);
        settle(&mut h.session).await;

        assert_eq!(h.session.state(), EditorState::Idle);
        assert_eq!(h.store.count("parcels"), 1);
        assert!(h
            .store
            .operations()
            .iter()
            .any(|op| op.starts_with("replace_and_delete parcels 1 2")));
        let updated = h.store.geometry_of("parcels", 1).expect("feature survives");
        assert_eq!(updated.kind(), GeometryKind::Polygon);
        assert_eq!(updated.geometry_count(), 2);
    }

    #[tokio::test]
    async fn cut_gesture_with_no_feature_under_the_end_point_warns() {
        let store = MemoryStore::with_features("parcels", vec![(1, square(10.0, 44.8, 0.4))]);
        let mut h = harness(store, GeometryKind::Polygon, "parcels");

        h.session.start_selection().expect("layer is set");
        drag(&mut h.session, (280.0, 260.0), (420.0, 340.0));
        settle(&mut h.session).await;
        assert_eq!(h.session.state(), EditorState::Selected);

        h.session.begin_cut();
        drag(&mut h.session, (320.0, 300.0), (380.0, 300.0));
        settle(&mut h.session).await;

        assert_eq!(h.session.state(), EditorState::Selected);
        assert!(h
            .feedback
            .warnings()
            .iter()
            .any(|w| w.contains("end point")));
    }

    #[tokio::test]
    async fn continued_line_commit_updates_instead_of_inserting() {
        let line = Geom::line_from(&[latlon!(45.0, 10.0), latlon!(45.0, 10.1)])
            .expect("valid line input");
        let store = MemoryStore::with_features("tracks", vec![(7, line.clone())]);
        let mut h = harness(store, GeometryKind::Line, "tracks");

        let feature = Feature::new(
            SourceId::from("test.sqlite"),
            "tracks",
            FeatureId(7),
            wkb::to_wkb(&line).expect("wkb encoding"),
        );
        h.session
            .start_create_continuing(feature)
            .expect("line layer");
        assert!(h.session.commit_ready());

        h.session.action(ToolAction::ToggleTapToAdd);
        tap(&mut h.session, 320.0, 300.0); // (10.2, 45.0)
        h.session.action(ToolAction::Commit);
        settle(&mut h.session).await;

        assert_eq!(h.session.state(), EditorState::Idle);
        assert_eq!(h.store.count("tracks"), 1);
        assert!(h.store.operations().iter().any(|op| op == "update tracks 7"));
        let Some(Geom::Line(updated)) = h.store.geometry_of("tracks", 7) else {
            panic!("expected the updated line");
        };
        assert_eq!(updated.0.len(), 3);
    }

    #[tokio::test]
    async fn copying_the_selection_inserts_into_the_target_layer() {
        let store = MemoryStore::with_features(
            "poi",
            vec![(1, point(10.95, 45.0)), (2, point(11.05, 45.0))],
        );
        let mut h = harness(store, GeometryKind::Point, "poi");

        h.session.start_selection().expect("layer is set");
        drag(&mut h.session, (380.0, 280.0), (420.0, 320.0));
        settle(&mut h.session).await;
        assert_eq!(h.session.selection().len(), 2);

        let target = EditableLayer::new(
            SourceId::from("test.sqlite"),
            "poi_backup",
            GeometryKind::Point,
        );
        h.session.action(ToolAction::CopySelectedTo(target));
        settle(&mut h.session).await;

        assert_eq!(h.session.state(), EditorState::Idle);
        assert_eq!(h.store.count("poi_backup"), 2);
        assert_eq!(h.store.count("poi"), 2);
    }

    #[tokio::test]
    async fn gps_vertex_without_a_fix_warns_instead_of_silently_ignoring() {
        let mut h = harness(MemoryStore::default(), GeometryKind::Line, "tracks");
        h.session.start_create().expect("layer is set");

        h.session.action(ToolAction::AddGpsVertex);

        assert!(!h.session.commit_ready());
        assert!(h
            .feedback
            .warnings()
            .iter()
            .any(|w| w.contains("GPS")));
    }

    #[tokio::test]
    async fn gps_stream_appends_every_update_as_a_vertex() {
        let mut h = harness(MemoryStore::default(), GeometryKind::Line, "tracks");
        h.session.start_create().expect("layer is set");

        h.session.on_gps_update(latlon!(45.0, 10.0));
        h.session.action(ToolAction::ToggleGpsStream);
        h.session.on_gps_update(latlon!(45.1, 10.1));
        assert!(!h.session.commit_ready());

        h.session.action(ToolAction::AddGpsVertex);
        assert!(h.session.commit_ready());
        assert_eq!(h.session.last_gps_fix(), Some(latlon!(45.1, 10.1)));
    }

    #[tokio::test]
    async fn measure_mode_reports_distance_in_the_overlay() {
        let mut h = harness(MemoryStore::default(), GeometryKind::Line, "tracks");
        h.session.start_measure().expect("layer is set");

        tap(&mut h.session, 300.0, 300.0);
        tap(&mut h.session, 320.0, 300.0);

        assert_eq!(h.session.state(), EditorState::Measuring);
        let overlay = h.session.overlay();
        assert!(overlay
            .shapes()
            .iter()
            .any(|s| matches!(s, crate::render::OverlayShape::Label { .. })));
    }
}
