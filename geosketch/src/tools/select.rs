//! Feature selection and operations on the selection set.

use geosketch_types::{GeometryKind, GeoRect, Rect, ScreenPoint};

use crate::control::{EventPropagation, PointerEvent};
use crate::feature::Feature;
use crate::geometry::ops;
use crate::render::{self, paints, Overlay, OverlayShape};
use crate::tools::{
    CutExtendPreview, CutExtendTool, EditorState, TaskOutcome, ToolAction, ToolContext, Transition,
};

/// Tool that selects features with a drag rectangle, or with a tap for
/// point layers.
///
/// The bounding-box query runs on the background task; an empty result
/// leaves the session state untouched, a non-empty one hands the features
/// over to the on-selection group.
pub(crate) struct SelectionTool {
    start: Option<ScreenPoint>,
    current: Option<ScreenPoint>,
}

impl SelectionTool {
    pub fn new() -> Self {
        Self {
            start: None,
            current: None,
        }
    }

    pub fn on_pointer_event(
        &mut self,
        ctx: &ToolContext<'_>,
        event: &PointerEvent,
    ) -> EventPropagation {
        match event {
            PointerEvent::DragStarted(position) => {
                self.start = Some(*position);
                self.current = Some(*position);
                EventPropagation::Consume
            }
            PointerEvent::Drag { to, .. } => {
                if self.start.is_some() {
                    self.current = Some(*to);
                    ctx.messenger.request_redraw();
                }
                EventPropagation::Consume
            }
            PointerEvent::DragEnded(position) => {
                self.current = Some(*position);
                if let (Some(start), Some(end)) = (self.start, self.current) {
                    self.query_rectangle(ctx, start, end);
                }
                EventPropagation::Consume
            }
            PointerEvent::Tap(position) if ctx.layer.kind == GeometryKind::Point => {
                self.query_nearest(ctx, *position);
                EventPropagation::Consume
            }
            _ => EventPropagation::Propagate,
        }
    }

    pub fn on_task_outcome(
        &mut self,
        ctx: &ToolContext<'_>,
        outcome: TaskOutcome,
    ) -> Option<Transition> {
        let TaskOutcome::Selection(result) = outcome else {
            return None;
        };
        match result {
            Ok(features) if features.is_empty() => {
                self.clear_rect(ctx);
                None
            }
            Ok(features) => {
                let geometries: usize = features
                    .iter()
                    .filter_map(|f| f.geometry().ok())
                    .map(|g| g.geometry_count())
                    .sum();
                ctx.feedback.toast(&format!(
                    "selected {} features ({} geometries) in {}",
                    features.len(),
                    geometries,
                    ctx.layer.table
                ));
                Some(Transition::ToSelection(features))
            }
            Err(error) => {
                log::error!("selection query failed: {error}");
                ctx.feedback.warning("failed to query the layer");
                Some(Transition::Exit)
            }
        }
    }

    pub fn overlay(&self, _ctx: &ToolContext<'_>) -> Overlay {
        let mut overlay = Overlay::new();
        if let (Some(start), Some(current)) = (self.start, self.current) {
            overlay.push(OverlayShape::Rect {
                rect: Rect::from_corners((start.x, start.y), (current.x, current.y)),
                line: paints::SELECT_RECT_STROKE,
                fill: Some(paints::SELECT_RECT_FILL),
            });
        }
        overlay
    }

    fn clear_rect(&mut self, ctx: &ToolContext<'_>) {
        self.start = None;
        self.current = None;
        ctx.messenger.request_redraw();
    }

    fn query_rectangle(&self, ctx: &ToolContext<'_>, start: ScreenPoint, end: ScreenPoint) {
        let (Some(start_geo), Some(end_geo)) =
            (ctx.map.screen_to_geo(start), ctx.map.screen_to_geo(end))
        else {
            return;
        };
        let bounds = GeoRect::from_corners(start_geo, end_geo)
            .expand_degenerate(ctx.options.degenerate_bbox_eps);

        let store = ctx.store.clone();
        let layer = ctx.layer.clone();
        let started = ctx.tasks.try_start(ctx.messenger.clone(), async move {
            TaskOutcome::Selection(store.query_bbox(&layer, bounds).await)
        });
        if !started {
            log::debug!("selection query skipped: another operation is in flight");
        }
    }

    /// Queries a small box around the tapped point and picks the feature
    /// nearest to the touch.
    fn query_nearest(&self, ctx: &ToolContext<'_>, position: ScreenPoint) {
        let tolerance = ctx.options.selection_tolerance_px;
        let min = ScreenPoint::new(position.x - tolerance, position.y - tolerance);
        let max = ScreenPoint::new(position.x + tolerance, position.y + tolerance);
        let (Some(touched), Some(min_geo), Some(max_geo)) = (
            ctx.map.screen_to_geo(position),
            ctx.map.screen_to_geo(min),
            ctx.map.screen_to_geo(max),
        ) else {
            return;
        };
        let bounds = GeoRect::from_corners(min_geo, max_geo)
            .expand_degenerate(ctx.options.degenerate_bbox_eps);

        let store = ctx.store.clone();
        let layer = ctx.layer.clone();
        let started = ctx.tasks.try_start(ctx.messenger.clone(), async move {
            let result = store.query_bbox(&layer, bounds).await.map(|features| {
                let mut nearest: Option<(f64, Feature)> = None;
                for feature in features {
                    let Ok(geometry) = feature.geometry() else {
                        continue;
                    };
                    let distance = ops::distance_to(&geometry, touched);
                    let closer = nearest
                        .as_ref()
                        .map(|(best, _)| distance < *best)
                        .unwrap_or(true);
                    if closer {
                        nearest = Some((distance, feature));
                    }
                }
                nearest.map(|(_, feature)| vec![feature]).unwrap_or_default()
            });
            TaskOutcome::Selection(result)
        });
        if !started {
            log::debug!("nearest query skipped: another operation is in flight");
        }
    }
}

/// What the on-selection group currently stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SelectionMode {
    Selected,
    PreviewingDelete,
    PreviewingCutExtend,
}

/// The group of tools active when a selection has been made.
///
/// Holds the selection set and stages non-persisted mutations: the delete
/// preview and the cut/extend preview. Nothing is written until the commit
/// action.
pub(crate) struct OnSelectionToolGroup {
    features: Vec<Feature>,
    mode: SelectionMode,
    cut_extend: Option<CutExtendTool>,
    preview: Option<CutExtendPreview>,
}

impl OnSelectionToolGroup {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            features,
            mode: SelectionMode::Selected,
            cut_extend: None,
            preview: None,
        }
    }

    pub fn state(&self) -> EditorState {
        match self.mode {
            SelectionMode::Selected => EditorState::Selected,
            SelectionMode::PreviewingDelete => EditorState::PreviewingDelete,
            SelectionMode::PreviewingCutExtend => EditorState::PreviewingCutExtend,
        }
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn commit_ready(&self) -> bool {
        self.mode != SelectionMode::Selected
    }

    pub fn on_pointer_event(
        &mut self,
        ctx: &ToolContext<'_>,
        event: &PointerEvent,
    ) -> EventPropagation {
        if self.mode == SelectionMode::Selected {
            if let Some(tool) = &mut self.cut_extend {
                return tool.on_pointer_event(ctx, event);
            }
        }
        EventPropagation::Propagate
    }

    pub fn on_action(
        &mut self,
        ctx: &ToolContext<'_>,
        action: &ToolAction,
    ) -> Option<Transition> {
        match action {
            ToolAction::DeleteSelected => {
                if self.mode == SelectionMode::Selected {
                    self.mode = SelectionMode::PreviewingDelete;
                    self.cut_extend = None;
                    ctx.messenger.request_redraw();
                }
                None
            }
            ToolAction::BeginCut => self.toggle_cut_extend(ctx, super::CutExtendOp::Cut),
            ToolAction::BeginExtend => self.toggle_cut_extend(ctx, super::CutExtendOp::Extend),
            ToolAction::Undo => self.undo(ctx),
            ToolAction::Commit => {
                self.commit(ctx);
                None
            }
            ToolAction::CopySelectedTo(target) => {
                self.copy_to(ctx, target);
                None
            }
            _ => None,
        }
    }

    pub fn on_task_outcome(
        &mut self,
        ctx: &ToolContext<'_>,
        outcome: TaskOutcome,
    ) -> Option<Transition> {
        match outcome {
            TaskOutcome::CutExtendResolved(Ok(preview)) => {
                self.preview = Some(preview);
                self.mode = SelectionMode::PreviewingCutExtend;
                ctx.messenger.request_redraw();
                None
            }
            TaskOutcome::CutExtendResolved(Err(error)) => {
                ctx.feedback.warning(&error.to_string());
                ctx.messenger.request_redraw();
                None
            }
            TaskOutcome::DeleteCommitted(Ok(())) => {
                ctx.feedback.toast("features deleted");
                self.features.clear();
                ctx.messenger.request_map_refresh();
                Some(Transition::Exit)
            }
            TaskOutcome::DeleteCommitted(Err(error)) => {
                log::error!("failed to delete features: {error}");
                ctx.feedback.warning("failed to delete the selected features");
                None
            }
            TaskOutcome::CutExtendCommitted(Ok(())) => {
                ctx.feedback.toast("geometry saved");
                ctx.messenger.request_map_refresh();
                Some(Transition::Exit)
            }
            TaskOutcome::CutExtendCommitted(Err(error)) => {
                log::error!("failed to save the cut/extend result: {error}");
                ctx.feedback.warning("failed to save the geometry");
                None
            }
            TaskOutcome::CopyCommitted(Ok(count)) => {
                ctx.feedback.toast(&format!("copied {count} features"));
                self.features.clear();
                ctx.messenger.request_map_refresh();
                Some(Transition::Exit)
            }
            TaskOutcome::CopyCommitted(Err(error)) => {
                log::error!("failed to copy features: {error}");
                ctx.feedback.warning("failed to copy the selected features");
                None
            }
            _ => None,
        }
    }

    pub fn overlay(&self, ctx: &ToolContext<'_>) -> Overlay {
        let mut overlay = Overlay::new();

        let (stroke, fill) = match self.mode {
            SelectionMode::Selected => (paints::CREATED_STROKE, paints::CREATED_FILL),
            _ => (paints::PREVIEW_STROKE, paints::PREVIEW_FILL),
        };

        for feature in &self.features {
            match feature.geometry() {
                Ok(geometry) => {
                    for shape in render::geometry_shapes(&geometry, ctx.map, stroke, Some(fill)) {
                        overlay.push(shape);
                    }
                }
                Err(error) => {
                    log::warn!("not drawing feature {} with bad geometry: {error}", feature.id());
                }
            }
        }

        if self.mode == SelectionMode::PreviewingCutExtend {
            if let Some(preview) = &self.preview {
                for shape in render::geometry_shapes(
                    &preview.geometry,
                    ctx.map,
                    paints::PREVIEW_STROKE,
                    Some(paints::PREVIEW_FILL),
                ) {
                    overlay.push(shape);
                }
            }
        }

        if let Some(tool) = &self.cut_extend {
            for shape in tool.overlay(ctx).shapes() {
                overlay.push(shape.clone());
            }
        }

        overlay
    }

    fn toggle_cut_extend(
        &mut self,
        ctx: &ToolContext<'_>,
        op: super::CutExtendOp,
    ) -> Option<Transition> {
        if self.mode != SelectionMode::Selected {
            return None;
        }
        let same = self.cut_extend.as_ref().map(|t| t.op()) == Some(op);
        self.cut_extend = if same {
            None
        } else {
            Some(CutExtendTool::new(op))
        };
        ctx.messenger.request_redraw();
        None
    }

    fn undo(&mut self, ctx: &ToolContext<'_>) -> Option<Transition> {
        match self.mode {
            SelectionMode::PreviewingDelete => {
                self.mode = SelectionMode::Selected;
                ctx.messenger.request_redraw();
                None
            }
            SelectionMode::PreviewingCutExtend => {
                self.preview = None;
                self.cut_extend = None;
                self.mode = SelectionMode::Selected;
                ctx.messenger.request_redraw();
                None
            }
            SelectionMode::Selected => {
                if self.cut_extend.is_some() {
                    self.cut_extend = None;
                    ctx.messenger.request_redraw();
                    None
                } else {
                    self.features.clear();
                    Some(Transition::Exit)
                }
            }
        }
    }

    fn commit(&mut self, ctx: &ToolContext<'_>) {
        match self.mode {
            SelectionMode::Selected => {
                log::debug!("commit requested with nothing staged, ignored");
            }
            SelectionMode::PreviewingDelete => {
                let ids: Vec<_> = self.features.iter().map(|f| f.id()).collect();
                let store = ctx.store.clone();
                let layer = ctx.layer.clone();
                let started = ctx.tasks.try_start(ctx.messenger.clone(), async move {
                    TaskOutcome::DeleteCommitted(store.delete(&layer, &ids).await)
                });
                if !started {
                    log::debug!("delete skipped: another operation is in flight");
                }
            }
            SelectionMode::PreviewingCutExtend => {
                let Some(preview) = &self.preview else {
                    return;
                };
                if !ctx.layer.kind.is_compatible(&preview.geometry) {
                    ctx.feedback.warning(
                        "the resulting geometry is not compatible with the destination layer",
                    );
                    return;
                }

                let store = ctx.store.clone();
                let layer = ctx.layer.clone();
                let srid = ctx.layer.srid;
                let id = preview.updated.id();
                let remove = preview.remove.id();
                let geometry = preview.geometry.clone();
                let started = ctx.tasks.try_start(ctx.messenger.clone(), async move {
                    TaskOutcome::CutExtendCommitted(
                        store
                            .replace_and_delete(&layer, id, &geometry, srid, remove)
                            .await,
                    )
                });
                if !started {
                    log::debug!("cut/extend commit skipped: another operation is in flight");
                }
            }
        }
    }

    fn copy_to(&self, ctx: &ToolContext<'_>, target: &crate::store::EditableLayer) {
        if self.mode != SelectionMode::Selected {
            return;
        }
        if target.kind != ctx.layer.kind {
            ctx.feedback
                .warning("the target layer accepts a different geometry type");
            return;
        }

        let store = ctx.store.clone();
        let target = target.clone();
        let features = self.features.clone();
        let started = ctx.tasks.try_start(ctx.messenger.clone(), async move {
            let result = async {
                let mut count = 0;
                for feature in &features {
                    let geometry = match feature.geometry() {
                        Ok(geometry) => geometry,
                        Err(error) => {
                            log::warn!(
                                "not copying feature {} with bad geometry: {error}",
                                feature.id()
                            );
                            continue;
                        }
                    };
                    store.insert(&target, &geometry, target.srid).await?;
                    count += 1;
                }
                Ok(count)
            }
            .await;
            TaskOutcome::CopyCommitted(result)
        });
        if !started {
            log::debug!("copy skipped: another operation is in flight");
        }
    }
}
