//! Editing tool groups.
//!
//! A tool group is the state container of the active editing mode: it owns
//! the transient state (candidate vertices, drag rectangle, staged preview),
//! interprets pointer events and palette actions, and derives the live
//! overlay for every frame. Concrete modes are variants of the [`ToolGroup`]
//! sum type dispatched by match; there is no tool class hierarchy.

use std::sync::Arc;

use geosketch_types::GeoPoint2d;

use crate::control::{EventPropagation, PointerEvent};
use crate::error::{EditError, StoreError};
use crate::feature::Feature;
use crate::map::{MapView, Preferences};
use crate::messenger::{Feedback, Messenger};
use crate::render::Overlay;
use crate::session::EditOptions;
use crate::store::{EditableLayer, SpatialStore};
use crate::tasks::TaskSlot;

mod create;
mod cut_extend;
mod measure;
mod select;

pub(crate) use create::CreateFeatureToolGroup;
pub(crate) use cut_extend::{CutExtendPreview, CutExtendTool};
pub(crate) use measure::MeasureTool;
pub(crate) use select::{OnSelectionToolGroup, SelectionTool};

pub use cut_extend::CutExtendOp;

/// The observable state of the editing state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    /// No staged work; selection may be in progress.
    Idle,
    /// A candidate geometry is being accumulated.
    Creating,
    /// A selection set is held.
    Selected,
    /// The selection set is marked for deletion, pending commit.
    PreviewingDelete,
    /// A cut/extend result is staged, pending commit.
    PreviewingCutExtend,
    /// The measure tool is collecting points.
    Measuring,
}

/// Palette action routed to the active tool group.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolAction {
    /// Adds a vertex at the current map center.
    AddVertexAtCenter,
    /// Adds a vertex at the last known GPS coordinate.
    AddGpsVertex,
    /// Toggles continuous GPS-stream vertex insertion.
    ToggleGpsStream,
    /// Toggles tap-to-add vertex insertion.
    ToggleTapToAdd,
    /// Undoes the most recent step of the active mode.
    Undo,
    /// Commits the staged work to the spatial store.
    Commit,
    /// Marks the selection set for deletion.
    DeleteSelected,
    /// Copies the selection set into another editable layer.
    CopySelectedTo(EditableLayer),
    /// Starts the two-point cut gesture.
    BeginCut,
    /// Starts the two-point extend gesture.
    BeginExtend,
}

/// Requested replacement of the active tool group, applied by the session
/// after the current call returns.
pub(crate) enum Transition {
    /// The group is done; the session returns to idle.
    Exit,
    /// A selection query succeeded; switch to the on-selection group.
    ToSelection(Vec<Feature>),
}

/// Completion of a background operation, drained from the task slot.
pub(crate) enum TaskOutcome {
    /// Result of a selection query (rectangle or nearest).
    Selection(Result<Vec<Feature>, StoreError>),
    /// Result of resolving and computing a cut/extend preview.
    CutExtendResolved(Result<CutExtendPreview, EditError>),
    /// Result of committing a created candidate (inserted geometry count).
    CreateCommitted(Result<usize, StoreError>),
    /// Result of committing a deletion.
    DeleteCommitted(Result<(), StoreError>),
    /// Result of committing a cut/extend (update plus delete).
    CutExtendCommitted(Result<(), StoreError>),
    /// Result of copying the selection into another layer (copied count).
    CopyCommitted(Result<usize, StoreError>),
}

/// Collaborators and session state handed to a tool group for one call.
pub(crate) struct ToolContext<'a> {
    pub map: &'a dyn MapView,
    pub store: &'a Arc<dyn SpatialStore>,
    pub layer: &'a EditableLayer,
    pub messenger: &'a Arc<dyn Messenger>,
    pub feedback: &'a Arc<dyn Feedback>,
    pub preferences: &'a Arc<dyn Preferences>,
    pub tasks: &'a TaskSlot<TaskOutcome>,
    pub options: &'a EditOptions,
    pub gps_fix: Option<GeoPoint2d>,
}

/// The active editing mode.
pub(crate) enum ToolGroup {
    /// Drag-rectangle (or tap) feature selection.
    Select(SelectionTool),
    /// Candidate geometry creation.
    Create(CreateFeatureToolGroup),
    /// Operations on a selection set.
    OnSelection(OnSelectionToolGroup),
    /// Distance measurement.
    Measure(MeasureTool),
}

impl ToolGroup {
    pub fn state(&self) -> EditorState {
        match self {
            ToolGroup::Select(_) => EditorState::Idle,
            ToolGroup::Create(_) => EditorState::Creating,
            ToolGroup::OnSelection(group) => group.state(),
            ToolGroup::Measure(_) => EditorState::Measuring,
        }
    }

    pub fn on_pointer_event(
        &mut self,
        ctx: &ToolContext<'_>,
        event: &PointerEvent,
    ) -> (EventPropagation, Option<Transition>) {
        match self {
            ToolGroup::Select(tool) => (tool.on_pointer_event(ctx, event), None),
            ToolGroup::Create(group) => (group.on_pointer_event(ctx, event), None),
            ToolGroup::OnSelection(group) => (group.on_pointer_event(ctx, event), None),
            ToolGroup::Measure(tool) => (tool.on_pointer_event(ctx, event), None),
        }
    }

    pub fn on_action(
        &mut self,
        ctx: &ToolContext<'_>,
        action: &ToolAction,
    ) -> Option<Transition> {
        match self {
            ToolGroup::Select(_) => None,
            ToolGroup::Create(group) => group.on_action(ctx, action),
            ToolGroup::OnSelection(group) => group.on_action(ctx, action),
            ToolGroup::Measure(tool) => tool.on_action(ctx, action),
        }
    }

    pub fn on_gps_update(&mut self, ctx: &ToolContext<'_>, position: GeoPoint2d) {
        if let ToolGroup::Create(group) = self {
            group.on_gps_update(ctx, position);
        }
    }

    pub fn on_task_outcome(
        &mut self,
        ctx: &ToolContext<'_>,
        outcome: TaskOutcome,
    ) -> Option<Transition> {
        match self {
            ToolGroup::Select(tool) => tool.on_task_outcome(ctx, outcome),
            ToolGroup::Create(group) => group.on_task_outcome(ctx, outcome),
            ToolGroup::OnSelection(group) => group.on_task_outcome(ctx, outcome),
            ToolGroup::Measure(_) => None,
        }
    }

    pub fn overlay(&self, ctx: &ToolContext<'_>) -> Overlay {
        match self {
            ToolGroup::Select(tool) => tool.overlay(ctx),
            ToolGroup::Create(group) => group.overlay(ctx),
            ToolGroup::OnSelection(group) => group.overlay(ctx),
            ToolGroup::Measure(tool) => tool.overlay(ctx),
        }
    }

    /// Whether the staged work may be committed right now. Drives the
    /// visibility of the commit control in the host UI.
    pub fn commit_ready(&self) -> bool {
        match self {
            ToolGroup::Select(_) => false,
            ToolGroup::Create(group) => group.commit_ready(),
            ToolGroup::OnSelection(group) => group.commit_ready(),
            ToolGroup::Measure(_) => false,
        }
    }

    /// Releases transient state before the group is dropped or replaced.
    pub fn disable(&mut self) {
        if let ToolGroup::Create(group) = self {
            group.disable();
        }
    }

    /// The features currently selected, if this group holds a selection.
    pub fn selection(&self) -> &[Feature] {
        match self {
            ToolGroup::OnSelection(group) => group.features(),
            _ => &[],
        }
    }
}
