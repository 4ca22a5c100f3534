//! Pointer input handling.
//!
//! Input handling is done in two steps:
//! 1. The host converts its windowing or touch events into the common
//!    [`RawPointerEvent`] enum and feeds them to the session.
//! 2. The [`EventProcessor`] keeps track of the pointer state and converts
//!    raw events into [`PointerEvent`]s - taps and drags with the timing and
//!    movement thresholds already applied - which the active tool group
//!    interprets.

use geosketch_types::ScreenPoint;

mod event_processor;

pub use event_processor::EventProcessor;

/// Raw pointer event received from the host windowing or touch system.
///
/// Carries no input state; the state is tracked by the [`EventProcessor`].
#[derive(Debug, Clone, Copy)]
pub enum RawPointerEvent {
    /// The pointer touched down at the given screen position.
    PointerDown(ScreenPoint),
    /// The pointer moved to the given screen position.
    PointerMoved(ScreenPoint),
    /// The pointer was released at the given screen position.
    PointerUp(ScreenPoint),
}

/// Processed pointer event handed to the active tool group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// The pointer touched down.
    PointerDown(ScreenPoint),
    /// The pointer moved while not dragging.
    PointerMoved(ScreenPoint),
    /// The pointer was released.
    PointerUp(ScreenPoint),
    /// The pointer was pressed and released quickly without moving beyond
    /// the drag threshold.
    Tap(ScreenPoint),
    /// The pointer moved beyond the drag threshold while pressed. The
    /// position is where the press happened, not the current position.
    DragStarted(ScreenPoint),
    /// The pointer moved while dragging.
    Drag {
        /// Position of the previous drag event.
        from: ScreenPoint,
        /// Current position.
        to: ScreenPoint,
    },
    /// The pointer was released while dragging.
    DragEnded(ScreenPoint),
}

/// Value returned by a tool group to indicate what should happen with the
/// event after it was seen by the editing engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventPropagation {
    /// The event was not used; the host should process it as usual (for
    /// example pan or zoom the map).
    Propagate,
    /// The event was consumed by the editing tool and must not reach the
    /// map navigation.
    Consume,
}
