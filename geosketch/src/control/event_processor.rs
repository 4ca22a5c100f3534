use geosketch_types::ScreenPoint;
use web_time::SystemTime;

use crate::control::{PointerEvent, RawPointerEvent};

const DRAG_THRESHOLD: f64 = 3.0;
const TAP_TIMEOUT: std::time::Duration = std::time::Duration::from_millis(200);

/// Converts raw pointer events into [`PointerEvent`]s, tracking press state,
/// drag detection and tap timing.
pub struct EventProcessor {
    pointer_position: ScreenPoint,
    pressed_position: ScreenPoint,
    pressed: bool,
    dragging: bool,
    last_pressed_time: SystemTime,
}

impl Default for EventProcessor {
    fn default() -> Self {
        Self {
            pointer_position: Default::default(),
            pressed_position: Default::default(),
            pressed: false,
            dragging: false,
            last_pressed_time: SystemTime::UNIX_EPOCH,
        }
    }
}

impl EventProcessor {
    /// Creates a processor with no pointer state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Processes one raw event, producing zero or more pointer events in the
    /// order they should be handled.
    pub fn process(&mut self, event: RawPointerEvent) -> Vec<PointerEvent> {
        let now = SystemTime::now();
        match event {
            RawPointerEvent::PointerDown(position) => {
                self.pointer_position = position;
                self.pressed_position = position;
                self.pressed = true;
                self.dragging = false;
                self.last_pressed_time = now;

                vec![PointerEvent::PointerDown(position)]
            }
            RawPointerEvent::PointerMoved(position) => {
                let prev_position = self.pointer_position;
                self.pointer_position = position;

                if !self.pressed {
                    return vec![PointerEvent::PointerMoved(position)];
                }

                let mut events = vec![];
                if !self.dragging
                    && taxicab_distance(position, self.pressed_position) > DRAG_THRESHOLD
                {
                    self.dragging = true;
                    events.push(PointerEvent::DragStarted(self.pressed_position));
                    events.push(PointerEvent::Drag {
                        from: self.pressed_position,
                        to: position,
                    });
                } else if self.dragging {
                    events.push(PointerEvent::Drag {
                        from: prev_position,
                        to: position,
                    });
                } else {
                    events.push(PointerEvent::PointerMoved(position));
                }

                events
            }
            RawPointerEvent::PointerUp(position) => {
                self.pointer_position = position;
                let was_dragging = self.dragging;
                let was_pressed = self.pressed;
                self.pressed = false;
                self.dragging = false;

                let mut events = vec![PointerEvent::PointerUp(position)];
                if was_dragging {
                    events.push(PointerEvent::DragEnded(position));
                } else if was_pressed
                    && now
                        .duration_since(self.last_pressed_time)
                        .unwrap_or_default()
                        < TAP_TIMEOUT
                {
                    events.push(PointerEvent::Tap(position));
                }

                events
            }
        }
    }
}

fn taxicab_distance(a: ScreenPoint, b: ScreenPoint) -> f64 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}
