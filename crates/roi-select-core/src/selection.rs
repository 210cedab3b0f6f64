//! Rectangular drag tracking for mouse and touch input.
//!
//! Mouse and touch are normalized into [`PointerEvent`]s and fed to a
//! [`SelectionMachine`]. Only one drag is active at a time; events from any
//! other pointer (a second finger, a mouse while a finger is down) are ignored
//! until the active drag ends.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::frame::{Frame, Rect};

/// Default minimum side length of a selection, in units of its own frame.
pub const MIN_SELECTION_SIZE: f64 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerId {
    Mouse,
    Touch(u64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// One normalized input event, positioned relative to the canvas origin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub pointer: PointerId,
    pub phase: PointerPhase,
    /// `None` for touch-end events, which carry no coordinates of their own.
    pub position: Option<Point2<f64>>,
}

impl PointerEvent {
    pub fn new(pointer: PointerId, phase: PointerPhase, position: Option<Point2<f64>>) -> Self {
        Self {
            pointer,
            phase,
            position,
        }
    }

    pub fn mouse_down(x: f64, y: f64) -> Self {
        Self::new(PointerId::Mouse, PointerPhase::Down, Some(Point2::new(x, y)))
    }

    pub fn mouse_move(x: f64, y: f64) -> Self {
        Self::new(PointerId::Mouse, PointerPhase::Move, Some(Point2::new(x, y)))
    }

    pub fn mouse_up(x: f64, y: f64) -> Self {
        Self::new(PointerId::Mouse, PointerPhase::Up, Some(Point2::new(x, y)))
    }

    pub fn touch_start(id: u64, x: f64, y: f64) -> Self {
        Self::new(PointerId::Touch(id), PointerPhase::Down, Some(Point2::new(x, y)))
    }

    pub fn touch_move(id: u64, x: f64, y: f64) -> Self {
        Self::new(PointerId::Touch(id), PointerPhase::Move, Some(Point2::new(x, y)))
    }

    pub fn touch_end(id: u64) -> Self {
        Self::new(PointerId::Touch(id), PointerPhase::Up, None)
    }

    /// Build an event from a browser-style touch list. Only the first touch
    /// point takes part in drag math.
    ///
    /// For `Down` and `Move` pass the event's `touches`. For `Up` and `Cancel`
    /// pass `changedTouches`: the lifted finger is no longer in `touches`, so
    /// that list is empty when the last finger leaves. The resulting event
    /// carries no position and ends the drag at its last move.
    pub fn from_touch_list(phase: PointerPhase, touches: &[(u64, Point2<f64>)]) -> Option<Self> {
        let &(id, position) = touches.first()?;
        let position = match phase {
            PointerPhase::Up | PointerPhase::Cancel => None,
            PointerPhase::Down | PointerPhase::Move => Some(position),
        };
        Some(Self::new(PointerId::Touch(id), phase, position))
    }
}

/// A drag from `start` to `end`, in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Drag {
    pub start: Point2<f64>,
    pub end: Point2<f64>,
}

impl Drag {
    /// The normalized box this drag spans, interpreted in frame `F`.
    pub fn rect<F: Frame>(&self) -> Rect<F> {
        Rect::from_corners(self.start, self.end)
    }

    pub fn width(&self) -> f64 {
        (self.end.x - self.start.x).abs()
    }

    pub fn height(&self) -> f64 {
        (self.end.y - self.start.y).abs()
    }
}

/// What a single event did to the machine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DragStep {
    /// Out-of-order or foreign-pointer event; nothing changed.
    Ignored,
    Started(Point2<f64>),
    /// The in-progress drag changed; redraw with this overlay.
    Moved(Drag),
    /// The drag ended with a box of acceptable size.
    Completed(Drag),
    /// The drag ended below the minimum size and was discarded.
    TooSmall(Drag),
    Cancelled,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum DragState {
    Idle,
    Dragging {
        pointer: PointerId,
        start: Point2<f64>,
        last: Point2<f64>,
    },
}

/// `Idle -> Dragging -> Idle` state machine over [`PointerEvent`]s.
#[derive(Clone, Debug)]
pub struct SelectionMachine {
    min_size: f64,
    state: DragState,
}

impl Default for SelectionMachine {
    fn default() -> Self {
        Self::new(MIN_SELECTION_SIZE)
    }
}

impl SelectionMachine {
    pub fn new(min_size: f64) -> Self {
        Self {
            min_size,
            state: DragState::Idle,
        }
    }

    pub fn min_size(&self) -> f64 {
        self.min_size
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// The drag in progress, if any.
    pub fn current(&self) -> Option<Drag> {
        match self.state {
            DragState::Idle => None,
            DragState::Dragging { start, last, .. } => Some(Drag { start, end: last }),
        }
    }

    pub fn handle(&mut self, event: &PointerEvent) -> DragStep {
        match (self.state, event.phase) {
            (_, PointerPhase::Cancel) => {
                let was_dragging = self.is_dragging();
                self.reset();
                if was_dragging {
                    DragStep::Cancelled
                } else {
                    DragStep::Ignored
                }
            }
            (DragState::Idle, PointerPhase::Down) => match event.position {
                Some(p) => {
                    self.state = DragState::Dragging {
                        pointer: event.pointer,
                        start: p,
                        last: p,
                    };
                    log::debug!("drag started at ({:.1}, {:.1}) by {:?}", p.x, p.y, event.pointer);
                    DragStep::Started(p)
                }
                None => DragStep::Ignored,
            },
            (DragState::Idle, _) => DragStep::Ignored,
            (DragState::Dragging { pointer, .. }, _) if pointer != event.pointer => {
                DragStep::Ignored
            }
            (DragState::Dragging { .. }, PointerPhase::Down) => DragStep::Ignored,
            (DragState::Dragging { pointer, start, .. }, PointerPhase::Move) => {
                let Some(p) = event.position else {
                    return DragStep::Ignored;
                };
                self.state = DragState::Dragging {
                    pointer,
                    start,
                    last: p,
                };
                DragStep::Moved(Drag { start, end: p })
            }
            (DragState::Dragging { start, last, .. }, PointerPhase::Up) => {
                let end = event.position.unwrap_or(last);
                self.state = DragState::Idle;
                let drag = Drag { start, end };
                if drag.width() < self.min_size || drag.height() < self.min_size {
                    log::warn!(
                        "selection too small ({:.0} x {:.0}), discarded",
                        drag.width(),
                        drag.height()
                    );
                    DragStep::TooSmall(drag)
                } else {
                    DragStep::Completed(drag)
                }
            }
        }
    }

    pub fn reset(&mut self) {
        self.state = DragState::Idle;
    }
}
