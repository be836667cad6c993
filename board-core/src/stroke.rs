//! Local stroke capture state machine.
//!
//! ```text
//!            begin(p)                extend(p, style)
//!   ┌──────┐ ───────▶ ┌─────────┐ ◀──────────────┐
//!   │ Idle │          │ Drawing │ ────────────────┘
//!   └──────┘ ◀─────── └─────────┘
//!              end()
//! ```
//!
//! The session only decides which transitions are valid and what they
//! produce; rendering and broadcasting are done by the engine.

use crate::{BoardMessage, Point, StrokeStyle};

/// Whether a local stroke is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrokePhase {
    /// No button or finger is down.
    #[default]
    Idle,
    /// A stroke is being drawn.
    Drawing,
}

/// A stroke event produced by a valid transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrokeEvent {
    /// A new path starts at a point.
    BeginStroke(Point),
    /// The current path extends to a point with a style.
    StrokePoint(Point, StrokeStyle),
}

impl From<StrokeEvent> for BoardMessage {
    fn from(event: StrokeEvent) -> Self {
        match event {
            StrokeEvent::BeginStroke(point) => BoardMessage::begin_path(point),
            StrokeEvent::StrokePoint(point, style) => BoardMessage::draw(point, style),
        }
    }
}

/// Tracks the local participant's press/move/release cycle.
#[derive(Debug, Clone, Default)]
pub struct StrokeSession {
    phase: StrokePhase,
    /// Points added to the current stroke, including the starting point.
    point_count: usize,
}

impl StrokeSession {
    /// Create an idle session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> StrokePhase {
        self.phase
    }

    /// Whether a stroke is in progress.
    #[must_use]
    pub fn is_drawing(&self) -> bool {
        self.phase == StrokePhase::Drawing
    }

    /// Points in the current stroke, or in the last finished one.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.point_count
    }

    /// Press: start a stroke at `point`.
    ///
    /// A press while already drawing restarts the path at `point`.
    pub fn begin(&mut self, point: Point) -> StrokeEvent {
        if self.is_drawing() {
            tracing::debug!("Press while drawing, restarting path");
        }
        self.phase = StrokePhase::Drawing;
        self.point_count = 1;
        StrokeEvent::BeginStroke(point)
    }

    /// Move: extend the stroke.
    ///
    /// Returns `None` while idle, so stray move events before a press
    /// neither render nor broadcast.
    pub fn extend(&mut self, point: Point, style: StrokeStyle) -> Option<StrokeEvent> {
        if !self.is_drawing() {
            return None;
        }
        self.point_count += 1;
        Some(StrokeEvent::StrokePoint(point, style))
    }

    /// Release: finish the stroke.
    ///
    /// Returns `true` if a stroke was in progress and has now completed.
    pub fn end(&mut self) -> bool {
        if !self.is_drawing() {
            return false;
        }
        self.phase = StrokePhase::Idle;
        true
    }
}
