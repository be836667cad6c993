//! Snapshot-based undo/redo history.
//!
//! The top of the undo stack is always the state currently on screen. Undo
//! discards that top and renders the one beneath it; redo brings the most
//! recently discarded state back.

use crate::Snapshot;

/// Undo and redo stacks of full-surface snapshots.
#[derive(Debug, Clone)]
pub struct History {
    /// Rendered states, oldest first. Never empty; the first entry is the
    /// blank surface.
    undo_stack: Vec<Snapshot>,
    /// States discarded by undo, most recent last.
    redo_stack: Vec<Snapshot>,
}

impl History {
    /// Create a history whose only state is `blank`.
    #[must_use]
    pub fn new(blank: Snapshot) -> Self {
        Self {
            undo_stack: vec![blank],
            redo_stack: Vec::new(),
        }
    }

    /// Record a newly rendered state. Clears the redo stack.
    pub fn push(&mut self, snapshot: Snapshot) {
        self.undo_stack.push(snapshot);
        self.redo_stack.clear();
    }

    /// Discard the current state and return the one to render instead.
    ///
    /// Returns `None` when only the initial state is left.
    pub fn undo(&mut self) -> Option<Snapshot> {
        if self.undo_stack.len() <= 1 {
            return None;
        }
        let discarded = self.undo_stack.pop()?;
        self.redo_stack.push(discarded);
        self.undo_stack.last().cloned()
    }

    /// Bring back the most recently undone state and return it.
    ///
    /// Returns `None` when nothing has been undone since the last push or
    /// reset.
    pub fn redo(&mut self) -> Option<Snapshot> {
        let restored = self.redo_stack.pop()?;
        self.undo_stack.push(restored.clone());
        Some(restored)
    }

    /// Forget everything and start again from `blank`.
    pub fn reset(&mut self, blank: Snapshot) {
        self.undo_stack.clear();
        self.undo_stack.push(blank);
        self.redo_stack.clear();
    }

    /// The state currently on screen.
    #[must_use]
    pub fn current(&self) -> Option<&Snapshot> {
        self.undo_stack.last()
    }

    /// Number of entries on the undo stack, including the initial state.
    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of entries on the redo stack.
    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Whether an undo would do anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() > 1
    }

    /// Whether a redo would do anything.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}
