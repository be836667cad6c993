//! Render-target seams the engine drives.
//!
//! [`Surface`] covers the drawing side effects of strokes and clears;
//! [`SnapshotStore`] covers whole-surface capture and restore. Keeping the
//! two apart lets a different snapshot representation replace the current
//! full-image one without touching the engine's state machine.

use crate::{Point, Snapshot, SnapshotResult, StrokeStyle};

/// Which path a drawing call targets.
///
/// Local and remote strokes keep separate pen positions so that a remote
/// `beginPath` never breaks an in-progress local stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathOwner {
    /// The local participant's stroke.
    Local,
    /// Strokes received from other participants.
    Remote,
}

/// A drawing surface owned by one participant.
pub trait Surface {
    /// Start a new path for `owner` at `point`.
    fn begin_path(&mut self, owner: PathOwner, point: Point);

    /// Extend `owner`'s path to `point` and stroke the new segment
    /// immediately with `style`. Does nothing if `owner` has no open path.
    fn line_to(&mut self, owner: PathOwner, point: Point, style: &StrokeStyle);

    /// Close `owner`'s path.
    fn close_path(&mut self, owner: PathOwner);

    /// Whether `owner` currently has an open path.
    fn has_open_path(&self, owner: PathOwner) -> bool;

    /// Erase all visible content. Open paths are left as they are.
    fn clear(&mut self);
}

/// Whole-surface capture and restore.
pub trait SnapshotStore {
    /// A fully decoded snapshot, ready to be swapped in.
    type Frame: Send + 'static;

    /// Encode exactly what is currently visible.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Encode`](crate::SnapshotError::Encode) if the
    /// surface cannot be encoded.
    fn capture(&self) -> SnapshotResult<Snapshot>;

    /// Decode a snapshot without touching any surface.
    ///
    /// This is the only step of a restore that may be slow, so it takes no
    /// receiver and can run on a worker thread.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Malformed`](crate::SnapshotError::Malformed)
    /// for empty or undecodable input.
    fn decode(snapshot: &Snapshot) -> SnapshotResult<Self::Frame>;

    /// Replace all visible content with a decoded frame in one step.
    fn apply(&mut self, frame: Self::Frame);

    /// Decode and apply. On failure the surface is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns the decode error; nothing has been applied in that case.
    fn restore(&mut self, snapshot: &Snapshot) -> SnapshotResult<()> {
        let frame = Self::decode(snapshot)?;
        self.apply(frame);
        Ok(())
    }
}
