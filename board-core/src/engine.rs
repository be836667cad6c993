//! # Synchronization Engine
//!
//! Turns local actions into outbound [`BoardMessage`]s and inbound messages
//! into surface mutations.
//!
//! ## Local actions
//!
//! | Action | Local effect | Broadcast |
//! |---|---|---|
//! | `begin_stroke` | open local path | `beginPath` |
//! | `extend_stroke` | stroke segment (only while drawing) | `draw` with the caller's style |
//! | `end_stroke` | close path, push snapshot to history | nothing |
//! | `clear` | clear surface, reset history | `clear` |
//! | `undo` | restore previous snapshot | `undo` with that snapshot, only if something was undone |
//! | `redo` | restore redone snapshot | `redo` with that snapshot, only if something was redone |
//!
//! ## Inbound messages
//!
//! Inbound messages only touch the surface. They never replay through the
//! local [`History`]: a remote `clear` blanks the screen but keeps the local
//! undo stack, and remote `undo`/`redo` just render the snapshot they carry.
//! When two participants undo concurrently, whichever message arrives last
//! wins on each receiver.

use crate::{
    BoardMessage, History, PathOwner, Point, Snapshot, SnapshotStore, StrokeSession, StrokeStyle,
    Surface, SyncChannel, SyncError, SyncResult,
};

/// An inbound message whose slow part (snapshot decoding) is already done.
///
/// Produced by [`SyncEngine::prepare_inbound`], which needs no access to the
/// surface and can run on a worker; consumed by
/// [`SyncEngine::apply_inbound`], which swaps the result in synchronously.
#[derive(Debug)]
pub enum PreparedInbound<F> {
    /// Open the remote path at a point.
    BeginPath(Point),
    /// Extend the remote path with the sender's style.
    Draw(Point, StrokeStyle),
    /// Clear the visible surface.
    Clear,
    /// Render a decoded snapshot from a remote undo.
    Undo(F),
    /// Render a decoded snapshot from a remote redo.
    Redo(F),
    /// An undo or redo without a snapshot; nothing to do.
    Skip(&'static str),
}

/// Per-participant synchronization engine.
///
/// Owns the participant's surface, history, stroke session and channel
/// handle. Nothing here is shared with other participants; they converge
/// only through messages.
pub struct SyncEngine<S, C> {
    surface: S,
    channel: C,
    history: History,
    stroke: StrokeSession,
    dropped_messages: u64,
}

impl<S, C> SyncEngine<S, C>
where
    S: Surface + SnapshotStore,
    C: SyncChannel,
{
    /// Create an engine over `surface`, using its current content as the
    /// initial history entry.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Capture`] if the initial snapshot cannot be
    /// taken.
    pub fn new(surface: S, channel: C) -> SyncResult<Self> {
        let blank = surface.capture()?;
        tracing::debug!(blank = ?blank, "Board engine initialized");
        Ok(Self {
            surface,
            channel,
            history: History::new(blank),
            stroke: StrokeSession::new(),
            dropped_messages: 0,
        })
    }

    /// The participant's surface.
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The participant's undo/redo history.
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// The local stroke session.
    #[must_use]
    pub fn stroke(&self) -> &StrokeSession {
        &self.stroke
    }

    /// The channel handle.
    #[must_use]
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Outbound messages dropped because the channel was unavailable.
    #[must_use]
    pub fn dropped_messages(&self) -> u64 {
        self.dropped_messages
    }

    /// Close the channel. Local actions keep working; their messages are
    /// dropped.
    pub fn close_channel(&self) {
        self.channel.close();
        tracing::info!("Board channel closed");
    }

    /// Take the surface and channel back.
    #[must_use]
    pub fn into_parts(self) -> (S, C) {
        (self.surface, self.channel)
    }

    // === Local actions ===

    /// Press: start a local stroke at `point` and broadcast `beginPath`.
    pub fn begin_stroke(&mut self, point: Point) {
        let event = self.stroke.begin(point);
        self.surface.begin_path(PathOwner::Local, point);
        self.emit(event.into());
    }

    /// Move: extend the local stroke with `style`.
    ///
    /// Renders and broadcasts `draw` only while a stroke is in progress.
    /// Returns whether anything happened.
    pub fn extend_stroke(&mut self, point: Point, style: StrokeStyle) -> bool {
        let Some(event) = self.stroke.extend(point, style) else {
            return false;
        };
        self.surface.line_to(PathOwner::Local, point, &style);
        self.emit(event.into());
        true
    }

    /// Release: finish the local stroke and record the surface in history.
    ///
    /// Returns whether a stroke was in progress.
    pub fn end_stroke(&mut self) -> bool {
        if !self.stroke.end() {
            return false;
        }
        self.surface.close_path(PathOwner::Local);
        match self.surface.capture() {
            Ok(snapshot) => {
                self.history.push(snapshot);
                tracing::debug!(
                    points = self.stroke.point_count(),
                    undo_len = self.history.undo_len(),
                    "Stroke completed"
                );
            }
            Err(e) => {
                tracing::warn!("Stroke completed but snapshot capture failed: {}", e);
            }
        }
        true
    }

    /// Clear the surface, restart history from the blank surface and
    /// broadcast `clear`.
    pub fn clear(&mut self) {
        self.surface.clear();
        match self.surface.capture() {
            Ok(blank) => self.history.reset(blank),
            Err(e) => tracing::warn!("Cleared surface but blank capture failed: {}", e),
        }
        self.emit(BoardMessage::Clear);
    }

    /// Undo the last local change.
    ///
    /// Returns `false` without broadcasting when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo() else {
            tracing::debug!("Nothing to undo");
            return false;
        };
        self.restore_local(&snapshot, "undo");
        self.emit(BoardMessage::undo(snapshot));
        true
    }

    /// Redo the last undone change.
    ///
    /// Returns `false` without broadcasting when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo() else {
            tracing::debug!("Nothing to redo");
            return false;
        };
        self.restore_local(&snapshot, "redo");
        self.emit(BoardMessage::redo(snapshot));
        true
    }

    // === Inbound messages ===

    /// Decode an inbound message without touching any surface.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::MalformedSnapshot`] if an undo/redo snapshot
    /// cannot be decoded.
    pub fn prepare_inbound(message: BoardMessage) -> SyncResult<PreparedInbound<S::Frame>> {
        let prepared = match message {
            BoardMessage::BeginPath { x, y } => PreparedInbound::BeginPath(Point::new(x, y)),
            BoardMessage::Draw {
                x,
                y,
                color,
                thickness,
            } => PreparedInbound::Draw(Point::new(x, y), StrokeStyle::new(color, thickness)),
            BoardMessage::Clear => PreparedInbound::Clear,
            BoardMessage::Undo { image } => match decodable(image.as_ref()) {
                Some(snapshot) => PreparedInbound::Undo(S::decode(snapshot)?),
                None => PreparedInbound::Skip("undo"),
            },
            BoardMessage::Redo { image } => match decodable(image.as_ref()) {
                Some(snapshot) => PreparedInbound::Redo(S::decode(snapshot)?),
                None => PreparedInbound::Skip("redo"),
            },
        };
        Ok(prepared)
    }

    /// Apply a prepared inbound message to the surface.
    pub fn apply_inbound(&mut self, prepared: PreparedInbound<S::Frame>) {
        match prepared {
            PreparedInbound::BeginPath(point) => {
                self.surface.begin_path(PathOwner::Remote, point);
            }
            PreparedInbound::Draw(point, style) => {
                if self.surface.has_open_path(PathOwner::Remote) {
                    self.surface.line_to(PathOwner::Remote, point, &style);
                } else {
                    tracing::debug!("Remote draw without an open path, ignoring");
                }
            }
            PreparedInbound::Clear => {
                self.surface.clear();
                tracing::debug!("Remote clear applied");
            }
            PreparedInbound::Undo(frame) => {
                self.surface.apply(frame);
                tracing::debug!("Remote undo applied");
            }
            PreparedInbound::Redo(frame) => {
                self.surface.apply(frame);
                tracing::debug!("Remote redo applied");
            }
            PreparedInbound::Skip(kind) => {
                tracing::debug!("Remote {} without snapshot, ignoring", kind);
            }
        }
    }

    /// Decode and apply an inbound message.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::MalformedSnapshot`] if an undo/redo snapshot
    /// cannot be decoded. The surface is unchanged in that case.
    pub fn handle_inbound(&mut self, message: BoardMessage) -> SyncResult<()> {
        let kind = message.kind();
        match Self::prepare_inbound(message) {
            Ok(prepared) => {
                self.apply_inbound(prepared);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Ignoring remote {}: {}", kind, e);
                Err(e)
            }
        }
    }

    /// Parse and apply an inbound JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Protocol`] for frames that are not valid
    /// messages, or the error from [`handle_inbound`](Self::handle_inbound).
    pub fn handle_frame(&mut self, text: &str) -> SyncResult<()> {
        let message = BoardMessage::from_json(text).map_err(|e| {
            tracing::warn!("Ignoring undecodable frame: {}", e);
            SyncError::from(e)
        })?;
        self.handle_inbound(message)
    }

    /// Decode and apply a snapshot from local history on the calling thread.
    ///
    /// Unlike inbound snapshots, which [`prepare_inbound`](Self::prepare_inbound)
    /// can decode elsewhere, this must finish before any later local stroke
    /// lands, so undo/redo latency includes the decode.
    fn restore_local(&mut self, snapshot: &Snapshot, action: &str) {
        if let Err(e) = self.surface.restore(snapshot) {
            tracing::warn!("Local {} could not restore snapshot: {}", action, e);
        }
    }

    fn emit(&mut self, message: BoardMessage) {
        match self.channel.send(&message) {
            Ok(()) => tracing::trace!(kind = message.kind(), "Sent"),
            Err(e) => {
                self.dropped_messages += 1;
                tracing::debug!(kind = message.kind(), "Dropped outbound message: {}", e);
            }
        }
    }
}

fn decodable(image: Option<&Snapshot>) -> Option<&Snapshot> {
    image.filter(|snapshot| !snapshot.is_empty())
}
