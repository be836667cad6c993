//! Outbound transport to the relay.
//!
//! The engine owns a [`SyncChannel`] handle explicitly instead of reaching
//! for a process-wide socket, so several independent participants can live
//! in one process. Sends are fire-and-forget: a message that cannot be sent
//! is dropped, never queued or retried.

use std::sync::{Arc, Mutex, PoisonError};

use crate::BoardMessage;

/// Errors returned by a channel send.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    /// No active connection to the relay.
    #[error("Channel unavailable: {0}")]
    Unavailable(String),
    /// The message could not be encoded for the wire.
    #[error("Failed to encode message: {0}")]
    Encode(String),
}

/// A bidirectional link to the relay, seen from the sending side.
///
/// Implementations must deliver messages from one sender in the order they
/// were sent. Inbound messages are delivered by the transport's own reader
/// and handed to [`SyncEngine::handle_inbound`](crate::SyncEngine::handle_inbound).
pub trait SyncChannel {
    /// Send one message without waiting for delivery.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Unavailable`] when the channel is closed.
    fn send(&self, message: &BoardMessage) -> Result<(), ChannelError>;

    /// Whether the channel currently has an active connection.
    fn is_open(&self) -> bool;

    /// Close the channel. Later sends fail with
    /// [`ChannelError::Unavailable`].
    fn close(&self);
}

impl<C: SyncChannel + ?Sized> SyncChannel for Arc<C> {
    fn send(&self, message: &BoardMessage) -> Result<(), ChannelError> {
        (**self).send(message)
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn close(&self) {
        (**self).close();
    }
}

impl<C: SyncChannel + ?Sized> SyncChannel for Box<C> {
    fn send(&self, message: &BoardMessage) -> Result<(), ChannelError> {
        (**self).send(message)
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn close(&self) {
        (**self).close();
    }
}

#[derive(Debug, Default)]
struct MemoryChannelInner {
    open: bool,
    sent: Vec<BoardMessage>,
}

/// In-process channel that records every sent message.
///
/// Clones share the same record, so a test can keep one clone for
/// assertions while the engine owns another.
#[derive(Debug, Clone)]
pub struct MemoryChannel {
    inner: Arc<Mutex<MemoryChannelInner>>,
}

impl MemoryChannel {
    /// Create an open channel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryChannelInner {
                open: true,
                sent: Vec::new(),
            })),
        }
    }

    /// Create a channel that starts closed.
    #[must_use]
    pub fn closed() -> Self {
        let channel = Self::new();
        channel.close();
        channel
    }

    /// Re-open a closed channel.
    pub fn open(&self) {
        self.lock().open = true;
    }

    /// Messages sent so far, oldest first.
    #[must_use]
    pub fn sent(&self) -> Vec<BoardMessage> {
        self.lock().sent.clone()
    }

    /// Remove and return the messages sent so far.
    #[must_use]
    pub fn take_sent(&self) -> Vec<BoardMessage> {
        std::mem::take(&mut self.lock().sent)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryChannelInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncChannel for MemoryChannel {
    fn send(&self, message: &BoardMessage) -> Result<(), ChannelError> {
        let mut inner = self.lock();
        if !inner.open {
            return Err(ChannelError::Unavailable("memory channel closed".into()));
        }
        inner.sent.push(message.clone());
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.lock().open
    }

    fn close(&self) {
        self.lock().open = false;
    }
}
