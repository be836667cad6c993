//! Error types for engine operations.

use thiserror::Error;

use crate::{ChannelError, SnapshotError};

/// Result type for engine operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while synchronizing a surface.
///
/// None of these end a session: the engine logs them and carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// A snapshot could not be decoded; the surface was left unchanged.
    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),

    /// A send was attempted without an active connection; the message was
    /// dropped.
    #[error("Channel unavailable: {0}")]
    ChannelUnavailable(String),

    /// An inbound frame was not a valid message.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The local surface could not be captured.
    #[error("Capture failed: {0}")]
    Capture(String),
}

impl From<SnapshotError> for SyncError {
    fn from(e: SnapshotError) -> Self {
        match e {
            SnapshotError::Malformed(s) => SyncError::MalformedSnapshot(s),
            SnapshotError::Encode(s) => SyncError::Capture(s),
        }
    }
}

impl From<ChannelError> for SyncError {
    fn from(e: ChannelError) -> Self {
        match e {
            ChannelError::Unavailable(s) | ChannelError::Encode(s) => {
                SyncError::ChannelUnavailable(s)
            }
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(e: serde_json::Error) -> Self {
        SyncError::Protocol(e.to_string())
    }
}
