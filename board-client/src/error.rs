//! Client error types.

use board_core::SyncError;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while connecting or driving a participant.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The relay URL is unusable.
    #[error("Invalid relay URL: {0}")]
    InvalidUrl(String),

    /// The WebSocket handshake failed.
    #[error("Failed to connect to relay: {0}")]
    Connect(String),

    /// The engine could not be created.
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// The participant has shut down.
    #[error("Participant is no longer running")]
    Closed,

    /// The participant task panicked or was cancelled.
    #[error("Participant task failed: {0}")]
    Task(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for ClientError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        ClientError::Connect(e.to_string())
    }
}
