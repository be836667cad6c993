//! Client configuration.

use url::Url;

use crate::error::{ClientError, ClientResult};

/// Relay used when `BOARD_RELAY_URL` is unset.
pub const DEFAULT_RELAY_URL: &str = "ws://127.0.0.1:5000";

/// Where a participant connects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the relay (`ws://` or `wss://`).
    pub relay_url: Url,
    /// Board to join; `None` joins the relay's default board.
    pub board_id: Option<String>,
}

impl ClientConfig {
    /// Create a configuration for the relay at `relay_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] if the URL does not parse or is
    /// not a WebSocket URL.
    pub fn new(relay_url: &str) -> ClientResult<Self> {
        let relay_url =
            Url::parse(relay_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        if !matches!(relay_url.scheme(), "ws" | "wss") {
            return Err(ClientError::InvalidUrl(format!(
                "unsupported scheme {:?} (expected ws or wss)",
                relay_url.scheme()
            )));
        }
        if relay_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(relay_url.to_string()));
        }
        Ok(Self {
            relay_url,
            board_id: None,
        })
    }

    /// Join `board_id` instead of the default board.
    #[must_use]
    pub fn with_board(mut self, board_id: impl Into<String>) -> Self {
        self.board_id = Some(board_id.into());
        self
    }

    /// Read `BOARD_RELAY_URL` and `BOARD_ID`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] if `BOARD_RELAY_URL` is set to an
    /// invalid URL.
    pub fn from_env() -> ClientResult<Self> {
        let url = std::env::var("BOARD_RELAY_URL").unwrap_or_else(|_| DEFAULT_RELAY_URL.into());
        let config = Self::new(&url)?;
        Ok(match std::env::var("BOARD_ID") {
            Ok(board) if !board.trim().is_empty() => config.with_board(board.trim()),
            _ => config,
        })
    }

    /// The WebSocket endpoint for the configured board.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] if the relay URL cannot carry a
    /// path.
    pub fn ws_url(&self) -> ClientResult<Url> {
        let mut url = self.relay_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| ClientError::InvalidUrl(self.relay_url.to_string()))?;
            segments.pop_if_empty().push("ws");
            if let Some(board) = &self.board_id {
                segments.push(board);
            }
        }
        Ok(url)
    }
}
