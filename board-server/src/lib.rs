//! # Sketchboard Relay Library
//!
//! The WebSocket relay that connects drawing participants. It is a pure
//! fan-out broadcaster: it holds no board state and never interprets the
//! frames it forwards. This library is used by both the `board-relay`
//! binary and integration tests.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use std::sync::Arc;

use axum::{
    extract::{ws::WebSocketUpgrade, Path, State},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

pub mod config;
pub mod error;
pub mod health;
pub mod metrics;
pub mod relay;
pub mod validation;

pub use config::RelayConfig;
pub use error::RelayError;
pub use relay::{handle_relay_socket, RelayState, DEFAULT_BOARD};

use validation::validate_board_id;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Board and peer registry.
    pub relay: RelayState,
    /// Relay configuration.
    pub config: Arc<RelayConfig>,
}

impl AppState {
    /// Create application state.
    #[must_use]
    pub fn new(relay: RelayState, config: RelayConfig) -> Self {
        Self {
            relay,
            config: Arc::new(config),
        }
    }

    /// Get a reference to the relay state.
    #[must_use]
    pub fn relay(&self) -> &RelayState {
        &self.relay
    }
}

/// Relay and health routes.
///
/// The binary layers metrics, CORS, tracing and request IDs on top.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/health", get(health::readiness))
        .route("/ws", get(default_board_handler))
        .route("/ws/{board_id}", get(board_handler))
        .with_state(state)
}

/// Join the default board.
#[tracing::instrument(name = "relay_connect", skip(ws, state))]
async fn default_board_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> Result<Response, RelayError> {
    upgrade(ws, &state, DEFAULT_BOARD)
}

/// Join a named board.
#[tracing::instrument(name = "relay_connect_board", skip(ws, state))]
async fn board_handler(
    ws: WebSocketUpgrade,
    Path(board_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, RelayError> {
    validate_board_id(&board_id).inspect_err(|e| {
        tracing::warn!("Rejected board id {:?}: {}", board_id, e);
        metrics::record_validation_failure("board_id");
    })?;
    upgrade(ws, &state, &board_id)
}

/// Register the peer before answering the upgrade, so it receives every
/// frame sent after its handshake completes.
fn upgrade(ws: WebSocketUpgrade, state: &AppState, board_id: &str) -> Result<Response, RelayError> {
    let session = state.relay.join(board_id)?;
    tracing::info!("WebSocket connection upgrade requested");

    let relay = state.relay.clone();
    let failed = state.relay.clone();
    let failed_board = session.board_id.clone();
    let failed_peer = session.peer_id.clone();
    let limit = state.config.protocol_limit();
    let max_message_bytes = state.config.max_message_bytes;

    Ok(ws
        .max_message_size(limit)
        .max_frame_size(limit)
        .on_failed_upgrade(move |e| {
            tracing::warn!("WebSocket upgrade failed for peer {}: {}", failed_peer, e);
            failed.leave(&failed_board, &failed_peer);
        })
        .on_upgrade(move |socket| handle_relay_socket(socket, session, relay, max_message_bytes))
        .into_response())
}
