//! WebSocket fan-out relay.
//!
//! Every connection joins exactly one board. Each text or binary frame a peer
//! sends is forwarded verbatim to every other peer on the same board; the
//! relay never parses frames and keeps no history. A peer that joins late
//! sees only frames sent after it joined.
//!
//! Each peer gets its own bounded queue, filled in the order frames arrive at
//! the relay, so frames from one sender reach every receiver in the order
//! they were sent. A peer that stops reading until its queue is full is
//! evicted and disconnected; its view may then diverge.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use uuid::Uuid;

use crate::config::DEFAULT_PEER_QUEUE_FRAMES;
use crate::error::RelayError;
use crate::metrics::{
    dec_ws_connections, inc_ws_connections, record_dropped, record_relayed,
    record_validation_failure,
};
use crate::validation::validate_message_size;

/// Board joined by `/ws`.
pub const DEFAULT_BOARD: &str = "default";

type PeerSender = mpsc::Sender<Message>;

/// Board ID -> (peer ID -> outbound queue).
type BoardRegistry = Arc<RwLock<HashMap<String, HashMap<String, PeerSender>>>>;

/// A registered peer, handed to [`handle_relay_socket`].
#[derive(Debug)]
pub struct PeerSession {
    /// Board the peer joined.
    pub board_id: String,
    /// Relay-assigned peer ID.
    pub peer_id: String,
    /// Frames queued for this peer by the other peers on the board.
    pub outbound: mpsc::Receiver<Message>,
}

/// Shared registry of boards and their connected peers.
#[derive(Clone)]
pub struct RelayState {
    boards: BoardRegistry,
    queue_capacity: usize,
}

impl Default for RelayState {
    fn default() -> Self {
        Self::with_queue_capacity(DEFAULT_PEER_QUEUE_FRAMES)
    }
}

impl RelayState {
    /// Create an empty relay.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty relay that queues at most `capacity` frames per peer.
    #[must_use]
    pub fn with_queue_capacity(capacity: usize) -> Self {
        Self {
            boards: BoardRegistry::default(),
            queue_capacity: capacity.max(1),
        }
    }

    /// Register a new peer on `board_id`.
    ///
    /// The peer receives frames from the moment this returns.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::LockPoisoned`] if the registry is unusable.
    pub fn join(&self, board_id: &str) -> Result<PeerSession, RelayError> {
        let peer_id = Uuid::new_v4().to_string();
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        match self.boards.write() {
            Ok(mut boards) => {
                boards
                    .entry(board_id.to_string())
                    .or_default()
                    .insert(peer_id.clone(), tx);
            }
            Err(e) => {
                tracing::error!(
                    board_id = %board_id,
                    "Failed to register peer: lock poisoned ({})",
                    e
                );
                return Err(RelayError::LockPoisoned);
            }
        }
        tracing::info!("Registered peer {} on board {}", peer_id, board_id);
        Ok(PeerSession {
            board_id: board_id.to_string(),
            peer_id,
            outbound: rx,
        })
    }

    /// Remove a peer. Other peers on the board are unaffected.
    pub fn leave(&self, board_id: &str, peer_id: &str) {
        match self.boards.write() {
            Ok(mut boards) => {
                if let Some(peers) = boards.get_mut(board_id) {
                    peers.remove(peer_id);
                    if peers.is_empty() {
                        boards.remove(board_id);
                    }
                }
                tracing::info!("Unregistered peer {} from board {}", peer_id, board_id);
            }
            Err(e) => {
                tracing::error!(
                    peer_id = %peer_id,
                    "Failed to unregister peer: lock poisoned ({})",
                    e
                );
            }
        }
    }

    /// Queue `message` for every peer on `board_id` except `from`.
    ///
    /// Peers whose queue is full are evicted. Returns the number of peers the
    /// frame was queued for.
    pub fn fan_out(&self, board_id: &str, from: &str, message: &Message) -> usize {
        let mut stalled = Vec::new();
        let delivered = match self.boards.read() {
            Ok(boards) => boards.get(board_id).map_or(0, |peers| {
                let mut delivered = 0;
                for (peer_id, tx) in peers.iter().filter(|(id, _)| id.as_str() != from) {
                    match tx.try_send(message.clone()) {
                        Ok(()) => delivered += 1,
                        Err(TrySendError::Full(_)) => stalled.push(peer_id.clone()),
                        Err(TrySendError::Closed(_)) => {}
                    }
                }
                delivered
            }),
            Err(e) => {
                tracing::error!(
                    board_id = %board_id,
                    "Failed to fan out: lock poisoned ({})",
                    e
                );
                return 0;
            }
        };

        for peer_id in stalled {
            tracing::warn!(
                board_id = %board_id,
                "Evicting peer {}: outbound queue full",
                peer_id
            );
            record_dropped("queue_full");
            self.leave(board_id, &peer_id);
        }
        delivered
    }

    /// Total connected peers across all boards.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::LockPoisoned`] if the registry is unusable.
    pub fn peer_count(&self) -> Result<usize, RelayError> {
        self.boards
            .read()
            .map(|boards| boards.values().map(HashMap::len).sum())
            .map_err(|_| RelayError::LockPoisoned)
    }

    /// Number of boards with at least one peer.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::LockPoisoned`] if the registry is unusable.
    pub fn board_count(&self) -> Result<usize, RelayError> {
        self.boards
            .read()
            .map(|boards| boards.len())
            .map_err(|_| RelayError::LockPoisoned)
    }

    /// Peers currently on `board_id`.
    #[must_use]
    pub fn board_peer_count(&self, board_id: &str) -> usize {
        self.boards
            .read()
            .map(|boards| boards.get(board_id).map_or(0, HashMap::len))
            .unwrap_or(0)
    }
}

/// Drive one peer connection until either side closes it.
///
/// Ping frames are answered by the protocol layer; pong frames are ignored.
pub async fn handle_relay_socket(
    socket: WebSocket,
    session: PeerSession,
    state: RelayState,
    max_message_bytes: usize,
) {
    let PeerSession {
        board_id,
        peer_id,
        mut outbound,
    } = session;
    let (mut sender, mut receiver) = socket.split();
    inc_ws_connections();

    loop {
        tokio::select! {
            // Frames from this peer
            msg = receiver.next() => {
                match msg {
                    Some(Ok(message @ (Message::Text(_) | Message::Binary(_)))) => {
                        relay_frame(&state, &board_id, &peer_id, &message, max_message_bytes);
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("Peer {} disconnected", peer_id);
                        break;
                    }
                    Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
                    Some(Err(e)) => {
                        tracing::warn!("WebSocket error for peer {}: {}", peer_id, e);
                        break;
                    }
                    None => break,
                }
            }

            // Frames from the other peers on this board
            queued = outbound.recv() => {
                match queued {
                    Some(message) => {
                        if sender.send(message).await.is_err() {
                            tracing::debug!("Peer {} went away mid-send", peer_id);
                            break;
                        }
                    }
                    None => {
                        tracing::debug!("Peer {} queue closed", peer_id);
                        break;
                    }
                }
            }
        }
    }

    state.leave(&board_id, &peer_id);
    dec_ws_connections();
}

fn relay_frame(
    state: &RelayState,
    board_id: &str,
    peer_id: &str,
    message: &Message,
    max_message_bytes: usize,
) {
    let (kind, size) = match message {
        Message::Text(text) => ("text", text.as_str().len()),
        Message::Binary(bytes) => ("binary", bytes.len()),
        _ => return,
    };

    if let Err(e) = validate_message_size(size, max_message_bytes) {
        tracing::warn!("Dropped frame from peer {}: {}", peer_id, e);
        record_validation_failure("message_size");
        record_dropped("too_large");
        return;
    }

    let deliveries = state.fan_out(board_id, peer_id, message);
    tracing::debug!(
        board_id = %board_id,
        peer_id = %peer_id,
        kind,
        size,
        deliveries,
        "Relayed frame"
    );
    record_relayed(kind, deliveries);
}
