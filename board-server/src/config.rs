//! Relay configuration from command-line flags and environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clap::Parser;

/// Default relay port.
pub const DEFAULT_PORT: u16 = 5000;

/// Default largest frame the relay forwards (16 MiB).
///
/// Undo/redo frames carry a whole-surface PNG, so this has to be generous.
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 16 * 1024 * 1024;

/// Default number of frames queued for one peer before it is evicted.
pub const DEFAULT_PEER_QUEUE_FRAMES: usize = 1024;

/// Relay configuration.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "board-relay", version, about = "Sketchboard WebSocket relay")]
pub struct RelayConfig {
    /// Address to bind to.
    #[arg(long, env = "BOARD_BIND", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub bind: IpAddr,

    /// Port to listen on.
    #[arg(long, env = "BOARD_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Frames larger than this many bytes are dropped instead of relayed.
    #[arg(long, env = "BOARD_MAX_MESSAGE_BYTES", default_value_t = DEFAULT_MAX_MESSAGE_BYTES)]
    pub max_message_bytes: usize,

    /// Frames queued for a peer that is not reading. A peer whose queue
    /// fills up is disconnected.
    #[arg(long, env = "BOARD_PEER_QUEUE_FRAMES", default_value_t = DEFAULT_PEER_QUEUE_FRAMES)]
    pub peer_queue_frames: usize,
}

impl RelayConfig {
    /// The socket address to listen on.
    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    /// Hard limit handed to the WebSocket protocol layer.
    ///
    /// Frames between `max_message_bytes` and this limit are read and
    /// dropped by the relay; anything larger ends the connection.
    #[must_use]
    pub fn protocol_limit(&self) -> usize {
        self.max_message_bytes.saturating_mul(2)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
            peer_queue_frames: DEFAULT_PEER_QUEUE_FRAMES,
        }
    }
}
