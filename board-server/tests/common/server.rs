//! Test server harness for integration tests.
//!
//! Spins up the real relay router on a random port for WebSocket and HTTP
//! clients.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use board_server::{AppState, RelayConfig, RelayState};

/// A test server instance with control handles.
pub struct TestServer {
    addr: SocketAddr,
    relay: RelayState,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a relay with default limits on a random available port.
    ///
    /// # Panics
    ///
    /// Panics if no port is available or server fails to bind.
    pub async fn start() -> Self {
        Self::start_with(RelayConfig::default()).await
    }

    /// Start a relay with `config`; its bind address and port are replaced.
    ///
    /// # Panics
    ///
    /// Panics if no port is available or server fails to bind.
    pub async fn start_with(config: RelayConfig) -> Self {
        let port = portpicker::pick_unused_port().expect("no available port");
        let addr = SocketAddr::from(([127, 0, 0, 1], port));
        let config = RelayConfig {
            bind: addr.ip(),
            port,
            ..config
        };

        let relay = RelayState::with_queue_capacity(config.peer_queue_frames);
        let app = board_server::router(AppState::new(relay.clone(), config));

        let listener = TcpListener::bind(addr).await.expect("failed to bind");
        let actual_addr = listener.local_addr().expect("failed to get local addr");

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("server error");
        });

        // Give the server a moment to start
        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;

        Self {
            addr: actual_addr,
            relay,
            shutdown_tx: Some(shutdown_tx),
            handle,
        }
    }

    /// Get the server's socket address.
    #[allow(dead_code)]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// WebSocket URL of the default board.
    #[allow(dead_code)]
    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    /// WebSocket URL of a named board.
    #[allow(dead_code)]
    pub fn board_url(&self, board_id: &str) -> String {
        format!("ws://{}/ws/{}", self.addr, board_id)
    }

    /// Get access to the relay state (for test assertions).
    #[allow(dead_code)]
    pub fn relay(&self) -> &RelayState {
        &self.relay
    }

    /// Gracefully shut down the server.
    #[allow(dead_code)]
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        let _ = tokio::time::timeout(tokio::time::Duration::from_secs(5), self.handle).await;
    }
}
