//! Relay harness for client integration tests.
//!
//! Runs the real relay router on a random port.

use std::net::SocketAddr;

use board_client::ClientConfig;
use board_server::{AppState, RelayConfig, RelayState};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// A relay instance with control handles.
pub struct TestServer {
    addr: SocketAddr,
    relay: RelayState,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a relay on a random available port.
    ///
    /// # Panics
    ///
    /// Panics if no port is available or server fails to bind.
    pub async fn start() -> Self {
        let port = portpicker::pick_unused_port().expect("no available port");
        let addr = SocketAddr::from(([127, 0, 0, 1], port));
        let config = RelayConfig {
            bind: addr.ip(),
            port,
            ..RelayConfig::default()
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

    /// Client configuration pointing at this relay's `board_id`.
    pub fn client_config(&self, board_id: &str) -> ClientConfig {
        ClientConfig::new(&format!("ws://{}", self.addr))
            .expect("valid relay url")
            .with_board(board_id)
    }

    /// Get access to the relay state (for test assertions).
    #[allow(dead_code)]
    pub fn relay(&self) -> &RelayState {
        &self.relay
    }

    /// Gracefully shut down the server.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        let _ = tokio::time::timeout(tokio::time::Duration::from_secs(5), self.handle).await;
    }
}
