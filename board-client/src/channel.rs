//! WebSocket implementation of [`SyncChannel`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use board_core::{BoardMessage, ChannelError, SyncChannel};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use url::Url;

use crate::error::ClientResult;

/// A WebSocket connection to the relay.
pub type RelayStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Frames arriving from the relay.
pub type InboundFrames = SplitStream<RelayStream>;

/// Sending half of a relay connection.
///
/// Sends are queued to a writer task and never block. Clones share one
/// connection; closing any clone closes it for all of them.
#[derive(Debug, Clone, Default)]
pub struct WsChannel {
    outbound: Arc<Mutex<Option<mpsc::UnboundedSender<Message>>>>,
}

impl WsChannel {
    /// Open a connection to `url`.
    ///
    /// Returns the channel and the stream of inbound frames, which the
    /// caller is expected to drain.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Connect`](crate::ClientError::Connect) if the
    /// handshake fails.
    pub async fn connect(url: &Url) -> ClientResult<(Self, InboundFrames)> {
        let (ws, _) = connect_async(url.as_str()).await?;
        let (sink, stream) = ws.split();

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(write_loop(sink, rx));

        tracing::info!("Connected to relay at {}", url);
        Ok((
            Self {
                outbound: Arc::new(Mutex::new(Some(tx))),
            },
            stream,
        ))
    }

    /// A channel with no connection. Every send fails with
    /// [`ChannelError::Unavailable`].
    #[must_use]
    pub fn disconnected() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<mpsc::UnboundedSender<Message>>> {
        self.outbound.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SyncChannel for WsChannel {
    fn send(&self, message: &BoardMessage) -> Result<(), ChannelError> {
        let guard = self.lock();
        let Some(tx) = guard.as_ref() else {
            return Err(ChannelError::Unavailable("not connected".to_string()));
        };
        let json = message
            .to_json()
            .map_err(|e| ChannelError::Encode(e.to_string()))?;
        tx.send(Message::Text(json))
            .map_err(|_| ChannelError::Unavailable("relay connection closed".to_string()))
    }

    fn is_open(&self) -> bool {
        self.lock().as_ref().is_some_and(|tx| !tx.is_closed())
    }

    fn close(&self) {
        // Dropping the sender lets the writer flush what is queued, then
        // send a close frame.
        if self.lock().take().is_some() {
            tracing::debug!("Relay channel closing");
        }
    }
}

async fn write_loop(
    mut sink: SplitSink<RelayStream, Message>,
    mut rx: mpsc::UnboundedReceiver<Message>,
) {
    while let Some(message) = rx.recv().await {
        if let Err(e) = sink.send(message).await {
            tracing::warn!("Relay write failed, dropping connection: {}", e);
            return;
        }
    }
    if let Err(e) = sink.close().await {
        tracing::debug!("Relay close failed: {}", e);
    }
}
