//! Event loop for one participant.
//!
//! A [`Participant`] owns a [`SyncEngine`] on a dedicated task and feeds it
//! from two sources:
//!
//! ```text
//!   caller ──Action──────────────────────────────┐
//!                                                ▼
//!   relay ──frames──► inbound task ──Prepared──► engine task ──► WsChannel ──► relay
//!                     (parse, decode
//!                      snapshots off-thread)
//! ```
//!
//! The inbound task handles frames strictly in arrival order and decodes
//! snapshot payloads on the blocking pool, so a large restore never stalls
//! local drawing. The engine task only ever swaps in fully decoded frames.

use board_core::{
    BoardMessage, Point, PreparedInbound, SnapshotStore, StrokeStyle, Surface, SyncEngine,
};
use futures::StreamExt;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

use crate::channel::{InboundFrames, WsChannel};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// A local user action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Press at a point.
    Begin(Point),
    /// Move to a point with the current tool style.
    Extend(Point, StrokeStyle),
    /// Release.
    End,
    /// Clear the board.
    Clear,
    /// Undo the last local change.
    Undo,
    /// Redo the last undone change.
    Redo,
}

type Inspect<S> = Box<dyn FnOnce(&SyncEngine<S, WsChannel>) + Send>;

enum Command<S> {
    Act(Action),
    Inspect(Inspect<S>),
}

/// A running participant connected to a relay.
///
/// Dropping the handle without [`shutdown`](Self::shutdown) lets the engine
/// task finish the queued actions and close the connection on its own.
pub struct Participant<S>
where
    S: Surface + SnapshotStore + Send + 'static,
{
    commands: mpsc::UnboundedSender<Command<S>>,
    engine_task: JoinHandle<SyncEngine<S, WsChannel>>,
    inbound_task: JoinHandle<()>,
}

impl<S> Participant<S>
where
    S: Surface + SnapshotStore + Send + 'static,
{
    /// Connect to the relay in `config` and start drawing on `surface`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Connect`] if the relay is unreachable, or
    /// [`ClientError::Sync`] if the surface cannot be captured.
    pub async fn connect(surface: S, config: &ClientConfig) -> ClientResult<Self> {
        let url = config.ws_url()?;
        let (channel, frames) = WsChannel::connect(&url).await?;
        let engine = SyncEngine::new(surface, channel)?;
        Ok(Self::start(engine, frames))
    }

    fn start(engine: SyncEngine<S, WsChannel>, frames: InboundFrames) -> Self {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (prepared_tx, prepared_rx) = mpsc::unbounded_channel();

        let inbound_task = tokio::spawn(inbound_loop::<S>(frames, prepared_tx));
        let engine_task = tokio::spawn(engine_loop(engine, commands_rx, prepared_rx));

        Self {
            commands: commands_tx,
            engine_task,
            inbound_task,
        }
    }

    /// Queue a local action.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Closed`] if the participant has stopped.
    pub fn act(&self, action: Action) -> ClientResult<()> {
        self.commands
            .send(Command::Act(action))
            .map_err(|_| ClientError::Closed)
    }

    /// Press at `point`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Closed`] if the participant has stopped.
    pub fn begin_stroke(&self, point: Point) -> ClientResult<()> {
        self.act(Action::Begin(point))
    }

    /// Move to `point` with `style`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Closed`] if the participant has stopped.
    pub fn extend_stroke(&self, point: Point, style: StrokeStyle) -> ClientResult<()> {
        self.act(Action::Extend(point, style))
    }

    /// Release.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Closed`] if the participant has stopped.
    pub fn end_stroke(&self) -> ClientResult<()> {
        self.act(Action::End)
    }

    /// Clear the board.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Closed`] if the participant has stopped.
    pub fn clear(&self) -> ClientResult<()> {
        self.act(Action::Clear)
    }

    /// Undo.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Closed`] if the participant has stopped.
    pub fn undo(&self) -> ClientResult<()> {
        self.act(Action::Undo)
    }

    /// Redo.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Closed`] if the participant has stopped.
    pub fn redo(&self) -> ClientResult<()> {
        self.act(Action::Redo)
    }

    /// Run `f` against the engine once every action queued before this call
    /// has been applied.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Closed`] if the participant has stopped.
    pub async fn inspect<R, F>(&self, f: F) -> ClientResult<R>
    where
        F: FnOnce(&SyncEngine<S, WsChannel>) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(Command::Inspect(Box::new(move |engine| {
                let _ = tx.send(f(engine));
            })))
            .map_err(|_| ClientError::Closed)?;
        rx.await.map_err(|_| ClientError::Closed)
    }

    /// Stop the participant, close its connection and hand back the engine.
    ///
    /// Actions queued before this call are applied first.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Task`] if the engine task panicked.
    pub async fn shutdown(self) -> ClientResult<SyncEngine<S, WsChannel>> {
        let Self {
            commands,
            engine_task,
            inbound_task,
        } = self;
        drop(commands);
        inbound_task.abort();
        engine_task
            .await
            .map_err(|e| ClientError::Task(e.to_string()))
    }
}

async fn engine_loop<S>(
    mut engine: SyncEngine<S, WsChannel>,
    mut commands: mpsc::UnboundedReceiver<Command<S>>,
    mut prepared: mpsc::UnboundedReceiver<PreparedInbound<S::Frame>>,
) -> SyncEngine<S, WsChannel>
where
    S: Surface + SnapshotStore + Send + 'static,
{
    let mut relay_open = true;

    loop {
        tokio::select! {
            command = commands.recv() => {
                match command {
                    Some(Command::Act(action)) => apply_action(&mut engine, action),
                    Some(Command::Inspect(f)) => f(&engine),
                    None => break,
                }
            }

            inbound = prepared.recv(), if relay_open => {
                match inbound {
                    Some(inbound) => engine.apply_inbound(inbound),
                    None => {
                        tracing::info!("Relay connection ended; drawing continues locally");
                        relay_open = false;
                    }
                }
            }
        }
    }

    engine.close_channel();
    engine
}

fn apply_action<S>(engine: &mut SyncEngine<S, WsChannel>, action: Action)
where
    S: Surface + SnapshotStore,
{
    match action {
        Action::Begin(point) => engine.begin_stroke(point),
        Action::Extend(point, style) => {
            engine.extend_stroke(point, style);
        }
        Action::End => {
            engine.end_stroke();
        }
        Action::Clear => engine.clear(),
        Action::Undo => {
            engine.undo();
        }
        Action::Redo => {
            engine.redo();
        }
    }
}

/// Read frames in order, decode them and forward them to the engine task.
async fn inbound_loop<S>(
    mut frames: InboundFrames,
    prepared: mpsc::UnboundedSender<PreparedInbound<S::Frame>>,
) where
    S: Surface + SnapshotStore + Send + 'static,
{
    while let Some(result) = frames.next().await {
        let text = match result {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => {
                tracing::info!("Relay closed the connection");
                break;
            }
            Ok(Message::Binary(data)) => {
                tracing::debug!(bytes = data.len(), "Ignoring binary frame");
                continue;
            }
            Ok(_) => continue,
            Err(e) => {
                tracing::warn!("Relay read failed: {}", e);
                break;
            }
        };

        let message = match BoardMessage::from_json(&text) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("Ignoring undecodable frame: {}", e);
                continue;
            }
        };

        let Some(ready) = prepare::<S>(message).await else {
            continue;
        };

        if prepared.send(ready).is_err() {
            // Participant is gone; drop whatever was in flight.
            break;
        }
    }
}

async fn prepare<S>(message: BoardMessage) -> Option<PreparedInbound<S::Frame>>
where
    S: Surface + SnapshotStore + Send + 'static,
{
    let kind = message.kind();
    let carries_snapshot = matches!(
        message,
        BoardMessage::Undo { image: Some(_) } | BoardMessage::Redo { image: Some(_) }
    );

    let result = if carries_snapshot {
        match tokio::task::spawn_blocking(move || {
            SyncEngine::<S, WsChannel>::prepare_inbound(message)
        })
        .await
        {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Snapshot decode task failed: {}", e);
                return None;
            }
        }
    } else {
        SyncEngine::<S, WsChannel>::prepare_inbound(message)
    };

    match result {
        Ok(ready) => Some(ready),
        Err(e) => {
            tracing::warn!("Ignoring remote {}: {}", kind, e);
            None
        }
    }
}
