//! # Sketchboard Client
//!
//! Connects a drawing surface to a relay.
//!
//! - [`WsChannel`] is the WebSocket [`SyncChannel`](board_core::SyncChannel)
//!   with an explicit open/close lifecycle.
//! - [`Participant`] runs a [`SyncEngine`](board_core::SyncEngine) on its own
//!   task, taking local [`Action`]s and inbound relay frames in one loop.
//!
//! ```no_run
//! # async fn demo() -> Result<(), board_client::ClientError> {
//! use board_client::{ClientConfig, Participant};
//! use board_core::{Color, Point, StrokeStyle};
//! use board_renderer::RasterSurface;
//!
//! let config = ClientConfig::from_env()?;
//! let participant = Participant::connect(RasterSurface::new(800, 600), &config).await?;
//!
//! let pen = StrokeStyle::new(Color::rgb(255, 0, 0), 5.0);
//! participant.begin_stroke(Point::new(10.0, 10.0))?;
//! participant.extend_stroke(Point::new(60.0, 40.0), pen)?;
//! participant.end_stroke()?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod channel;
pub mod config;
pub mod error;
pub mod participant;

pub use channel::{InboundFrames, WsChannel};
pub use config::{ClientConfig, DEFAULT_RELAY_URL};
pub use error::{ClientError, ClientResult};
pub use participant::{Action, Participant};
