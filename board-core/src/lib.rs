//! # Sketchboard Core
//!
//! Collaborative synchronization engine for a shared drawing surface.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 board-core                  │
//! ├─────────────────────────────────────────────┤
//! │  Stroke Session  │  History Manager         │
//! │  - Idle/Drawing  │  - Undo stack            │
//! │  - Press guard   │  - Redo stack            │
//! ├─────────────────────────────────────────────┤
//! │  Sync Engine     │  Seams                   │
//! │  - Outbound      │  - Surface               │
//! │  - Inbound       │  - SnapshotStore         │
//! │                  │  - SyncChannel           │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Each participant owns one [`SyncEngine`]. Local actions mutate the local
//! surface first and are then broadcast as [`BoardMessage`]s; inbound
//! messages mutate the surface without touching the local [`History`].
//! Undo and redo are propagated as the resulting [`Snapshot`], not as the
//! operation, so receivers converge without a shared history.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod channel;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod history;
pub mod message;
pub mod snapshot;
pub mod stroke;
pub mod style;
pub mod surface;

pub use channel::{ChannelError, MemoryChannel, SyncChannel};
pub use engine::{PreparedInbound, SyncEngine};
pub use error::{SyncError, SyncResult};
pub use geometry::Point;
pub use history::History;
pub use message::BoardMessage;
pub use snapshot::{Snapshot, SnapshotError, SnapshotResult};
pub use stroke::{StrokeEvent, StrokePhase, StrokeSession};
pub use style::{Color, ColorParseError, StrokeStyle};
pub use surface::{PathOwner, SnapshotStore, Surface};

/// Board core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
