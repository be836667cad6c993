//! # Sketchboard Renderer
//!
//! A CPU raster implementation of the board-core surface seams.
//!
//! - [`RasterSurface`] keeps the visible content as an RGBA buffer and
//!   strokes segments with round caps as they arrive.
//! - Snapshots are lossless PNG images carried as
//!   `data:image/png;base64,...` URIs, so a restored snapshot is pixel
//!   identical to the captured surface.
//! - [`export`] flattens the surface over a background for saving.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod export;
pub mod raster;
pub mod snapshot;

pub use error::{RenderError, RenderResult};
pub use export::{export_data_uri, export_png, flatten, ExportConfig};
pub use raster::RasterSurface;
pub use snapshot::{decode_data_uri, encode_data_uri, encode_png, PNG_DATA_URI_PREFIX};

/// Renderer version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
