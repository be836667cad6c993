//! Flattened export of a board for saving.
//!
//! The live surface has a transparent background. Exports composite it over
//! an opaque background first, so a saved image looks the way the board did
//! on screen.

use base64::Engine;
use board_core::Color;
use image::{Rgba, RgbaImage};

use crate::error::RenderResult;
use crate::snapshot::{encode_png, PNG_DATA_URI_PREFIX};
use crate::RasterSurface;

/// Configuration for board export.
#[derive(Debug, Clone, Copy)]
pub struct ExportConfig {
    /// Opaque color painted under the strokes.
    pub background: Color,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            background: Color::WHITE,
        }
    }
}

/// Composite the surface over the configured background.
#[must_use]
pub fn flatten(surface: &RasterSurface, config: &ExportConfig) -> RgbaImage {
    let mut out = RgbaImage::from_pixel(
        surface.width(),
        surface.height(),
        Rgba(config.background.to_rgba()),
    );
    image::imageops::overlay(&mut out, surface.pixels(), 0, 0);
    out
}

/// Export the surface to PNG bytes.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn export_png(surface: &RasterSurface, config: &ExportConfig) -> RenderResult<Vec<u8>> {
    encode_png(&flatten(surface, config))
}

/// Export the surface as a flattened PNG data URI, ready for a download link.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn export_data_uri(surface: &RasterSurface, config: &ExportConfig) -> RenderResult<String> {
    let png = export_png(surface, config)?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(png);
    Ok(format!("{PNG_DATA_URI_PREFIX}{encoded}"))
}
