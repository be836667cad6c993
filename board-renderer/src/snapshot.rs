//! PNG data-URI snapshots.
//!
//! Snapshots use the same shape a browser canvas produces with
//! `toDataURL()`: `data:image/png;base64,<png bytes>`. Any image format the
//! `image` crate can decode is accepted on restore; capture always writes PNG.

use base64::Engine;
use board_core::{Snapshot, SnapshotError, SnapshotResult, SnapshotStore};
use image::{ImageEncoder, RgbaImage};

use crate::error::{RenderError, RenderResult};
use crate::RasterSurface;

/// Prefix of every captured snapshot.
pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Encode an RGBA buffer as PNG bytes.
///
/// # Errors
///
/// Returns an error if PNG encoding fails.
pub fn encode_png(pixels: &RgbaImage) -> RenderResult<Vec<u8>> {
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(
            pixels.as_raw(),
            pixels.width(),
            pixels.height(),
            image::ColorType::Rgba8.into(),
        )
        .map_err(|e| RenderError::Encode(format!("PNG encoding failed: {e}")))?;
    Ok(buf)
}

/// Encode an RGBA buffer as a PNG data URI.
///
/// # Errors
///
/// Returns an error if PNG encoding fails.
pub fn encode_data_uri(pixels: &RgbaImage) -> RenderResult<String> {
    let png = encode_png(pixels)?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(png);
    Ok(format!("{PNG_DATA_URI_PREFIX}{encoded}"))
}

/// Decode a base64 image data URI into an RGBA buffer.
///
/// # Errors
///
/// Returns an error if the URI is not a base64 data URI or the image cannot
/// be decoded.
pub fn decode_data_uri(uri: &str) -> RenderResult<RgbaImage> {
    let uri_data = uri
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| RenderError::Resource("Not a data URI".to_string()))?;

    let comma_pos = uri_data
        .find(',')
        .ok_or_else(|| RenderError::Resource("Invalid data URI: missing comma".to_string()))?;

    let metadata = &uri_data[..comma_pos];
    let encoded_data = &uri_data[comma_pos + 1..];

    if !metadata.ends_with(";base64") {
        return Err(RenderError::Resource(
            "Invalid data URI: only base64 payloads are supported".to_string(),
        ));
    }
    if encoded_data.is_empty() {
        return Err(RenderError::Resource("Invalid data URI: empty payload".to_string()));
    }

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded_data)
        .map_err(|e| RenderError::Resource(format!("Failed to decode base64: {e}")))?;

    let img = image::load_from_memory(&bytes)
        .map_err(|e| RenderError::Resource(format!("Failed to decode image: {e}")))?;

    Ok(img.to_rgba8())
}

impl SnapshotStore for RasterSurface {
    type Frame = RgbaImage;

    fn capture(&self) -> SnapshotResult<Snapshot> {
        encode_data_uri(self.pixels())
            .map(Snapshot::from)
            .map_err(|e| SnapshotError::Encode(e.to_string()))
    }

    fn decode(snapshot: &Snapshot) -> SnapshotResult<RgbaImage> {
        if snapshot.is_empty() {
            return Err(SnapshotError::Malformed("empty snapshot".to_string()));
        }
        decode_data_uri(snapshot.as_str()).map_err(|e| SnapshotError::Malformed(e.to_string()))
    }

    fn apply(&mut self, frame: RgbaImage) {
        self.replace_with(&frame);
    }
}
