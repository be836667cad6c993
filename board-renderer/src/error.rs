//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while encoding or exporting a surface.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Image encoding failed.
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// Input data could not be decoded.
    #[error("Failed to decode resource: {0}")]
    Resource(String),
}
