//! Input validation for untrusted data.
//!
//! The relay never looks inside frames. The only client-controlled input it
//! acts on is the board ID in the URL and the size of each frame.

use thiserror::Error;

/// Maximum length for board IDs.
pub const MAX_BOARD_ID_LEN: usize = 64;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Board ID exceeds maximum length.
    #[error("board_id too long (max {MAX_BOARD_ID_LEN} chars)")]
    BoardIdTooLong,
    /// Board ID is empty or contains invalid characters.
    #[error("board_id contains invalid characters")]
    BoardIdInvalidChars,
    /// Frame exceeds the configured maximum.
    #[error("message too large ({size} bytes, max {max})")]
    MessageTooLarge {
        /// Size of the rejected frame.
        size: usize,
        /// Configured maximum.
        max: usize,
    },
}

/// Check if a character is valid for IDs (alphanumeric, hyphen, or underscore).
fn is_valid_id_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

/// Validate a board ID.
///
/// Valid board IDs:
/// - 1-64 characters
/// - Alphanumeric, hyphen, underscore only
///
/// # Errors
///
/// Returns [`ValidationError::BoardIdTooLong`] if the ID exceeds 64 characters.
/// Returns [`ValidationError::BoardIdInvalidChars`] if the ID is empty or contains invalid characters.
pub fn validate_board_id(id: &str) -> Result<(), ValidationError> {
    if id.len() > MAX_BOARD_ID_LEN {
        return Err(ValidationError::BoardIdTooLong);
    }
    if id.is_empty() || !id.chars().all(is_valid_id_char) {
        return Err(ValidationError::BoardIdInvalidChars);
    }
    Ok(())
}

/// Validate a frame size against the configured maximum.
///
/// # Errors
///
/// Returns [`ValidationError::MessageTooLarge`] if `size` exceeds `max`.
pub fn validate_message_size(size: usize, max: usize) -> Result<(), ValidationError> {
    if size > max {
        return Err(ValidationError::MessageTooLarge { size, max });
    }
    Ok(())
}
