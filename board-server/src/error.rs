//! Relay error types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::validation::ValidationError;

/// Errors that can occur while accepting or relaying connections.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The peer registry lock was poisoned.
    #[error("Internal lock error")]
    LockPoisoned,
    /// Rejected client input.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl RelayError {
    fn status(&self) -> StatusCode {
        match self {
            Self::LockPoisoned => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Invalid(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let invalid = RelayError::from(ValidationError::BoardIdInvalidChars);
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        assert_eq!(invalid.to_string(), "board_id contains invalid characters");
        assert_eq!(
            RelayError::LockPoisoned.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
