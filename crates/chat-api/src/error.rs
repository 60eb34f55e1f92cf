//! Error types for the chat API.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use matchmaker::MatchmakerError;
use thiserror::Error;

/// Errors returned by API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Error from the matchmaking core.
    #[error(transparent)]
    Matchmaker(#[from] MatchmakerError),

    /// Body was missing, not JSON, or did not fit the payload.
    #[error(transparent)]
    JsonBody(#[from] JsonRejection),

    /// Query string did not fit the expected parameters.
    #[error(transparent)]
    Query(#[from] QueryRejection),
}

impl ApiError {
    /// HTTP status and client-facing message for this error.
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::Matchmaker(err) => match err {
                MatchmakerError::Validation(inner) => (StatusCode::BAD_REQUEST, inner.to_string()),
                MatchmakerError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
                MatchmakerError::Conflict(_) => (StatusCode::CONFLICT, err.to_string()),
                // Storage details stay in the logs.
                MatchmakerError::Internal(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
                }
            },
            ApiError::JsonBody(rejection) => (StatusCode::BAD_REQUEST, rejection.body_text()),
            ApiError::Query(rejection) => (StatusCode::BAD_REQUEST, rejection.body_text()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!(status = %status, "Request rejected: {}", message);
        }

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
