//! Error types for request handling.
//!
//! Every failure a handler can produce maps to exactly one HTTP status
//! and a `{"error": <message>}` JSON body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

/// Error raised while serving a request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed query, body, or path input. Maps to 400.
    #[error("{0}")]
    Validation(String),

    /// No task with the requested id. Maps to 404.
    #[error("task not found")]
    NotFound,

    /// Storage or other internal failure. Maps to 500; the underlying
    /// error is logged, not sent to the client.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "task not found".to_string()),
            ApiError::Internal(err) => {
                tracing::error!(error = %err, "Request failed with internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type for request handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
