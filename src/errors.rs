use crate::services::storage_service::StorageError;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// A lightweight wrapper for general errors that keeps the message local.
///
/// The message is what the caller sees, so it must never carry backend
/// detail; that goes to the log instead.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Shortcut for 400 Bad Request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    /// A required field was absent or empty.
    pub fn missing_fields() -> Self {
        Self::bad_request("Missing fields")
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.message }));

        (self.status, body).into_response()
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidKey(reason) => {
                tracing::debug!(%reason, "rejected request identifiers");
                AppError::bad_request("Invalid fields")
            }
            StorageError::Backend { op, source } => {
                tracing::error!(operation = %op, error = %source, "storage backend call failed");
                AppError::internal(op.failure_message())
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(reason = %rejection.body_text(), "rejected request body");
        match rejection {
            // No JSON body at all reads as an empty object: nothing was supplied.
            JsonRejection::MissingJsonContentType(_) => AppError::missing_fields(),
            _ => AppError::bad_request("Invalid JSON body"),
        }
    }
}
