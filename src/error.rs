//! # error
//!
//! Application error type for HTTP handlers.
//!
//! Every handler returns `Result<_, AppError>`; the `IntoResponse` impl turns
//! it into `{"ok": false, "error": "..."}` with a matching status code.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or invalid request fields.
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// The file system refused a read or write.
    #[error("{0}")]
    Storage(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(msg) => AppError::BadRequest(msg),
            StoreError::NotFound(filename) => AppError::NotFound(format!("Trade not found: {filename}")),
            io @ StoreError::Io { .. } => {
                error!(error = %io, "Trade store failure");
                AppError::Storage(io.to_string())
            }
        }
    }
}

/// A body that is not JSON, or whose fields have the wrong type, is a bad
/// request like any other invalid field.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "ok":    false,
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
