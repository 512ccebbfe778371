use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::export::archive::ArchiveError;
use crate::synthesis::error::SynthesisError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Caller input problems are 400s; a document that fails its own compliance
/// checks is a 422. Batch failures map by their wrapped cause.
impl From<SynthesisError> for AppError {
    fn from(err: SynthesisError) -> Self {
        if err.is_input_error() {
            AppError::Validation(err.to_string())
        } else {
            AppError::UnprocessableEntity(err.to_string())
        }
    }
}

impl From<ArchiveError> for AppError {
    fn from(err: ArchiveError) -> Self {
        if err.is_input_error() {
            AppError::Validation(err.to_string())
        } else {
            AppError::Archive(err.to_string())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::Archive(msg) => {
                tracing::error!("Archive error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "ARCHIVE_ERROR",
                    "Failed to package the archive".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
