use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::ai_client::AiError;
use crate::storage::StorageError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("AI service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Upstream failure whose detail is relayed to the caller.
    #[error("AI service error: {0}")]
    Upstream(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidFileType => AppError::Validation(
                "Resumes only: PDF, DOC or DOCX with a matching content type".to_string(),
            ),
            StorageError::FileTooLarge { limit } => AppError::Validation(format!(
                "File too large: maximum size is {limit} bytes"
            )),
            other => AppError::Storage(other.to_string()),
        }
    }
}

impl From<AiError> for AppError {
    fn from(err: AiError) -> Self {
        if err.is_unavailable() {
            AppError::ServiceUnavailable(err.to_string())
        } else {
            AppError::Upstream(err.to_string())
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Unauthorized(msg) => {
                tracing::debug!("Rejected request: {msg}");
                (
                    StatusCode::UNAUTHORIZED,
                    "UNAUTHORIZED",
                    "Authentication required".to_string(),
                )
            }
            AppError::Forbidden => (
                StatusCode::UNAUTHORIZED,
                "FORBIDDEN",
                "Not authorized to access this resource".to_string(),
            ),
            AppError::ServiceUnavailable(msg) => {
                tracing::error!("AI service unavailable: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    "The AI service is currently unavailable. Please try again shortly."
                        .to_string(),
                )
            }
            AppError::Upstream(msg) => {
                tracing::error!("AI service error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, "AI_SERVICE_ERROR", msg.clone())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
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
