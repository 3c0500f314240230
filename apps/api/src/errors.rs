use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extract::ExtractError;
use crate::quota::QuotaExceeded;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Response bodies are flat JSON objects keyed by `error`, matching what the
/// frontend expects: `{error}`, `{error, quota, used}` for 429, and
/// `{error, details}` for 500.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("quota exceeded ({used}/{quota})")]
    QuotaExceeded { quota: u64, used: u64 },

    #[error(transparent)]
    Extraction(#[from] ExtractError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<QuotaExceeded> for AppError {
    fn from(reject: QuotaExceeded) -> Self {
        AppError::QuotaExceeded {
            quota: reject.quota,
            used: reject.used,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            AppError::QuotaExceeded { quota, used } => (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({
                    "error": "Free token quota reached! Please support the project \u{2615} to unlock more.",
                    "quota": quota,
                    "used": used,
                })),
            )
                .into_response(),
            AppError::Extraction(ExtractError::UnsupportedFileType(name)) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": format!("Unsupported file type: {name}") })),
            )
                .into_response(),
            AppError::Extraction(err) => {
                tracing::warn!("Extraction failed: {err}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({ "error": err.to_string() })),
                )
                    .into_response()
            }
            AppError::Internal(err) => {
                tracing::error!("Internal error: {err:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error",
                        "details": err.to_string(),
                    })),
                )
                    .into_response()
            }
        }
    }
}
