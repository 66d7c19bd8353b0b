use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::models::SeedCandidate;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("track not found: {0}")]
    NotFound(String),

    #[error("ambiguous query: {} candidates match", candidates.len())]
    Ambiguous { candidates: Vec<SeedCandidate> },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("upstream store error: {0}")]
    Upstream(#[from] sqlx::Error),

    #[error("store lookup timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                json!({ "error": "not_found", "message": msg }),
            ),
            AppError::Ambiguous { candidates } => (
                StatusCode::CONFLICT,
                json!({
                    "error": "ambiguous",
                    "message": "multiple tracks match; re-query with an artist or exact name",
                    "candidates": candidates,
                }),
            ),
            AppError::InvalidInput(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "invalid_input", "message": msg }),
            ),
            // Store-specific detail stays in the logs, never in the response body.
            AppError::Upstream(e) => {
                tracing::error!(error = %e, "upstream store failure");
                (
                    StatusCode::BAD_GATEWAY,
                    json!({ "error": "upstream_unavailable", "message": "catalog or similarity store unavailable" }),
                )
            }
            AppError::Timeout(elapsed) => {
                tracing::error!(?elapsed, "store lookup deadline exceeded");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    json!({ "error": "upstream_timeout", "message": "store lookup timed out" }),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "internal", "message": "internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
