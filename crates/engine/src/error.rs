//! Application error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Errors produced by the publishing engine.
///
/// Validation failures carry every violated rule so the operator sees the
/// complete list in one round-trip. Database errors abort the surrounding
/// transaction; callers never commit partial state.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("not found")]
    NotFound,

    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl PublishError {
    /// Single-message validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(vec![message.into()])
    }
}

impl IntoResponse for PublishError {
    fn into_response(self) -> Response {
        match self {
            PublishError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "errors": errors })),
            )
                .into_response(),
            PublishError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "errors": ["not found"] })),
            )
                .into_response(),
            PublishError::Database(e) => {
                tracing::error!(error = %e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "errors": ["internal server error"] })),
                )
                    .into_response()
            }
            PublishError::Internal(e) => {
                tracing::error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "errors": ["internal server error"] })),
                )
                    .into_response()
            }
        }
    }
}

/// Result type alias using PublishError.
pub type PublishResult<T> = Result<T, PublishError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn validation_collects_all_messages() {
        let err = PublishError::Validation(vec![
            "Post title is required".to_string(),
            "Post content is required".to_string(),
        ]);
        let text = err.to_string();
        assert!(text.contains("title"));
        assert!(text.contains("content"));
    }

    #[test]
    fn validation_helper_wraps_single_message() {
        let err = PublishError::validation("Failed to upload image");
        match err {
            PublishError::Validation(msgs) => assert_eq!(msgs.len(), 1),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
