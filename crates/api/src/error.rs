use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use staffpurchase_core::error::CoreError;
use staffpurchase_db::StoreError;

use crate::auth::identity::IdentityError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds backend and HTTP-specific
/// variants. Implements [`IntoResponse`] to produce consistent
/// `{"error", "code"}` JSON bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `staffpurchase_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The storage backend failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The identity provider failed (not a rejected token).
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

const SANITIZED_INTERNAL: &str = "An internal error occurred";
const SANITIZED_DEPENDENCY: &str = "A backend service is unavailable";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::InvalidAction(_) => (
                    StatusCode::BAD_REQUEST,
                    "INVALID_ACTION",
                    "Invalid action".to_string(),
                ),
                CoreError::TokenAlreadyUsed => (
                    StatusCode::BAD_REQUEST,
                    "TOKEN_ALREADY_USED",
                    core.to_string(),
                ),
                CoreError::Conflict(msg) => (StatusCode::BAD_REQUEST, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        SANITIZED_INTERNAL.to_string(),
                    )
                }
            },

            // --- Backend errors ---
            AppError::Store(StoreError::Duplicate(constraint)) => (
                StatusCode::BAD_REQUEST,
                "CONFLICT",
                format!("Duplicate value violates unique constraint: {constraint}"),
            ),
            AppError::Store(err) => {
                tracing::error!(error = %err, "Store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DEPENDENCY_FAILURE",
                    SANITIZED_DEPENDENCY.to_string(),
                )
            }
            AppError::Identity(err) => {
                tracing::error!(error = %err, "Identity provider error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DEPENDENCY_FAILURE",
                    SANITIZED_DEPENDENCY.to_string(),
                )
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    SANITIZED_INTERNAL.to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
