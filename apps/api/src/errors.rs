use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every variant maps to a stable `code` so clients can branch on the kind
/// (e.g. render "closed" for `EXPIRED` rather than "missing").
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// The job exists but its deadline has passed or it was closed.
    #[error("Expired: {0}")]
    Expired(String),

    /// An upstream gate (test pass, shortlist, invite) does not hold yet.
    /// The message names the outstanding gate.
    #[error("Gate not satisfied: {0}")]
    GateNotSatisfied(String),

    #[error("Already submitted: {0}")]
    AlreadySubmitted(String),

    #[error("No reattempt: {0}")]
    NoReattempt(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// Caller is authenticated but acting on something it does not own.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable machine-readable kind.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Expired(_) => "EXPIRED",
            AppError::GateNotSatisfied(_) => "GATE_NOT_SATISFIED",
            AppError::AlreadySubmitted(_) => "ALREADY_SUBMITTED",
            AppError::NoReattempt(_) => "NO_REATTEMPT",
            AppError::Duplicate(_) => "DUPLICATE",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Unauthenticated => "UNAUTHENTICATED",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Database(_) | AppError::Store(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Expired(_) => StatusCode::GONE,
            AppError::GateNotSatisfied(_) | AppError::NoReattempt(_) => StatusCode::FORBIDDEN,
            AppError::AlreadySubmitted(_) => StatusCode::CONFLICT,
            AppError::Duplicate(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::FORBIDDEN,
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Database(_) | AppError::Store(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let message = match &self {
            AppError::NotFound(msg)
            | AppError::Expired(msg)
            | AppError::GateNotSatisfied(msg)
            | AppError::AlreadySubmitted(msg)
            | AppError::NoReattempt(msg)
            | AppError::Duplicate(msg)
            | AppError::Unauthorized(msg)
            | AppError::Validation(msg) => msg.clone(),
            AppError::Unauthenticated => "Authentication required".to_string(),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                "A database error occurred".to_string()
            }
            AppError::Store(e) => {
                tracing::error!("Storage error: {e}");
                "A database error occurred".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal server error occurred".to_string()
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expired_is_distinct_from_not_found() {
        let expired = AppError::Expired("closed".into());
        let missing = AppError::NotFound("missing".into());
        assert_eq!(expired.status(), StatusCode::GONE);
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_ne!(expired.code(), missing.code());
    }

    #[test]
    fn test_gate_message_is_surfaced() {
        let err = AppError::GateNotSatisfied("Pass the eligibility test first".into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_duplicate_maps_to_bad_request() {
        assert_eq!(
            AppError::Duplicate("Already applied".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
