//! Error types for the Tool Crib server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error codes surfaced to API clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NotAuthenticated = 2,
    NotAuthorized = 3,
    DbFailure = 4,
    NoSuchResource = 5,
    BadValue = 6,
    InvalidTransition = 7,
    Duplicate = 8,
    StockExhausted = 9,
    DirectoryFailure = 10,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Ownership failures on notifications are indistinguishable from a
    /// missing record, so other users' notifications cannot be enumerated.
    #[error("Not found: {0}")]
    NotFoundOrForbidden(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("No stock available: {0}")]
    StockExhausted(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Identity directory error: {0}")]
    Directory(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthenticated, msg.clone())
            }
            AppError::Forbidden(msg) => {
                (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::NotFound(msg) | AppError::NotFoundOrForbidden(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchResource, msg.clone())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::InvalidTransition(msg) => {
                (StatusCode::CONFLICT, ErrorCode::InvalidTransition, msg.clone())
            }
            AppError::Conflict(msg) => {
                (StatusCode::CONFLICT, ErrorCode::Duplicate, msg.clone())
            }
            AppError::StockExhausted(msg) => {
                (StatusCode::CONFLICT, ErrorCode::StockExhausted, msg.clone())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                )
            }
            AppError::Directory(msg) => {
                tracing::error!("Identity directory error: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorCode::DirectoryFailure,
                    "Identity directory unavailable".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_and_forbidden_ownership_share_a_status() {
        let not_found = AppError::NotFound("Notification 1 not found".into()).into_response();
        let merged = AppError::NotFoundOrForbidden("Notification 1 not found".into()).into_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(merged.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn transition_conflicts_are_409() {
        let err = AppError::InvalidTransition("devuelta -> aprobada".into()).into_response();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }
}
