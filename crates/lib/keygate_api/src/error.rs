//! Application error types.
//!
//! The kind→status mapping lives only here, at the transport boundary.
//! Services return these kinds explicitly; internal failure detail goes to
//! `tracing` and never into a response body.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::models::ErrorResponse;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad username/password at login. One kind and one message for every
    /// failure on the login path.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Malformed/expired/wrong-algorithm/unverifiable token at refresh.
    #[error("Invalid token")]
    InvalidToken,

    /// Catch-all: federation failure, verification failure on protected
    /// routes, signing failure.
    #[error("Unauthorized")]
    Unauthorized,

    /// Unexpected failure unrelated to auth. The carried detail is logged,
    /// never returned.
    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidCredentials | AppError::InvalidToken | AppError::Unauthorized => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Internal(detail) => {
                tracing::error!(detail = %detail, "internal server error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = Json(ErrorResponse {
            status: status.as_u16(),
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}
