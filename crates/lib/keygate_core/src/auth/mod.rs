//! Authentication and authorization logic.
//!
//! Provides the session token codec, password hashing and the user-store
//! queries shared by `keygate_api`.

pub mod password;
pub mod queries;
pub mod token;

use thiserror::Error;

/// Authentication errors.
///
/// The HTTP layer collapses these to uniform 401 responses; the variant
/// distinction exists for logging and tests only.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Invalid token")]
    TokenInvalid,

    #[error("Token expired")]
    TokenExpired,

    #[error("Token signing failed: {0}")]
    Signing(String),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
