//! Authentication middleware — Bearer token extraction and verification.
//!
//! Invoked on every protected request. Verifies strictly as an access
//! token (HS256) and derives the principal from the verified claims alone;
//! no store round-trip is needed to validate a token's signature or expiry.

use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use serde::Serialize;

use keygate_core::auth::token::TokenKind;

use crate::AppState;
use crate::error::AppError;

/// Authenticated identity derived from a verified access token, stored in
/// request extensions.
#[derive(Debug, Clone, Serialize)]
pub struct Principal {
    /// Token subject — the username.
    pub username: String,
    /// `scope` claim split on spaces, each entry prefixed with `ROLE_`.
    pub authorities: Vec<String>,
}

/// Axum middleware: extracts `Authorization: Bearer <token>`, verifies it
/// as an access token, and injects a [`Principal`] into request extensions.
///
/// Every failure — missing header, wrong scheme, bad signature, wrong
/// token kind, expiry — yields the same uniform 401.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AppError::Unauthorized)?;

    let claims = state
        .codec
        .verify(token, TokenKind::Access)
        .map_err(|_| AppError::Unauthorized)?;

    let authorities = claims
        .scope
        .split_whitespace()
        .map(|role| format!("ROLE_{role}"))
        .collect();

    request.extensions_mut().insert(Principal {
        username: claims.sub,
        authorities,
    });

    Ok(next.run(request).await)
}
