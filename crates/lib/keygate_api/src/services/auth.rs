//! Authentication service — credential verification, token issuance and
//! refresh, delegating token work to `keygate_core::auth`.

use sqlx::PgPool;
use tracing::{error, info};

use keygate_core::auth::password::verify_password;
use keygate_core::auth::queries;
use keygate_core::auth::token::{TokenCodec, TokenKind};
use keygate_core::auth::AuthError;
use keygate_core::models::user::User;

use crate::error::{AppError, AppResult};
use crate::models::TokenResponse;

/// Mint an access + refresh token pair for a user.
///
/// Also the terminal minting step of the federation flow.
pub fn issue_token_pair(codec: &TokenCodec, user: &User) -> Result<TokenResponse, AuthError> {
    Ok(TokenResponse {
        access_token: codec.sign(user, TokenKind::Access)?,
        refresh_token: codec.sign(user, TokenKind::Refresh)?,
    })
}

/// Authenticate with username + password and mint a token pair.
///
/// Every failure on this path — unknown user, missing or mismatched
/// password hash, store error, signing error — collapses to the same
/// `InvalidCredentials` outcome so callers cannot probe for accounts.
pub async fn login(
    pool: &PgPool,
    codec: &TokenCodec,
    username: &str,
    password: &str,
) -> AppResult<TokenResponse> {
    let user = queries::find_user_by_username(pool, username)
        .await
        .map_err(|e| {
            error!(username, error = %e, "user lookup failed during login");
            AppError::InvalidCredentials
        })?
        .ok_or(AppError::InvalidCredentials)?;

    let hash = user
        .password_hash
        .as_deref()
        .ok_or(AppError::InvalidCredentials)?;

    let authenticated = verify_password(password, hash).map_err(|e| {
        error!(username, error = %e, "password verification failed");
        AppError::InvalidCredentials
    })?;
    if !authenticated {
        return Err(AppError::InvalidCredentials);
    }

    let pair = issue_token_pair(codec, &user).map_err(|e| {
        error!(username, error = %e, "token minting failed during login");
        AppError::InvalidCredentials
    })?;

    info!(username, "user authenticated");
    Ok(pair)
}

/// Validate a refresh token and mint a new access token.
///
/// The refresh token is returned unchanged — it is never rotated. The
/// subject must still resolve to a live account, so a token outliving its
/// user is rejected. All failures collapse to `InvalidToken`.
pub async fn refresh(
    pool: &PgPool,
    codec: &TokenCodec,
    refresh_token: &str,
) -> AppResult<TokenResponse> {
    let claims = codec
        .verify(refresh_token, TokenKind::Refresh)
        .map_err(|e| {
            error!(error = %e, "refresh token rejected");
            AppError::InvalidToken
        })?;

    let user = queries::find_user_by_username(pool, &claims.sub)
        .await
        .map_err(|e| {
            error!(username = %claims.sub, error = %e, "user lookup failed during refresh");
            AppError::InvalidToken
        })?
        .ok_or(AppError::InvalidToken)?;

    let access_token = codec.sign(&user, TokenKind::Access).map_err(|e| {
        error!(username = %user.username, error = %e, "token minting failed during refresh");
        AppError::InvalidToken
    })?;

    info!(username = %user.username, "access token refreshed");
    Ok(TokenResponse {
        access_token,
        refresh_token: refresh_token.to_string(),
    })
}
