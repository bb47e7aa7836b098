//! Authentication request handlers.

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;

use crate::AppState;
use crate::error::AppResult;
use crate::models::{LoginRequest, TokenResponse};
use crate::services::{auth, oauth};

/// `POST /api/v1/auth/login` — authenticate with username + password.
pub async fn login_handler(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let resp = auth::login(&state.pool, &state.codec, &body.username, &body.password).await?;
    Ok(Json(resp))
}

/// `POST /api/v1/auth/refresh` — mint a new access token. The request body
/// is the raw refresh-token string; the same refresh token is returned.
pub async fn refresh_handler(
    State(state): State<AppState>,
    body: String,
) -> AppResult<Json<TokenResponse>> {
    let resp = auth::refresh(&state.pool, &state.codec, body.trim()).await?;
    Ok(Json(resp))
}

/// Query parameters for the OAuth2 callback.
#[derive(Debug, Deserialize)]
pub struct OAuthCallbackParams {
    pub code: String,
}

/// `GET /api/v1/auth/login/oauth2/callback` — receive the provider
/// authorization code and trade it for a local token pair.
pub async fn oauth_callback_handler(
    State(state): State<AppState>,
    Query(params): Query<OAuthCallbackParams>,
) -> AppResult<Json<TokenResponse>> {
    let resp =
        oauth::login_with_code(&state.pool, &state.oauth, &state.codec, &params.code).await?;
    Ok(Json(resp))
}
