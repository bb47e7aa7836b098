//! Identity federation service — authorization-code login.

use sqlx::PgPool;
use tracing::{error, info};

use keygate_core::auth::AuthError;
use keygate_core::auth::queries;
use keygate_core::auth::token::TokenCodec;
use keygate_core::models::user::{NewUser, Role, User};
use keygate_core::oauth::{OAuthClient, ProviderUserInfo};

use crate::error::{AppError, AppResult};
use crate::models::TokenResponse;
use crate::services::auth::issue_token_pair;

/// Trade a provider authorization code for a local token pair.
///
/// Two sequential provider calls, both of which must succeed: exchange the
/// code for a provider access token, then fetch the external profile with
/// it. The profile is projected into a local user and a token pair is
/// minted exactly as for a password login. Any failure at any step
/// collapses to a single `Unauthorized`. The upsert is not rolled back if
/// minting fails afterwards; it is idempotent on username, so retrying the
/// same code is safe.
pub async fn login_with_code(
    pool: &PgPool,
    oauth: &OAuthClient,
    codec: &TokenCodec,
    code: &str,
) -> AppResult<TokenResponse> {
    let provider_token = oauth.exchange_code(code).await.map_err(|e| {
        error!(error = %e, "authorization code exchange failed");
        AppError::Unauthorized
    })?;

    let profile = oauth.fetch_userinfo(&provider_token).await.map_err(|e| {
        error!(error = %e, "provider profile fetch failed");
        AppError::Unauthorized
    })?;

    let user = resolve_user(pool, &profile).await.map_err(|e| {
        error!(username = %profile.email, error = %e, "federated user upsert failed");
        AppError::Unauthorized
    })?;

    let pair = issue_token_pair(codec, &user).map_err(|e| {
        error!(username = %user.username, error = %e, "token minting failed after federation");
        AppError::Unauthorized
    })?;

    info!(username = %user.username, "federated login completed");
    Ok(pair)
}

/// Project the external profile and resolve it against the store. An
/// existing account with the externally-derived username wins; federated
/// accounts always enter with `Role::User`, never auto-elevated. The
/// underlying upsert is race-safe, so two concurrent first logins for the
/// same email both resolve to the same row.
async fn resolve_user(pool: &PgPool, profile: &ProviderUserInfo) -> Result<User, AuthError> {
    queries::upsert_federated_user(
        pool,
        &NewUser {
            username: profile.email.clone(),
            password_hash: None,
            email: profile.email.clone(),
            name: profile.name.clone(),
            avatar: profile.picture.clone(),
            role: Role::User,
        },
    )
    .await
}
