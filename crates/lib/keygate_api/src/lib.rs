//! # keygate_api
//!
//! HTTP API library for Keygate.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use axum::Router;
use axum::routing::{get, post};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};

use keygate_core::auth::token::TokenCodec;
use keygate_core::oauth::{OAuthClient, OAuthError};

use crate::config::ApiConfig;
use crate::handlers::{auth, user};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool.
    pub pool: PgPool,
    /// API configuration.
    pub config: ApiConfig,
    /// Session token codec, built once from the configured signer key.
    pub codec: TokenCodec,
    /// Federation provider client.
    pub oauth: OAuthClient,
}

impl AppState {
    /// Build state from config. The codec and provider client are derived
    /// here once and shared read-only across requests.
    pub fn new(pool: PgPool, config: ApiConfig) -> Result<Self, OAuthError> {
        let codec = TokenCodec::new(config.jwt_signer_key.as_bytes());
        let oauth = OAuthClient::new(config.oauth.clone())?;
        Ok(Self {
            pool,
            config,
            codec,
            oauth,
        })
    }
}

/// Run embedded database migrations.
///
/// Delegates to `keygate_core::migrate::migrate()` which owns the
/// migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    keygate_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public = Router::new()
        .route("/api/v1/auth/login", post(auth::login_handler))
        .route("/api/v1/auth/refresh", post(auth::refresh_handler))
        .route(
            "/api/v1/auth/login/oauth2/callback",
            get(auth::oauth_callback_handler),
        );

    // Protected routes (require a valid access token)
    let protected = Router::new()
        .route("/api/v1/user/me", get(user::me_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(cors)
        .with_state(state)
}
