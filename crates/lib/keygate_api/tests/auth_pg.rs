//! End-to-end tests against a live PostgreSQL instance.
//!
//! Gated on `DATABASE_URL`: point it at a database the tests may write to
//! and they run the success paths that need a real store — password login,
//! refresh, and the federated account upsert. Without the variable each
//! test skips, so the suite stays green on machines with no server.
//!
//! Seeded rows use per-run unique usernames, so reruns against the same
//! database do not collide.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use keygate_api::config::ApiConfig;
use keygate_api::services::auth::issue_token_pair;
use keygate_api::{AppState, router};
use keygate_core::auth::password::hash_password_with_cost;
use keygate_core::auth::queries;
use keygate_core::auth::token::TokenKind;
use keygate_core::models::user::{NewUser, Role, User};
use keygate_core::oauth::OAuthConfig;
use tower::ServiceExt;
use uuid::Uuid;

const SIGNER_KEY: &str = "pg-backed-test-signer-key----pg-backed-test-signer-key--64bytes!";

/// bcrypt's cost floor; keeps seeding fast.
const SEED_COST: u32 = 4;

/// Connects, migrates and builds state, or `None` when `DATABASE_URL` is
/// not set.
async fn setup() -> Option<AppState> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping");
        return None;
    };

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("connect to DATABASE_URL");
    keygate_api::migrate(&pool).await.expect("migrate");

    let config = ApiConfig {
        bind_addr: "127.0.0.1:0".into(),
        pg_connection_url: url,
        jwt_signer_key: SIGNER_KEY.into(),
        oauth: OAuthConfig {
            client_id: "client".into(),
            client_secret: "secret".into(),
            redirect_uri: "http://localhost/callback".into(),
            // These tests never reach the provider.
            token_endpoint: "http://127.0.0.1:1/token".into(),
            userinfo_endpoint: "http://127.0.0.1:1/userinfo".into(),
        },
    };
    Some(AppState::new(pool, config).expect("state"))
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4())
}

async fn seed_user(state: &AppState, username: &str, password: &str, role: Role) -> User {
    let hash = hash_password_with_cost(password, SEED_COST).expect("hash");
    queries::insert_user(
        &state.pool,
        &NewUser {
            username: username.to_string(),
            password_hash: Some(hash),
            email: format!("{username}@example.com"),
            name: "Seeded User".into(),
            avatar: None,
            role,
        },
    )
    .await
    .expect("seed user")
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse JSON")
}

async fn post_login(state: &AppState, username: &str, password: &str) -> (StatusCode, serde_json::Value) {
    let app = router(state.clone());
    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({"username": username, "password": password}).to_string(),
        ))
        .unwrap();
    let resp = app.oneshot(req).await.expect("request");
    let status = resp.status();
    (status, body_json(resp).await)
}

async fn post_refresh(state: &AppState, token: &str) -> (StatusCode, serde_json::Value) {
    let app = router(state.clone());
    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/refresh")
        .body(Body::from(token.to_string()))
        .unwrap();
    let resp = app.oneshot(req).await.expect("request");
    let status = resp.status();
    (status, body_json(resp).await)
}

#[tokio::test]
async fn login_returns_token_pair_with_user_scope() {
    let Some(state) = setup().await else { return };
    let username = unique("user");
    seed_user(&state, &username, "password", Role::User).await;

    let (status, body) = post_login(&state, &username, "password").await;
    assert_eq!(status, StatusCode::OK);

    let access = body["accessToken"].as_str().expect("accessToken");
    let refresh = body["refreshToken"].as_str().expect("refreshToken");
    assert!(!access.is_empty());
    assert!(!refresh.is_empty());

    let claims = state.codec.verify(access, TokenKind::Access).expect("verify");
    assert_eq!(claims.sub, username);
    assert!(claims.scope.contains("USER"));

    // A real account with the wrong password reads exactly like an
    // unknown account.
    let (wrong_status, wrong_body) = post_login(&state, &username, "wrongpassword").await;
    let (unknown_status, unknown_body) = post_login(&state, &unique("ghost"), "password").await;
    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
}

#[tokio::test]
async fn refresh_mints_new_access_and_passes_refresh_through() {
    let Some(state) = setup().await else { return };
    let username = unique("user");
    seed_user(&state, &username, "password", Role::User).await;

    let (_, login_body) = post_login(&state, &username, "password").await;
    let first_access = login_body["accessToken"].as_str().expect("accessToken");
    let refresh = login_body["refreshToken"].as_str().expect("refreshToken");

    let (status, body) = post_refresh(&state, refresh).await;
    assert_eq!(status, StatusCode::OK);

    let new_access = body["accessToken"].as_str().expect("accessToken");
    assert_ne!(new_access, first_access, "a fresh access token is minted");
    assert_eq!(
        body["refreshToken"].as_str(),
        Some(refresh),
        "the refresh token is returned unchanged, never rotated"
    );

    let claims = state
        .codec
        .verify(new_access, TokenKind::Access)
        .expect("verify");
    assert_eq!(claims.sub, username);
    assert_eq!(claims.scope, "USER");
}

#[tokio::test]
async fn federated_upsert_keeps_existing_account() {
    let Some(state) = setup().await else { return };
    let username = unique("fed");
    let existing = seed_user(&state, &username, "password", Role::Admin).await;

    // A provider profile for the same username must not overwrite the
    // local account: its id, role and profile fields win.
    let resolved = queries::upsert_federated_user(
        &state.pool,
        &NewUser {
            username: username.clone(),
            password_hash: None,
            email: format!("{username}@provider.example"),
            name: "Provider Name".into(),
            avatar: Some("https://provider.example/avatar.png".into()),
            role: Role::User,
        },
    )
    .await
    .expect("upsert");

    assert_eq!(resolved.id, existing.id);
    assert_eq!(resolved.role, Role::Admin);
    assert_eq!(resolved.name, "Seeded User");

    // A fresh pair is still minted for the resolved account.
    let pair = issue_token_pair(&state.codec, &resolved).expect("mint");
    let claims = state
        .codec
        .verify(&pair.access_token, TokenKind::Access)
        .expect("verify");
    assert_eq!(claims.sub, username);
    assert_eq!(claims.scope, "ADMIN");
}

#[tokio::test]
async fn federated_upsert_creates_then_reuses_account() {
    let Some(state) = setup().await else { return };
    let username = unique("fed");
    let projection = NewUser {
        username: username.clone(),
        password_hash: None,
        email: format!("{username}@provider.example"),
        name: "First Login".into(),
        avatar: None,
        role: Role::User,
    };

    let created = queries::upsert_federated_user(&state.pool, &projection)
        .await
        .expect("first upsert");
    assert_eq!(created.username, username);
    assert_eq!(created.role, Role::User);
    assert!(created.password_hash.is_none());

    // A repeat login for the same username resolves to the same row even
    // when the provider profile has drifted.
    let repeat = queries::upsert_federated_user(
        &state.pool,
        &NewUser {
            name: "Renamed Later".into(),
            ..projection
        },
    )
    .await
    .expect("second upsert");
    assert_eq!(repeat.id, created.id);
    assert_eq!(repeat.name, "First Login");
}
