//! User request handlers.

use axum::{Extension, Json};

use crate::error::AppResult;
use crate::middleware::auth::Principal;

/// `GET /api/v1/user/me` — echo the authenticated principal.
pub async fn me_handler(Extension(principal): Extension<Principal>) -> AppResult<Json<Principal>> {
    Ok(Json(principal))
}
