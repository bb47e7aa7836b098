//! User domain model.
//!
//! These are internal domain models, distinct from the API request/response
//! types in `keygate_api` (which carry `#[serde(rename)]` for camelCase).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User role. Closed set, stored as the Postgres enum `user_role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// Role name as it appears in the token `scope` claim.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }
}

/// A user row. Rows are never hard-deleted; `is_deleted` + `deleted_at`
/// form the tombstone and lookups must exclude tombstoned rows.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    /// Unique; used as the token subject.
    pub username: String,
    /// Absent for federation-only accounts.
    pub password_hash: Option<String>,
    pub email: String,
    pub name: String,
    pub avatar: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
}

/// Projection persisted on first login (local or federated).
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: Option<String>,
    pub email: String,
    pub name: String,
    pub avatar: Option<String>,
    pub role: Role,
}
