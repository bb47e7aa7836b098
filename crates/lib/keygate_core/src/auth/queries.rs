//! User-store queries.
//!
//! Users are never hard-deleted; every lookup excludes tombstoned rows and
//! every mutation maintains the audit timestamps.

use sqlx::PgPool;
use uuid::Uuid;

use super::AuthError;
use crate::models::user::{NewUser, User};

const USER_COLUMNS: &str = "id, username, password_hash, email, name, avatar, role, \
     created_at, updated_at, deleted_at, is_deleted";

/// Fetch a non-deleted user by username.
pub async fn find_user_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<User>, AuthError> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1 AND is_deleted = false");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Insert a new user, returning the stored row.
pub async fn insert_user(pool: &PgPool, new_user: &NewUser) -> Result<User, AuthError> {
    let sql = format!(
        "INSERT INTO users (username, password_hash, email, name, avatar, role) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING {USER_COLUMNS}"
    );
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(&new_user.username)
        .bind(&new_user.password_hash)
        .bind(&new_user.email)
        .bind(&new_user.name)
        .bind(&new_user.avatar)
        .bind(new_user.role)
        .fetch_one(pool)
        .await?;
    Ok(user)
}

/// Resolve-or-create a federated user. An existing row with that username
/// wins — its id, role and profile fields are kept as-is — and only when
/// no such row exists is the projection persisted.
///
/// Safe under concurrent first logins for the same username: both callers
/// may miss the lookup, but the loser's insert is a no-op on the unique
/// username and the re-select returns the winner's row.
pub async fn upsert_federated_user(pool: &PgPool, new_user: &NewUser) -> Result<User, AuthError> {
    if let Some(existing) = find_user_by_username(pool, &new_user.username).await? {
        return Ok(existing);
    }

    let sql = format!(
        "INSERT INTO users (username, password_hash, email, name, avatar, role) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT (username) DO NOTHING \
         RETURNING {USER_COLUMNS}"
    );
    let inserted = sqlx::query_as::<_, User>(&sql)
        .bind(&new_user.username)
        .bind(&new_user.password_hash)
        .bind(&new_user.email)
        .bind(&new_user.name)
        .bind(&new_user.avatar)
        .bind(new_user.role)
        .fetch_optional(pool)
        .await?;

    match inserted {
        Some(user) => Ok(user),
        // Lost the race; the conflicting row is the one that wins. A None
        // here means the username is held by a tombstoned row, which is
        // not a live account.
        None => find_user_by_username(pool, &new_user.username)
            .await?
            .ok_or_else(|| AuthError::Internal("username held by a deleted account".into())),
    }
}

/// Soft-delete a user: tombstone timestamp + flag, never a hard delete.
pub async fn soft_delete_user(pool: &PgPool, id: Uuid) -> Result<(), AuthError> {
    sqlx::query(
        "UPDATE users SET is_deleted = true, deleted_at = now(), updated_at = now() \
         WHERE id = $1 AND is_deleted = false",
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}
