//! Credential hashing.
//!
//! Stored credentials are bcrypt digests. The digest format is
//! self-describing (salt and cost travel with it), so `DEFAULT_COST` can
//! change later without invalidating rows already in the store.

use super::AuthError;

/// Cost factor for newly minted digests.
pub const DEFAULT_COST: u32 = 10;

/// Digest a plaintext password at [`DEFAULT_COST`].
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    hash_password_with_cost(password, DEFAULT_COST)
}

/// Digest a plaintext password at an explicit cost factor.
pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, AuthError> {
    bcrypt::hash(password, cost).map_err(|e| AuthError::Internal(format!("password hash: {e}")))
}

/// Check a plaintext password against a stored digest. `Ok(false)` is a
/// mismatch; `Err` means the digest itself is unusable.
pub fn verify_password(password: &str, digest: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password, digest)
        .map_err(|e| AuthError::Internal(format!("password verify: {e}")))
}
