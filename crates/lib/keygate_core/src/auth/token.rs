//! Session token codec.
//!
//! Builds and verifies the signed JWTs that carry a session. Two token
//! kinds exist and the MAC algorithm is the only structural signal
//! separating them: access tokens are HS256, refresh tokens HS512.
//! Verification pins the algorithm expected by the calling context, so a
//! refresh token presented where an access token is required fails closed
//! (and vice versa).

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuthError;
use crate::models::user::User;

/// Fixed `iss` claim identifying this system.
pub const ISSUER: &str = "keygate";

/// Token kind. Selects the signing algorithm and lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Short-lived credential authorizing API calls (1 day, HS256).
    Access,
    /// Long-lived credential used only to mint new access tokens
    /// (30 days, HS512).
    Refresh,
}

impl TokenKind {
    pub fn algorithm(self) -> jsonwebtoken::Algorithm {
        match self {
            TokenKind::Access => jsonwebtoken::Algorithm::HS256,
            TokenKind::Refresh => jsonwebtoken::Algorithm::HS512,
        }
    }

    pub fn lifetime(self) -> Duration {
        match self {
            TokenKind::Access => Duration::days(1),
            TokenKind::Refresh => Duration::days(30),
        }
    }
}

/// Signed token payload. One fixed shape for both kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject — username.
    pub sub: String,
    /// Issuer — always [`ISSUER`].
    pub iss: String,
    /// Audience — self-referential, equals `sub`.
    pub aud: String,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds, absolute).
    pub exp: i64,
    /// Random unique nonce per token.
    pub jti: String,
    /// Role name(s), space-joined.
    pub scope: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Signs and verifies session tokens with a single shared symmetric key.
///
/// Constructed once at startup from explicit configuration and shared
/// read-only across requests.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenCodec {
    /// The same key serves both MAC strengths, so it must be sized for the
    /// stronger one (HS512 — at least 64 bytes). Length is enforced at
    /// config load, not here.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Mint a signed token of the given kind for a user.
    ///
    /// Expiry is computed at signing time and embedded as an absolute
    /// timestamp claim.
    pub fn sign(&self, user: &User, kind: TokenKind) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user.username.clone(),
            iss: ISSUER.to_string(),
            aud: user.username.clone(),
            iat: now.timestamp(),
            exp: (now + kind.lifetime()).timestamp(),
            jti: Uuid::new_v4().to_string(),
            scope: build_scope(user),
            name: user.name.clone(),
            email: user.email.clone(),
            avatar: user.avatar.clone(),
        };
        encode(&Header::new(kind.algorithm()), &claims, &self.encoding)
            .map_err(|e| AuthError::Signing(format!("jwt encode: {e}")))
    }

    /// Verify a token strictly as the given kind, returning its claims.
    ///
    /// Fails on bad signature, wrong algorithm, malformed input, or expiry.
    /// No claim is trusted unless the signature verifies over the compact
    /// serialization produced at signing time.
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<SessionClaims, AuthError> {
        let mut validation = Validation::new(kind.algorithm());
        validation.leeway = 0;
        validation.validate_aud = false;
        let data = decode::<SessionClaims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::TokenInvalid,
            }
        })?;
        // jsonwebtoken accepts exp == now; the boundary here is exclusive.
        if data.claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::TokenExpired);
        }
        Ok(data.claims)
    }
}

/// Scope claim: the user's role name(s), space-joined.
fn build_scope(user: &User) -> String {
    user.role.as_str().to_string()
}
