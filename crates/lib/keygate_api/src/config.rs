//! API server configuration.
//!
//! Resolved once at process start; all values are read-only afterwards.

use keygate_core::oauth::OAuthConfig;
use thiserror::Error;

/// Minimum signer key length in bytes. The shared symmetric key is reused
/// for the HS512 refresh path, which needs a full 64-byte key.
const MIN_SIGNER_KEY_BYTES: usize = 64;

/// Configuration errors surfaced at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("JWT_SIGNER_KEY must be at least {MIN_SIGNER_KEY_BYTES} bytes, got {0}")]
    SignerKeyTooShort(usize),
}

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:8080").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub pg_connection_url: String,
    /// Shared symmetric signing key for both token kinds.
    pub jwt_signer_key: String,
    /// Federation provider endpoints and client credentials.
    pub oauth: OAuthConfig,
}

impl ApiConfig {
    /// Reads configuration from environment variables.
    ///
    /// | Variable                  | Default                                          |
    /// |---------------------------|--------------------------------------------------|
    /// | `BIND_ADDR`               | `127.0.0.1:8080`                                 |
    /// | `DATABASE_URL`            | `postgres://localhost:5432/keygate`              |
    /// | `JWT_SIGNER_KEY`          | required, ≥ 64 bytes                             |
    /// | `OAUTH_CLIENT_ID`         | required                                         |
    /// | `OAUTH_CLIENT_SECRET`     | required                                         |
    /// | `OAUTH_REDIRECT_URI`      | required                                         |
    /// | `OAUTH_TOKEN_ENDPOINT`    | `https://oauth2.googleapis.com/token`            |
    /// | `OAUTH_USERINFO_ENDPOINT` | `https://www.googleapis.com/oauth2/v2/userinfo`  |
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_signer_key = require("JWT_SIGNER_KEY")?;
        if jwt_signer_key.len() < MIN_SIGNER_KEY_BYTES {
            return Err(ConfigError::SignerKeyTooShort(jwt_signer_key.len()));
        }

        Ok(Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".into()),
            pg_connection_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost:5432/keygate".into()),
            jwt_signer_key,
            oauth: OAuthConfig {
                client_id: require("OAUTH_CLIENT_ID")?,
                client_secret: require("OAUTH_CLIENT_SECRET")?,
                redirect_uri: require("OAUTH_REDIRECT_URI")?,
                token_endpoint: std::env::var("OAUTH_TOKEN_ENDPOINT")
                    .unwrap_or_else(|_| "https://oauth2.googleapis.com/token".into()),
                userinfo_endpoint: std::env::var("OAUTH_USERINFO_ENDPOINT")
                    .unwrap_or_else(|_| "https://www.googleapis.com/oauth2/v2/userinfo".into()),
            },
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::Missing(name)),
    }
}
