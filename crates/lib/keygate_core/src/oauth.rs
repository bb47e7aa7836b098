//! OAuth2 provider client for identity federation.
//!
//! Trades an authorization code for a provider access token, then fetches
//! the external profile with that token as a bearer credential. Both calls
//! carry an explicit timeout: an unbounded outbound call would tie up a
//! request-handling task indefinitely.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Timeout applied to every outbound provider call.
const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// Federation provider errors. All of them collapse to a single 401 at the
/// HTTP boundary; the variants exist for logging.
#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("Provider request failed: {0}")]
    Request(String),

    #[error("Provider returned HTTP {0}")]
    Status(u16),

    #[error("Provider response missing access token")]
    MissingAccessToken,

    #[error("Provider response parse error: {0}")]
    Parse(String),
}

/// Provider endpoints and client credentials, resolved once at startup.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub token_endpoint: String,
    pub userinfo_endpoint: String,
}

/// Response from the provider's token endpoint.
#[derive(Debug, Deserialize)]
pub struct ProviderTokenResponse {
    pub access_token: Option<String>,
    pub expires_in: Option<i64>,
    pub scope: Option<String>,
    pub token_type: Option<String>,
    pub id_token: Option<String>,
}

/// External profile returned by the provider's userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderUserInfo {
    pub id: Option<String>,
    pub email: String,
    #[serde(default)]
    pub verified_email: Option<bool>,
    pub name: String,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub picture: Option<String>,
}

/// HTTP client for the federation provider.
#[derive(Clone)]
pub struct OAuthClient {
    http: reqwest::Client,
    config: OAuthConfig,
}

impl OAuthClient {
    pub fn new(config: OAuthConfig) -> Result<Self, OAuthError> {
        let http = reqwest::Client::builder()
            .timeout(PROVIDER_TIMEOUT)
            .build()
            .map_err(|e| OAuthError::Request(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// Exchange an authorization code for the provider access token.
    ///
    /// Requires a 2xx response and a non-empty `access_token`.
    pub async fn exchange_code(&self, code: &str) -> Result<String, OAuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];

        let resp = self
            .http
            .post(&self.config.token_endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| OAuthError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(OAuthError::Status(resp.status().as_u16()));
        }

        let body = resp
            .json::<ProviderTokenResponse>()
            .await
            .map_err(|e| OAuthError::Parse(e.to_string()))?;

        match body.access_token {
            Some(token) if !token.is_empty() => {
                debug!("authorization code exchanged with provider");
                Ok(token)
            }
            _ => Err(OAuthError::MissingAccessToken),
        }
    }

    /// Fetch the external profile using the provider access token.
    pub async fn fetch_userinfo(&self, access_token: &str) -> Result<ProviderUserInfo, OAuthError> {
        let resp = self
            .http
            .get(&self.config.userinfo_endpoint)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| OAuthError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(OAuthError::Status(resp.status().as_u16()));
        }

        resp.json::<ProviderUserInfo>()
            .await
            .map_err(|e| OAuthError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_response_parses_full_body() {
        let json = r#"{
            "access_token": "ya29.token",
            "expires_in": 3599,
            "scope": "openid email profile",
            "token_type": "Bearer",
            "id_token": "eyJ.header.sig"
        }"#;
        let parsed: ProviderTokenResponse = serde_json::from_str(json).expect("parse");
        assert_eq!(parsed.access_token.as_deref(), Some("ya29.token"));
        assert_eq!(parsed.expires_in, Some(3599));
    }

    #[test]
    fn token_response_tolerates_missing_access_token() {
        let parsed: ProviderTokenResponse =
            serde_json::from_str(r#"{"error": "invalid_grant"}"#).expect("parse");
        assert!(parsed.access_token.is_none());
    }

    #[test]
    fn userinfo_parses_with_optional_fields_absent() {
        let json = r#"{"email": "user@example.com", "name": "Test User"}"#;
        let parsed: ProviderUserInfo = serde_json::from_str(json).expect("parse");
        assert_eq!(parsed.email, "user@example.com");
        assert_eq!(parsed.name, "Test User");
        assert!(parsed.picture.is_none());
        assert!(parsed.verified_email.is_none());
    }

    #[test]
    fn userinfo_parses_full_google_shape() {
        let json = r#"{
            "id": "1086249",
            "email": "user@example.com",
            "verified_email": true,
            "name": "Test User",
            "given_name": "Test",
            "family_name": "User",
            "picture": "https://lh3.example.com/photo.jpg"
        }"#;
        let parsed: ProviderUserInfo = serde_json::from_str(json).expect("parse");
        assert_eq!(parsed.verified_email, Some(true));
        assert_eq!(parsed.picture.as_deref(), Some("https://lh3.example.com/photo.jpg"));
    }

    #[test]
    fn client_builds_from_config() {
        let client = OAuthClient::new(OAuthConfig {
            client_id: "id".into(),
            client_secret: "secret".into(),
            redirect_uri: "http://localhost/callback".into(),
            token_endpoint: "http://localhost/token".into(),
            userinfo_endpoint: "http://localhost/userinfo".into(),
        });
        assert!(client.is_ok());
    }
}
