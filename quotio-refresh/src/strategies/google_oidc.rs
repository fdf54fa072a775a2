//! Google-style OIDC refresh: `grant_type=refresh_token` form POST against a
//! per-provider token endpoint.
//!
//! Used directly by Codex/Gemini/VertexAI (whose refresh flow really is
//! Google's), and reused as-is for Factory/Cursor/Antigravity/MiniMax/Augment,
//! whose AWS-SSO-style device-code refresh shares the same grant shape
//! against their own endpoints. Grounded on `gemini::gcloud`'s
//! `refresh_token` function and its `GOOGLE_TOKEN_URL` form POST.

use async_trait::async_trait;
use chrono::Utc;
use quotio_core::AccountRecord;
use quotio_fetch::HttpClient;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::RefreshError;
use crate::strategy::{RefreshStrategy, RefreshedTokens};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
}

#[derive(serde::Serialize)]
struct RefreshForm<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    refresh_token: &'a str,
    grant_type: &'static str,
}

/// OIDC refresh-token-grant strategy against a fixed token endpoint.
pub struct GoogleOidcRefreshStrategy {
    token_endpoint: String,
    http: HttpClient,
}

impl GoogleOidcRefreshStrategy {
    /// Builds a strategy posting refresh requests to `token_endpoint`.
    pub fn new(token_endpoint: impl Into<String>) -> Self {
        Self {
            token_endpoint: token_endpoint.into(),
            http: HttpClient::with_timeout(Duration::from_secs(20)),
        }
    }
}

#[async_trait]
impl RefreshStrategy for GoogleOidcRefreshStrategy {
    #[instrument(skip(self, account), fields(account_key = %account.key))]
    async fn refresh(&self, account: &AccountRecord) -> Result<RefreshedTokens, RefreshError> {
        let refresh_token = account
            .refresh_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(RefreshError::NoRefreshToken)?;

        let client_id = account
            .extras
            .client_id
            .as_deref()
            .ok_or(RefreshError::MissingClientCredentials)?;
        let client_secret = account
            .extras
            .client_secret
            .as_deref()
            .ok_or(RefreshError::MissingClientCredentials)?;

        debug!(endpoint = %self.token_endpoint, "Refreshing via Google-style OIDC");

        let form = RefreshForm {
            client_id,
            client_secret,
            refresh_token,
            grant_type: "refresh_token",
        };

        let response = self
            .http
            .post_form(&self.token_endpoint, &form)
            .await
            .map_err(|e| RefreshError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            if status.as_u16() == 400 || status.as_u16() == 401 {
                return Err(RefreshError::Expired);
            }
            return Err(RefreshError::Http4xx {
                code: status.as_u16(),
                body,
            });
        }
        if status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(RefreshError::Http5xx {
                code: status.as_u16(),
                body,
            });
        }

        let parsed: TokenResponse = response
            .json()
            .await
            .map_err(|e| RefreshError::DecodeError(e.to_string()))?;

        let expires_at = parsed
            .expires_in
            .map(|secs| Utc::now() + chrono::Duration::seconds(secs));

        Ok(RefreshedTokens {
            access_token: parsed.access_token,
            expires_at,
            refresh_token: parsed.refresh_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quotio_core::ProviderKind;

    #[tokio::test]
    async fn missing_refresh_token_is_rejected() {
        let strategy = GoogleOidcRefreshStrategy::new("https://example.invalid/token");
        let account = AccountRecord::new("codex-jane", ProviderKind::Codex);
        let err = strategy.refresh(&account).await.unwrap_err();
        assert!(matches!(err, RefreshError::NoRefreshToken));
    }

    #[tokio::test]
    async fn missing_client_credentials_is_rejected() {
        let strategy = GoogleOidcRefreshStrategy::new("https://example.invalid/token");
        let mut account = AccountRecord::new("codex-jane", ProviderKind::Codex);
        account.refresh_token = Some("rt".to_string());
        let err = strategy.refresh(&account).await.unwrap_err();
        assert!(matches!(err, RefreshError::MissingClientCredentials));
    }
}
