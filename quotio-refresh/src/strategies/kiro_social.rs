//! Kiro's "Social" refresh endpoint: its own request/response envelope,
//! distinct from the Google-style grant used elsewhere.

use async_trait::async_trait;
use chrono::Utc;
use quotio_core::AccountRecord;
use quotio_fetch::HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::RefreshError;
use crate::strategy::{RefreshStrategy, RefreshedTokens};

const KIRO_REFRESH_URL: &str = "https://prod.us-east-1.auth.desktop.kiro.dev/refreshToken";

#[derive(Serialize)]
struct KiroRefreshRequest<'a> {
    #[serde(rename = "refreshToken")]
    refresh_token: &'a str,
}

#[derive(Deserialize)]
struct KiroRefreshResponse {
    #[serde(rename = "accessToken")]
    access_token: String,
    #[serde(rename = "refreshToken")]
    refresh_token: Option<String>,
    #[serde(rename = "expiresIn")]
    expires_in: Option<i64>,
}

/// Kiro's own refresh strategy, keyed on its "Social" login.
pub struct KiroSocialRefreshStrategy {
    http: HttpClient,
}

impl KiroSocialRefreshStrategy {
    /// Builds a new strategy.
    pub fn new() -> Self {
        Self {
            http: HttpClient::with_timeout(Duration::from_secs(20)),
        }
    }
}

impl Default for KiroSocialRefreshStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RefreshStrategy for KiroSocialRefreshStrategy {
    #[instrument(skip(self, account), fields(account_key = %account.key))]
    async fn refresh(&self, account: &AccountRecord) -> Result<RefreshedTokens, RefreshError> {
        let refresh_token = account
            .refresh_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(RefreshError::NoRefreshToken)?;

        debug!("Refreshing via Kiro's Social endpoint");

        let body = KiroRefreshRequest { refresh_token };
        let response = self
            .http
            .post_json(KIRO_REFRESH_URL, &body)
            .await
            .map_err(|e| RefreshError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 400 || status.as_u16() == 401 {
            return Err(RefreshError::Expired);
        }
        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
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

        let parsed: KiroRefreshResponse = response
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
        let strategy = KiroSocialRefreshStrategy::new();
        let account = AccountRecord::new("kiro-jane", ProviderKind::Kiro);
        let err = strategy.refresh(&account).await.unwrap_err();
        assert!(matches!(err, RefreshError::NoRefreshToken));
    }
}
