//! GitHub Copilot's internal token exchange.
//!
//! Copilot's stored credential is a long-lived GitHub OAuth token, not a
//! refresh token — "refreshing" means re-exchanging it for a new
//! short-lived Copilot API token. Grounded on `copilot::device_flow`'s
//! GitHub-endpoint shape, generalized to the exchange endpoint Copilot
//! extensions poll for API tokens.

use async_trait::async_trait;
use chrono::Utc;
use quotio_core::AccountRecord;
use quotio_fetch::HttpClient;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::RefreshError;
use crate::strategy::{RefreshStrategy, RefreshedTokens};

const COPILOT_TOKEN_EXCHANGE_URL: &str = "https://api.github.com/copilot_internal/v2/token";

#[derive(Debug, Deserialize)]
struct CopilotTokenResponse {
    token: String,
    expires_at: Option<i64>,
}

/// Exchanges the stored GitHub OAuth token for a short-lived Copilot API
/// token. Never returns [`RefreshError::NoRefreshToken`] — the exchange
/// input is `access_token`, not `refresh_token`.
pub struct CopilotExchangeStrategy {
    http: HttpClient,
}

impl CopilotExchangeStrategy {
    /// Builds a new exchange strategy.
    pub fn new() -> Self {
        Self {
            http: HttpClient::with_timeout(Duration::from_secs(15)),
        }
    }
}

impl Default for CopilotExchangeStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RefreshStrategy for CopilotExchangeStrategy {
    #[instrument(skip(self, account), fields(account_key = %account.key))]
    async fn refresh(&self, account: &AccountRecord) -> Result<RefreshedTokens, RefreshError> {
        if account.access_token.is_empty() {
            return Err(RefreshError::MissingClientCredentials);
        }

        debug!("Exchanging GitHub OAuth token for a Copilot API token");

        let auth_header = format!("token {}", account.access_token);
        let response = self
            .http
            .get_with_auth(COPILOT_TOKEN_EXCHANGE_URL, &auth_header)
            .await
            .map_err(|e| RefreshError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
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

        let parsed: CopilotTokenResponse = response
            .json()
            .await
            .map_err(|e| RefreshError::DecodeError(e.to_string()))?;

        let expires_at = parsed
            .expires_at
            .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0));
        let expires_at = expires_at.or_else(|| Some(Utc::now() + chrono::Duration::minutes(25)));

        Ok(RefreshedTokens {
            access_token: parsed.token,
            expires_at,
            refresh_token: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quotio_core::ProviderKind;

    #[tokio::test]
    async fn empty_access_token_is_rejected() {
        let strategy = CopilotExchangeStrategy::new();
        let account = AccountRecord::new("copilot-jane", ProviderKind::Copilot);
        let err = strategy.refresh(&account).await.unwrap_err();
        assert!(matches!(err, RefreshError::MissingClientCredentials));
    }
}
