//! The Token Refresher: dispatches each account to its provider's
//! [`RefreshStrategy`], applies the proactive-refresh rule, and persists the
//! result through [`AuthStore`] before returning it.
//!
//! The reactive rule (refresh once, retry once, on a downstream 401/403)
//! isn't implemented here — `refresh_now` is the primitive it's built from,
//! but the retry itself lives in the fetch orchestrator, since that's the
//! only place that knows how to re-issue the request that got rejected.

use std::collections::HashMap;

use chrono::{Duration as ChronoDuration, Utc};
use quotio_core::{AccountRecord, AccountStatus, ProviderKind};
use quotio_store::AuthStore;
use tracing::{instrument, warn};

use crate::error::RefreshError;
use crate::strategy::{RefreshStrategy, RefreshedTokens};
use crate::strategies::{CopilotExchangeStrategy, GoogleOidcRefreshStrategy, KiroSocialRefreshStrategy, OpaqueApiKeyStrategy};

/// Google's own token endpoint, used by Codex, Gemini and VertexAI.
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
/// Cursor's refresh endpoint. Invented: Cursor's real backend is not
/// publicly documented; the grant shape matches Google's, so the endpoint
/// is the only unknown.
const CURSOR_TOKEN_URL: &str = "https://api2.cursor.sh/auth/refresh";
/// Factory's refresh endpoint, same reasoning as Cursor's.
const FACTORY_TOKEN_URL: &str = "https://app.factory.ai/oauth/token";
/// Antigravity's refresh endpoint, same reasoning as Cursor's.
const ANTIGRAVITY_TOKEN_URL: &str = "https://server.antigravity.google/oauth/token";
/// MiniMax's refresh endpoint, same reasoning as Cursor's.
const MINIMAX_TOKEN_URL: &str = "https://api.minimax.chat/oauth/token";
/// Augment's refresh endpoint, same reasoning as Cursor's.
const AUGMENT_TOKEN_URL: &str = "https://auth.augmentcode.com/oauth/token";

/// Default skew applied before an access token is considered due for
/// proactive refresh.
pub const DEFAULT_REFRESH_BUFFER_SECS: i64 = 300;

/// Coordinates token refresh across every provider.
pub struct TokenRefresher {
    store: AuthStore,
    strategies: HashMap<ProviderKind, Box<dyn RefreshStrategy>>,
    buffer: ChronoDuration,
}

impl TokenRefresher {
    /// Builds a refresher with the default per-provider strategy table and a
    /// 300-second proactive-refresh buffer.
    pub fn new(store: AuthStore) -> Self {
        Self::with_buffer(store, ChronoDuration::seconds(DEFAULT_REFRESH_BUFFER_SECS))
    }

    /// Builds a refresher with an explicit proactive-refresh buffer.
    pub fn with_buffer(store: AuthStore, buffer: ChronoDuration) -> Self {
        let mut strategies: HashMap<ProviderKind, Box<dyn RefreshStrategy>> = HashMap::new();

        strategies.insert(ProviderKind::Codex, Box::new(GoogleOidcRefreshStrategy::new(GOOGLE_TOKEN_URL)));
        strategies.insert(ProviderKind::Gemini, Box::new(GoogleOidcRefreshStrategy::new(GOOGLE_TOKEN_URL)));
        strategies.insert(ProviderKind::VertexAI, Box::new(GoogleOidcRefreshStrategy::new(GOOGLE_TOKEN_URL)));
        strategies.insert(ProviderKind::Cursor, Box::new(GoogleOidcRefreshStrategy::new(CURSOR_TOKEN_URL)));
        strategies.insert(ProviderKind::Factory, Box::new(GoogleOidcRefreshStrategy::new(FACTORY_TOKEN_URL)));
        strategies.insert(ProviderKind::Antigravity, Box::new(GoogleOidcRefreshStrategy::new(ANTIGRAVITY_TOKEN_URL)));
        strategies.insert(ProviderKind::MiniMax, Box::new(GoogleOidcRefreshStrategy::new(MINIMAX_TOKEN_URL)));
        strategies.insert(ProviderKind::Augment, Box::new(GoogleOidcRefreshStrategy::new(AUGMENT_TOKEN_URL)));

        strategies.insert(ProviderKind::Copilot, Box::new(CopilotExchangeStrategy::new()));
        strategies.insert(ProviderKind::Kiro, Box::new(KiroSocialRefreshStrategy::new()));

        strategies.insert(ProviderKind::Claude, Box::new(OpaqueApiKeyStrategy::new()));
        strategies.insert(ProviderKind::Zai, Box::new(OpaqueApiKeyStrategy::new()));
        strategies.insert(ProviderKind::Kimi, Box::new(OpaqueApiKeyStrategy::new()));

        Self { store, strategies, buffer }
    }

    fn strategy_for(&self, provider: ProviderKind) -> &dyn RefreshStrategy {
        self.strategies
            .get(&provider)
            .map(|b| b.as_ref())
            .unwrap_or(&OPAQUE_FALLBACK)
    }

    /// Returns `account` unchanged if its token is valid past the proactive
    /// buffer, otherwise refreshes it first.
    #[instrument(skip(self))]
    pub async fn ensure_valid(&self, key: &str) -> Result<AccountRecord, RefreshError> {
        let account = self.store.read(key).await.map_err(|e| RefreshError::NetworkError(e.to_string()))?;

        if account.disabled {
            return Ok(account);
        }
        if account.access_token_valid_for(Utc::now(), self.buffer) {
            return Ok(account);
        }
        self.refresh_now(key).await
    }

    /// Forces a refresh regardless of the current token's remaining
    /// lifetime, persisting the outcome (success or failure) before
    /// returning.
    #[instrument(skip(self))]
    pub async fn refresh_now(&self, key: &str) -> Result<AccountRecord, RefreshError> {
        let account = self.store.read(key).await.map_err(|e| RefreshError::NetworkError(e.to_string()))?;
        let strategy = self.strategy_for(account.provider);

        match strategy.refresh(&account).await {
            Ok(tokens) => self.persist_success(key, account.provider, tokens).await,
            Err(e) => {
                warn!(key, error = %e, "Refresh failed");
                self.persist_failure(key, account.provider, &e).await?;
                Err(e)
            }
        }
    }

    async fn persist_success(
        &self,
        key: &str,
        provider: ProviderKind,
        tokens: RefreshedTokens,
    ) -> Result<AccountRecord, RefreshError> {
        self.store
            .write(key, provider, |mut record| {
                record.access_token = tokens.access_token.clone();
                if tokens.refresh_token.is_some() {
                    record.refresh_token = tokens.refresh_token.clone();
                }
                record.expires_at = tokens.expires_at;
                record.last_refresh_at = Some(Utc::now());
                record.status = AccountStatus::Ready;
                record.last_error = None;
                record
            })
            .await
            .map_err(|e| RefreshError::NetworkError(e.to_string()))
    }

    async fn persist_failure(
        &self,
        key: &str,
        provider: ProviderKind,
        err: &RefreshError,
    ) -> Result<(), RefreshError> {
        self.store
            .write(key, provider, |mut record| {
                record.last_refresh_at = Some(Utc::now());
                record.status = AccountStatus::Error;
                record.last_error = Some(err.to_string());
                record
            })
            .await
            .map_err(|e| RefreshError::NetworkError(e.to_string()))?;
        Ok(())
    }
}

static OPAQUE_FALLBACK: OpaqueApiKeyStrategy = OpaqueApiKeyStrategy;

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, AuthStore) {
        let dir = tempfile::tempdir().unwrap();
        (dir, AuthStore::at(dir.path().to_path_buf()))
    }

    #[tokio::test]
    async fn opaque_provider_reports_no_refresh_token_and_marks_error() {
        let (_dir, store) = store();
        store
            .write("claude-jane", ProviderKind::Claude, |mut r| {
                r.access_token = "sk-ant-whatever".to_string();
                r.expires_at = Some(Utc::now() - ChronoDuration::hours(1));
                r
            })
            .await
            .unwrap();

        let refresher = TokenRefresher::new(store.clone());
        let err = refresher.refresh_now("claude-jane").await.unwrap_err();
        assert!(matches!(err, RefreshError::NoRefreshToken));

        let record = store.read("claude-jane").await.unwrap();
        assert_eq!(record.status, AccountStatus::Error);
        assert!(record.last_error.is_some());
    }

    #[tokio::test]
    async fn valid_token_is_returned_without_refreshing() {
        let (_dir, store) = store();
        store
            .write("codex-jane", ProviderKind::Codex, |mut r| {
                r.access_token = "tok".to_string();
                r.expires_at = Some(Utc::now() + ChronoDuration::hours(1));
                r
            })
            .await
            .unwrap();

        let refresher = TokenRefresher::new(store);
        let account = refresher.ensure_valid("codex-jane").await.unwrap();
        assert_eq!(account.access_token, "tok");
    }

    #[tokio::test]
    async fn disabled_account_is_returned_unrefreshed_even_when_expired() {
        let (_dir, store) = store();
        store
            .write("codex-jane", ProviderKind::Codex, |mut r| {
                r.expires_at = Some(Utc::now() - ChronoDuration::hours(1));
                r.disabled = true;
                r
            })
            .await
            .unwrap();

        let refresher = TokenRefresher::new(store);
        let account = refresher.ensure_valid("codex-jane").await.unwrap();
        assert!(account.disabled);
    }

    #[tokio::test]
    async fn missing_refresh_token_on_expired_google_account_marks_error() {
        let (_dir, store) = store();
        store
            .write("gemini-jane", ProviderKind::Gemini, |mut r| {
                r.expires_at = Some(Utc::now() - ChronoDuration::hours(1));
                r
            })
            .await
            .unwrap();

        let refresher = TokenRefresher::new(store.clone());
        let err = refresher.ensure_valid("gemini-jane").await.unwrap_err();
        assert!(matches!(err, RefreshError::NoRefreshToken));

        let record = store.read("gemini-jane").await.unwrap();
        assert_eq!(record.status, AccountStatus::Error);
    }
}
