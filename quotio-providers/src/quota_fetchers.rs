//! [`QuotaFetcher`] implementations wiring the per-provider fetch logic
//! up to an [`AccountRecord`].
//!
//! Providers split into two families here. Claude, Copilot, Gemini and
//! Zai already expose an API client method parameterized by a bearer
//! token, so those fetch the specific account passed in. The rest only
//! expose a zero-argument `fetch_usage()` that reads whatever CLI tool,
//! browser cookie jar, or service-account file is present on the local
//! machine — there is no way to scope those to one of several accounts
//! on disk, so they report against the single local session and ignore
//! `account.access_token` except for attribution.

use async_trait::async_trait;
use quotio_core::{AccountRecord, CoreError, ProviderKind, QuotaFetcher, QuotaSnapshot};

use crate::antigravity::AntigravityUsageFetcher;
use crate::augment::{AugmentError, AugmentUsageFetcher};
use crate::claude::{ClaudeApiClient, ClaudeError};
use crate::codex::CodexUsageFetcher;
use crate::copilot::{CopilotApiClient, CopilotError};
use crate::cursor::{CursorError, CursorUsageFetcher};
use crate::factory::{FactoryError, FactoryUsageFetcher};
use crate::gemini::{GeminiApiClient, GeminiError};
use crate::kimi::KimiUsageFetcher;
use crate::kiro::KiroUsageFetcher;
use crate::minimax::{MiniMaxError, MiniMaxUsageFetcher};
use crate::vertexai::{VertexAIError, VertexAIUsageFetcher};
use crate::zai::{ZaiApiClient, ZaiError};

/// Reclassifies a provider error carrying an HTTP-shaped authentication or
/// rate-limit failure into the structured [`CoreError`] kinds the
/// orchestrator retries and cools accounts down on. Anything else collapses
/// to [`CoreError::Other`].
macro_rules! classify_http_error {
    ($fn_name:ident, $err_ty:ty, auth) => {
        fn $fn_name(e: $err_ty) -> CoreError {
            match e {
                <$err_ty>::AuthenticationFailed(msg) => CoreError::Forbidden(msg),
                other => CoreError::Other(other.to_string()),
            }
        }
    };
    ($fn_name:ident, $err_ty:ty, auth_and_rate_limit) => {
        fn $fn_name(e: $err_ty) -> CoreError {
            match e {
                <$err_ty>::AuthenticationFailed(msg) => CoreError::Forbidden(msg),
                <$err_ty>::RateLimited { retry_after } => CoreError::RateLimited { retry_after },
                other => CoreError::Other(other.to_string()),
            }
        }
    };
}

classify_http_error!(classify_claude, ClaudeError, auth);
classify_http_error!(classify_zai, ZaiError, auth);
classify_http_error!(classify_augment, AugmentError, auth);
classify_http_error!(classify_factory, FactoryError, auth);
classify_http_error!(classify_minimax, MiniMaxError, auth);
classify_http_error!(classify_vertexai, VertexAIError, auth);
classify_http_error!(classify_copilot, CopilotError, auth_and_rate_limit);
classify_http_error!(classify_gemini, GeminiError, auth_and_rate_limit);
classify_http_error!(classify_cursor, CursorError, auth_and_rate_limit);

/// Fetches Claude usage directly against the stored account's access token.
#[derive(Debug, Default)]
pub struct ClaudeQuotaFetcher;

#[async_trait]
impl QuotaFetcher for ClaudeQuotaFetcher {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Claude
    }

    async fn fetch(&self, account: &AccountRecord) -> Result<QuotaSnapshot, CoreError> {
        let response = ClaudeApiClient::new()
            .fetch_usage_with_token(&account.access_token)
            .await
            .map_err(classify_claude)?;
        Ok(QuotaSnapshot::from_usage_snapshot(&response.to_snapshot()))
    }
}

/// Fetches Copilot usage directly against the stored account's access token.
#[derive(Debug, Default)]
pub struct CopilotQuotaFetcher;

#[async_trait]
impl QuotaFetcher for CopilotQuotaFetcher {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Copilot
    }

    async fn fetch(&self, account: &AccountRecord) -> Result<QuotaSnapshot, CoreError> {
        let usage = CopilotApiClient::new()
            .fetch_all(&account.access_token)
            .await
            .map_err(classify_copilot)?;
        Ok(QuotaSnapshot::from_usage_snapshot(&usage.to_snapshot()))
    }
}

/// Fetches Gemini usage directly against the stored account's access token.
#[derive(Debug, Default)]
pub struct GeminiQuotaFetcher;

#[async_trait]
impl QuotaFetcher for GeminiQuotaFetcher {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    async fn fetch(&self, account: &AccountRecord) -> Result<QuotaSnapshot, CoreError> {
        let quota = GeminiApiClient::new()
            .fetch_all(&account.access_token, None, None)
            .await
            .map_err(classify_gemini)?;
        Ok(QuotaSnapshot::from_usage_snapshot(&quota.to_snapshot()))
    }
}

/// Fetches Zai usage directly against the stored account's access token.
#[derive(Debug, Default)]
pub struct ZaiQuotaFetcher;

#[async_trait]
impl QuotaFetcher for ZaiQuotaFetcher {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Zai
    }

    async fn fetch(&self, account: &AccountRecord) -> Result<QuotaSnapshot, CoreError> {
        let usage = ZaiApiClient::new()
            .fetch_usage(&account.access_token)
            .await
            .map_err(classify_zai)?;
        Ok(QuotaSnapshot::from_usage_snapshot(&usage.to_snapshot()))
    }
}

/// Generates a `QuotaFetcher` that delegates to a zero-argument local
/// `XxxUsageFetcher::new().fetch_usage()` entry point, ignoring the
/// account's stored token since the underlying fetcher reads local
/// CLI/browser/service-account state directly rather than an account-scoped
/// credential.
macro_rules! local_quota_fetcher {
    ($name:ident, $kind:expr, $inner:ty) => {
        local_quota_fetcher!($name, $kind, $inner, |e| CoreError::Other(e.to_string()));
    };
    ($name:ident, $kind:expr, $inner:ty, $classify:expr) => {
        #[doc = concat!(
            "Delegates to [`", stringify!($inner), "`], which reads local session state ",
            "rather than an account-scoped token."
        )]
        #[derive(Debug, Default)]
        pub struct $name;

        #[async_trait]
        impl QuotaFetcher for $name {
            fn kind(&self) -> ProviderKind {
                $kind
            }

            async fn fetch(&self, _account: &AccountRecord) -> Result<QuotaSnapshot, CoreError> {
                let snapshot = <$inner>::new()
                    .fetch_usage()
                    .await
                    .map_err($classify)?;
                Ok(QuotaSnapshot::from_usage_snapshot(&snapshot))
            }
        }
    };
}

local_quota_fetcher!(CodexQuotaFetcher, ProviderKind::Codex, CodexUsageFetcher);
local_quota_fetcher!(CursorQuotaFetcher, ProviderKind::Cursor, CursorUsageFetcher, classify_cursor);
local_quota_fetcher!(FactoryQuotaFetcher, ProviderKind::Factory, FactoryUsageFetcher, classify_factory);
local_quota_fetcher!(AugmentQuotaFetcher, ProviderKind::Augment, AugmentUsageFetcher, classify_augment);
local_quota_fetcher!(KiroQuotaFetcher, ProviderKind::Kiro, KiroUsageFetcher);
local_quota_fetcher!(MiniMaxQuotaFetcher, ProviderKind::MiniMax, MiniMaxUsageFetcher, classify_minimax);
local_quota_fetcher!(
    AntigravityQuotaFetcher,
    ProviderKind::Antigravity,
    AntigravityUsageFetcher
);
local_quota_fetcher!(
    VertexAIQuotaFetcher,
    ProviderKind::VertexAI,
    VertexAIUsageFetcher,
    classify_vertexai
);
local_quota_fetcher!(KimiQuotaFetcher, ProviderKind::Kimi, KimiUsageFetcher);

/// Builds one boxed [`QuotaFetcher`] per provider, in the order
/// [`crate::registry::ProviderRegistry`] lists them.
pub fn all_fetchers() -> Vec<Box<dyn QuotaFetcher>> {
    vec![
        Box::new(CodexQuotaFetcher),
        Box::new(ClaudeQuotaFetcher),
        Box::new(CursorQuotaFetcher),
        Box::new(CopilotQuotaFetcher),
        Box::new(GeminiQuotaFetcher),
        Box::new(VertexAIQuotaFetcher),
        Box::new(FactoryQuotaFetcher),
        Box::new(ZaiQuotaFetcher),
        Box::new(AugmentQuotaFetcher),
        Box::new(KiroQuotaFetcher),
        Box::new(MiniMaxQuotaFetcher),
        Box::new(AntigravityQuotaFetcher),
        Box::new(KimiQuotaFetcher),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetcher_kinds_cover_all_thirteen_providers() {
        let fetchers = all_fetchers();
        assert_eq!(fetchers.len(), 13);
        assert!(fetchers.iter().any(|f| f.kind() == ProviderKind::Claude));
        assert!(fetchers.iter().any(|f| f.kind() == ProviderKind::Codex));
        assert!(fetchers.iter().any(|f| f.kind() == ProviderKind::Kimi));
    }
}
