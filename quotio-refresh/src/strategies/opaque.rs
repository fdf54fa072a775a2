//! Opaque API-key accounts (Claude, Zai, Kimi): there is no refresh step.
//! A refresh is only ever attempted because `expires_at` is set and the
//! buffer window elapsed, which should not happen for these providers, but
//! if it does, the correct answer is always [`RefreshError::NoRefreshToken`].

use async_trait::async_trait;
use quotio_core::AccountRecord;

use crate::error::RefreshError;
use crate::strategy::{RefreshStrategy, RefreshedTokens};

/// No-op strategy for providers with no refresh-token grant at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpaqueApiKeyStrategy;

impl OpaqueApiKeyStrategy {
    /// Builds a new strategy.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RefreshStrategy for OpaqueApiKeyStrategy {
    async fn refresh(&self, _account: &AccountRecord) -> Result<RefreshedTokens, RefreshError> {
        Err(RefreshError::NoRefreshToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quotio_core::ProviderKind;

    #[tokio::test]
    async fn always_reports_no_refresh_token() {
        let strategy = OpaqueApiKeyStrategy::new();
        let account = AccountRecord::new("claude-jane", ProviderKind::Claude);
        let err = strategy.refresh(&account).await.unwrap_err();
        assert!(matches!(err, RefreshError::NoRefreshToken));
    }
}
