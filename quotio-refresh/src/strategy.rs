//! The [`RefreshStrategy`] trait every provider family implements.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quotio_core::AccountRecord;

use crate::error::RefreshError;

/// Result of a successful refresh: what changed on the account.
#[derive(Debug, Clone)]
pub struct RefreshedTokens {
    /// The new access token.
    pub access_token: String,
    /// New expiry, if the provider reports one.
    pub expires_at: Option<DateTime<Utc>>,
    /// Rotated refresh token, if the provider issued a new one.
    pub refresh_token: Option<String>,
}

/// One provider family's way of turning a refresh token (or long-lived
/// credential) into a fresh access token.
///
/// Object-safe (`#[async_trait]`) for the same reason
/// `quotio_core::QuotaFetcher` is: the Token Refresher dispatches by
/// `ProviderKind` over a dynamic table, one strategy instance per family.
#[async_trait]
pub trait RefreshStrategy: Send + Sync {
    /// Exchanges the account's current refresh token (or long-lived
    /// credential) for a fresh access token.
    async fn refresh(&self, account: &AccountRecord) -> Result<RefreshedTokens, RefreshError>;
}
