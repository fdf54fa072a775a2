//! Account and credential types.
//!
//! An [`AccountRecord`] is the in-memory, fully-typed view of one
//! `<provider>-<local-part>.json` credential file on disk. [`AccountMeta`] is
//! the slimmer view returned by `auth.list` (no tokens).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::provider::ProviderKind;

// ============================================================================
// Account Status
// ============================================================================

/// Lifecycle status of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    /// Usable; last refresh/fetch (if any) succeeded.
    #[default]
    Ready,
    /// In a `Retry-After` cooldown; fetchers skip it until it elapses.
    Cooling,
    /// Last refresh or fetch failed; `last_error` carries the message.
    Error,
}

// ============================================================================
// Account Extras
// ============================================================================

/// Provider-specific extra fields carried alongside the common envelope.
///
/// Unknown keys from the credential file are preserved verbatim in `extra`
/// so that a round-trip `read -> write(identity)` never drops data the
/// daemon doesn't itself understand.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AccountExtras {
    /// OAuth client id, when the provider's refresh flow needs one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// OAuth client secret, when the provider's refresh flow needs one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    /// Provider account/organization id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    /// Base URL override for this account (remote-mode / enterprise tenants).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Every other key present in the file, preserved verbatim.
    #[serde(flatten)]
    pub unknown: HashMap<String, serde_json::Value>,
}

// ============================================================================
// Account Record
// ============================================================================

/// Full, mutable record for one on-disk credential file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Stable key derived from the filename, e.g. `codex-jane`.
    #[serde(skip)]
    pub key: String,
    /// Which provider this account belongs to.
    pub provider: ProviderKind,
    /// Human display label (usually the account email).
    #[serde(default)]
    pub label: Option<String>,
    /// Current (possibly expired) access token.
    pub access_token: String,
    /// Refresh token, absent for opaque API-key accounts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Absolute instant the access token expires, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Timestamp of the last refresh attempt (successful or not).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_refresh_at: Option<DateTime<Utc>>,
    /// Provider-specific extras, plus anything unrecognized.
    #[serde(flatten)]
    pub extras: AccountExtras,
    /// User-requested disablement; disabled accounts are skipped by fetch_all.
    #[serde(default)]
    pub disabled: bool,
    /// Current lifecycle status.
    #[serde(default)]
    pub status: AccountStatus,
    /// Human-readable message for the last error, if `status == Error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    /// End of a `Retry-After` cooldown, if `status == Cooling`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooling_until: Option<DateTime<Utc>>,
}

impl AccountRecord {
    /// Builds a fresh, empty record for a new account key.
    pub fn new(key: impl Into<String>, provider: ProviderKind) -> Self {
        Self {
            key: key.into(),
            provider,
            label: None,
            access_token: String::new(),
            refresh_token: None,
            expires_at: None,
            last_refresh_at: None,
            extras: AccountExtras::default(),
            disabled: false,
            status: AccountStatus::default(),
            last_error: None,
            cooling_until: None,
        }
    }

    /// Returns the local-part of the key (everything after the first `-`).
    pub fn local_part(&self) -> &str {
        self.key
            .split_once('-')
            .map_or(self.key.as_str(), |(_, rest)| rest)
    }

    /// Returns `true` if the access token will still be valid after `buffer`.
    pub fn access_token_valid_for(&self, now: DateTime<Utc>, buffer: chrono::Duration) -> bool {
        match self.expires_at {
            Some(exp) => exp - now > buffer,
            None => true,
        }
    }

    /// Returns `true` if this account currently has no refresh token.
    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Builds the lightweight [`AccountMeta`] view used by `auth.list`.
    pub fn to_meta(&self) -> AccountMeta {
        AccountMeta {
            id: self.key.clone(),
            name: self.key.clone(),
            provider: self.provider,
            email: self.label.clone(),
            status: self.status,
            disabled: self.disabled,
        }
    }
}

// ============================================================================
// Account Meta
// ============================================================================

/// Slim, token-free view of an account for listing purposes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountMeta {
    /// Stable account key.
    pub id: String,
    /// Alias of `id`; kept because the wire method catalog names both.
    pub name: String,
    /// Provider this account belongs to.
    pub provider: ProviderKind,
    /// Display email, if known.
    pub email: Option<String>,
    /// Current lifecycle status.
    pub status: AccountStatus,
    /// Whether the user disabled this account.
    pub disabled: bool,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample(expires_at: Option<DateTime<Utc>>) -> AccountRecord {
        AccountRecord {
            key: "codex-jane".to_string(),
            provider: ProviderKind::Codex,
            label: Some("jane@example.com".to_string()),
            access_token: "at".to_string(),
            refresh_token: Some("rt".to_string()),
            expires_at,
            last_refresh_at: None,
            extras: AccountExtras::default(),
            disabled: false,
            status: AccountStatus::Ready,
            last_error: None,
            cooling_until: None,
        }
    }

    #[test]
    fn local_part_splits_on_first_dash() {
        let acc = sample(None);
        assert_eq!(acc.local_part(), "jane");
    }

    #[test]
    fn access_token_valid_with_no_expiry() {
        let acc = sample(None);
        assert!(acc.access_token_valid_for(Utc::now(), Duration::seconds(300)));
    }

    #[test]
    fn access_token_invalid_within_buffer() {
        let now = Utc::now();
        let acc = sample(Some(now + Duration::seconds(100)));
        assert!(!acc.access_token_valid_for(now, Duration::seconds(300)));
    }

    #[test]
    fn access_token_valid_outside_buffer() {
        let now = Utc::now();
        let acc = sample(Some(now + Duration::seconds(3600)));
        assert!(acc.access_token_valid_for(now, Duration::seconds(300)));
    }

    #[test]
    fn unknown_keys_round_trip_through_extras() {
        let json = serde_json::json!({
            "provider": "codex",
            "access_token": "at",
            "weird_vendor_field": "keep me",
        });
        let acc: AccountRecord = serde_json::from_value(json).unwrap();
        assert_eq!(
            acc.extras.unknown.get("weird_vendor_field").unwrap(),
            "keep me"
        );
    }

    #[test]
    fn to_meta_strips_tokens() {
        let acc = sample(None);
        let meta = acc.to_meta();
        assert_eq!(meta.provider, ProviderKind::Codex);
        assert_eq!(meta.email.as_deref(), Some("jane@example.com"));
    }
}
