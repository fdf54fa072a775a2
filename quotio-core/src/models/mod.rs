//! Domain models for Quotio.
//!
//! This module contains the core data structures representing provider
//! accounts, credentials, quotas, and the daemon's process/tracking state.
//!
//! ## Submodules
//!
//! - [`provider`] - Provider types (ProviderKind, Identity, Metadata, Branding)
//! - [`account`] - Credential/account types (AccountMeta, AccountRecord, AccountStatus)
//! - [`quota`] - Normalized quota types (QuotaSnapshot, ModelQuota)
//! - [`process`] - Proxy child-process and request-tracking types
//! - [`usage`] - Legacy usage types retained by individual fetchers (UsageSnapshot, Credits, Quota)
//! - [`cost`] - Cost tracking (CostUsageSnapshot, DailyUsageEntry)
//! - [`status`] - Status and fetch types (ProviderStatus, FetchSource)

mod account;
mod api_key;
mod cost;
mod process;
mod provider;
mod quota;
mod status;
mod usage;

// Re-export everything at the models level
pub use account::{AccountExtras, AccountMeta, AccountRecord, AccountStatus};
pub use api_key::ApiKeyRecord;
pub use cost::{CostUsageSnapshot, DailyUsageEntry, ModelBreakdown};
pub use process::{ProxyProcessState, RequestLogEntry};
pub use provider::{
    IconStyle, LoginMethod, Provider, ProviderBranding, ProviderColor, ProviderIdentity,
    ProviderKind, ProviderMetadata,
};
pub use quota::{ModelQuota, QuotaSnapshot};
pub use status::{FetchSource, ProviderStatus, StatusIndicator};
pub use usage::{Credits, Quota, UsageData, UsageSnapshot, UsageWindow};
#[cfg(test)]
mod serde_tests;
