//! Per-provider token refresh.
//!
//! An [`AccountRecord`](quotio_core::AccountRecord) stores an access token
//! that eventually expires. This crate knows, for each provider, how to
//! trade a refresh token (or a long-lived credential) for a new one, and
//! wraps that in a [`refresher::TokenRefresher`] that applies the
//! proactive-refresh buffer and persists the outcome through
//! `quotio_store::AuthStore`.

pub mod error;
pub mod refresher;
pub mod strategy;
pub mod strategies;

pub use error::RefreshError;
pub use refresher::{TokenRefresher, DEFAULT_REFRESH_BUFFER_SECS};
pub use strategy::{RefreshStrategy, RefreshedTokens};
pub use strategies::{CopilotExchangeStrategy, GoogleOidcRefreshStrategy, KiroSocialRefreshStrategy, OpaqueApiKeyStrategy};
