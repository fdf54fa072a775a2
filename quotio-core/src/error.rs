//! Core error types for `Quotio`.

use thiserror::Error;

/// Core error type for `Quotio` operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Provider not found or not configured.
    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid data from API response.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Provider rejected the request as unauthenticated/unauthorized
    /// (HTTP 401/403) after the account's token was already current.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Provider answered HTTP 429; `retry_after` carries its `Retry-After`
    /// value in seconds when the provider sent one.
    #[error("Rate limited, retry after {retry_after:?}s")]
    RateLimited {
        /// Seconds to wait before the account is eligible to fetch again.
        retry_after: Option<u64>,
    },

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl CoreError {
    /// Returns `true` for a provider-reported 401/403.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, CoreError::Forbidden(_))
    }

    /// Returns the `Retry-After` hint, if this is a rate-limit error.
    pub fn retry_after(&self) -> Option<Option<u64>> {
        match self {
            CoreError::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}
