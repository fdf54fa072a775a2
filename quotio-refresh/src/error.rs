//! Refresh error taxonomy.

use thiserror::Error;

/// Everything that can go wrong exchanging a refresh token for a new
/// access token.
#[derive(Debug, Error, Clone)]
pub enum RefreshError {
    /// The HTTP request itself failed (DNS, connect, TLS, timeout).
    #[error("network error refreshing token: {0}")]
    NetworkError(String),

    /// The token endpoint returned a 4xx status.
    #[error("refresh rejected ({code}): {body}")]
    Http4xx {
        /// HTTP status code.
        code: u16,
        /// Response body, truncated if huge.
        body: String,
    },

    /// The token endpoint returned a 5xx status.
    #[error("refresh endpoint failed ({code}): {body}")]
    Http5xx {
        /// HTTP status code.
        code: u16,
        /// Response body, truncated if huge.
        body: String,
    },

    /// The response body didn't parse as the expected token response.
    #[error("failed to decode refresh response: {0}")]
    DecodeError(String),

    /// The account has no refresh token to exchange.
    #[error("account has no refresh token")]
    NoRefreshToken,

    /// The strategy needs a client id/secret the account doesn't carry.
    #[error("missing client credentials for this account")]
    MissingClientCredentials,

    /// The refresh token itself has expired or been revoked.
    #[error("refresh token expired or revoked")]
    Expired,
}

impl RefreshError {
    /// Returns `true` for errors worth a brief backoff-and-retry, as
    /// opposed to ones that need a user action (re-auth) to resolve.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            RefreshError::NetworkError(_) | RefreshError::Http5xx { .. }
        )
    }
}
