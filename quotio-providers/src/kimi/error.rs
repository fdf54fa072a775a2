//! Kimi-specific error types.

use thiserror::Error;

/// Errors specific to Kimi operations.
#[derive(Debug, Error)]
pub enum KimiError {
    /// Kimi CLI binary not found on PATH.
    #[error("Kimi CLI binary not found: {0}")]
    BinaryNotFound(String),

    /// PTY session failed.
    #[error("PTY error: {0}")]
    PtyError(String),

    /// Failed to parse CLI output.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// No usage data could be extracted from the CLI output.
    #[error("No usage data available")]
    NoData,
}

impl From<quotio_fetch::PtyError> for KimiError {
    fn from(e: quotio_fetch::PtyError) -> Self {
        KimiError::PtyError(e.to_string())
    }
}
