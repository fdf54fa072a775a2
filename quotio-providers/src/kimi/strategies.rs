//! Kimi fetch strategies.

use async_trait::async_trait;
use quotio_fetch::{FetchContext, FetchError, FetchKind, FetchResult, FetchStrategy, ProcessError};
use tracing::{debug, instrument};

use super::error::KimiError;
use super::fetcher::KimiUsageFetcher;

/// PTY-driven Kimi fetch strategy.
pub struct KimiPtyStrategy;

impl KimiPtyStrategy {
    /// Creates a new PTY strategy.
    pub fn new() -> Self {
        Self
    }
}

impl Default for KimiPtyStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FetchStrategy for KimiPtyStrategy {
    fn id(&self) -> &str {
        "kimi.pty"
    }

    fn kind(&self) -> FetchKind {
        FetchKind::CLI
    }

    #[instrument(skip(self, _ctx))]
    async fn is_available(&self, _ctx: &FetchContext) -> bool {
        KimiUsageFetcher::is_available()
    }

    #[instrument(skip(self, _ctx))]
    async fn fetch(&self, _ctx: &FetchContext) -> Result<FetchResult, FetchError> {
        debug!("Fetching Kimi usage via PTY");

        let snapshot = KimiUsageFetcher::new().fetch_usage().await.map_err(|e| match e {
            KimiError::BinaryNotFound(bin) => FetchError::Process(ProcessError::NotFound(bin)),
            other => FetchError::InvalidResponse(other.to_string()),
        })?;

        Ok(FetchResult::new(snapshot, self.id(), self.kind()))
    }

    fn priority(&self) -> u32 {
        100
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_metadata() {
        let s = KimiPtyStrategy::new();
        assert_eq!(s.id(), "kimi.pty");
        assert_eq!(s.kind(), FetchKind::CLI);
        assert_eq!(s.priority(), 100);
    }
}
