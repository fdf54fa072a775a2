//! Main Kimi usage fetcher.

use chrono::Utc;
use quotio_core::{ProviderIdentity, ProviderKind, UsageSnapshot, UsageWindow};
use tracing::{info, instrument};

use super::error::KimiError;
use super::pty_probe::{KimiPtyProbe, KimiUsageSnapshot};

/// Main Kimi usage fetcher. Kimi has no usage API, so this always goes
/// through the PTY probe.
#[derive(Debug, Clone, Default)]
pub struct KimiUsageFetcher;

impl KimiUsageFetcher {
    /// Creates a new fetcher.
    pub fn new() -> Self {
        Self
    }

    /// Returns `true` if the `kimi` CLI is on `PATH`.
    pub fn is_available() -> bool {
        KimiPtyProbe::is_available()
    }

    /// Fetches usage data via the PTY probe.
    #[instrument(skip(self))]
    pub async fn fetch_usage(&self) -> Result<UsageSnapshot, KimiError> {
        let probe = KimiPtyProbe::new();
        let snapshot = probe.fetch_usage().await?;
        info!("Fetched Kimi usage via PTY");
        Ok(convert_snapshot(&snapshot))
    }
}

fn convert_snapshot(snapshot: &KimiUsageSnapshot) -> UsageSnapshot {
    let mut usage = UsageSnapshot::new();
    usage.updated_at = Utc::now();

    if let Some(left) = snapshot.primary_left_percent {
        usage.primary = Some(UsageWindow {
            reset_description: snapshot.primary_reset.clone(),
            ..UsageWindow::new((100.0 - left).max(0.0))
        });
    }
    if let Some(left) = snapshot.secondary_left_percent {
        usage.secondary = Some(UsageWindow {
            reset_description: snapshot.secondary_reset.clone(),
            ..UsageWindow::new((100.0 - left).max(0.0))
        });
    }

    if snapshot.plan.is_some() {
        let mut identity = ProviderIdentity::new(ProviderKind::Kimi);
        identity.plan_name = snapshot.plan.clone();
        usage.identity = Some(identity);
    }

    usage
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::pty_probe::KimiUsageSnapshot;

    #[test]
    fn test_fetcher_creation() {
        let _ = KimiUsageFetcher::new();
    }

    #[test]
    fn test_is_available() {
        let _ = KimiUsageFetcher::is_available();
    }

    #[test]
    fn convert_snapshot_maps_windows_and_plan() {
        let parsed = KimiUsageSnapshot {
            primary_left_percent: Some(37.0),
            primary_reset: Some("2h14m".to_string()),
            secondary_left_percent: Some(88.0),
            secondary_reset: None,
            plan: Some("Kimi+".to_string()),
            raw_output: String::new(),
        };
        let usage = convert_snapshot(&parsed);
        assert_eq!(usage.primary.as_ref().unwrap().used_percent, 63.0);
        assert_eq!(usage.primary.unwrap().reset_description, Some("2h14m".to_string()));
        assert_eq!(usage.secondary.unwrap().used_percent, 12.0);
        assert_eq!(usage.identity.unwrap().plan_name, Some("Kimi+".to_string()));
    }
}
