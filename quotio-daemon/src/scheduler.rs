//! Background task that periodically drives the Quota Fetcher Registry so
//! `quota.list` has something fresh to read without every caller forcing a
//! `quota.fetch`.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::state::AppState;

/// How often the scheduler runs a full `fetch_all` cycle.
const FETCH_INTERVAL: Duration = Duration::from_secs(300);

/// Runs forever, invoking `fetch_all` across every provider on
/// [`FETCH_INTERVAL`]. Errors are logged, never fatal to the daemon.
pub async fn run(state: Arc<AppState>) {
    let mut ticker = tokio::time::interval(FETCH_INTERVAL);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        match state.quotas.fetch_all(None).await {
            Ok(result) => info!(
                accounts = result.by_key.len(),
                errors = result.errors.len(),
                "Scheduled quota fetch completed"
            ),
            Err(e) => warn!(error = %e, "Scheduled quota fetch failed"),
        }
    }
}
