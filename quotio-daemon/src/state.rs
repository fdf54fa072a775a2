//! Shared daemon state, constructed once at boot and handed to every
//! handler behind an `Arc`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use quotio_providers::QuotaRegistry;
use quotio_proxy::ProxySupervisor;
use quotio_refresh::TokenRefresher;
use quotio_store::{AuthStore, Config};
use quotio_tracker::RequestTracker;
use tokio::sync::{Notify, RwLock};

use crate::oauth::OAuthSessions;

/// Port `proxy.start` binds to when the caller doesn't name one.
pub const DEFAULT_PROXY_PORT: u16 = 8317;

/// Everything a method handler might need, wired once at startup.
pub struct AppState {
    /// Account credential store.
    pub store: AuthStore,
    /// Per-provider token refresh.
    pub refresher: Arc<TokenRefresher>,
    /// Per-provider quota fetch, with its own snapshot cache.
    pub quotas: Arc<QuotaRegistry>,
    /// Supervised child proxy process.
    pub proxy: Arc<ProxySupervisor>,
    /// In-memory request log and aggregates.
    pub tracker: Arc<RequestTracker>,
    /// Persisted key/value configuration document.
    pub config: Arc<RwLock<Config>>,
    /// In-flight `oauth.start`/`oauth.poll` sessions.
    pub oauth: Arc<OAuthSessions>,
    /// Signaled by `daemon.shutdown` to start the IPC server's drain.
    pub ipc_shutdown: Arc<Notify>,
    /// When this process started, for `daemon.status`'s `uptime_ms`.
    pub started_at: DateTime<Utc>,
    /// `CARGO_PKG_VERSION`, for `daemon.status`.
    pub version: &'static str,
}

impl AppState {
    /// Uptime in milliseconds, for `daemon.status`.
    pub fn uptime_ms(&self) -> i64 {
        (Utc::now() - self.started_at).num_milliseconds().max(0)
    }

    /// Port `proxy.start` uses when the caller omits one.
    pub fn proxy_default_port(&self) -> u16 {
        DEFAULT_PROXY_PORT
    }

    /// Stops the proxy if running and wakes every task waiting on
    /// `ipc_shutdown`. Shared by the `daemon.shutdown` handler and the
    /// SIGINT/SIGTERM signal task so both paths shut down identically.
    pub async fn initiate_shutdown(&self) {
        if self.proxy.status().await.running {
            let _ = self.proxy.stop().await;
        }
        self.ipc_shutdown.notify_waiters();
    }
}
