//! The daemon's top-level error type and its mapping onto the wire-facing
//! [`RpcError`].

use quotio_ipc::{
    CODE_AGENT_NOT_FOUND, CODE_AUTH_FAILED, CODE_CONFIG_ERROR, CODE_DAEMON_ALREADY_RUNNING,
    CODE_DAEMON_NOT_RUNNING, CODE_INTERNAL_ERROR, CODE_PROVIDER_NOT_FOUND, CODE_PROXY_NOT_RUNNING,
    RpcError,
};
use thiserror::Error;

/// Everything that can go wrong running the daemon, from a single failed
/// RPC handler up to a fatal startup condition.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// A PID file names a process that is still alive.
    #[error("another quotiod instance is already running (pid {0})")]
    AlreadyRunning(u32),

    /// The store rejected a read/write.
    #[error("store error: {0}")]
    Store(#[from] quotio_store::StoreError),

    /// A token refresh failed.
    #[error("refresh error: {0}")]
    Refresh(#[from] quotio_refresh::RefreshError),

    /// A quota fetch failed at the core level.
    #[error("fetch error: {0}")]
    Core(#[from] quotio_core::CoreError),

    /// The proxy supervisor reported an error.
    #[error("proxy error: {0}")]
    Proxy(#[from] quotio_proxy::ProxyError),

    /// Binding or serving the IPC socket failed.
    #[error("ipc error: {0}")]
    Ipc(#[from] quotio_ipc::IpcError),

    /// No such account key.
    #[error("account not found: {0}")]
    AgentNotFound(String),

    /// No such provider name.
    #[error("unknown provider: {0}")]
    ProviderNotFound(String),

    /// The proxy isn't running.
    #[error("proxy is not running")]
    ProxyNotRunning,

    /// A `daemon.*` method requires the daemon to already be up; used by
    /// clients dialing a socket whose owner just shut down mid-call.
    #[error("daemon is not running")]
    DaemonNotRunning,

    /// Malformed or out-of-range `params`.
    #[error("invalid params: {0}")]
    InvalidParams(String),

    /// A filesystem operation outside the Store/Tracker/Proxy failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<&DaemonError> for RpcError {
    fn from(err: &DaemonError) -> Self {
        match err {
            DaemonError::AlreadyRunning(pid) => {
                RpcError::new(CODE_DAEMON_ALREADY_RUNNING, format!("daemon already running (pid {pid})"))
            }
            DaemonError::DaemonNotRunning => RpcError::new(CODE_DAEMON_NOT_RUNNING, err.to_string()),
            DaemonError::ProxyNotRunning | DaemonError::Proxy(_) => {
                RpcError::new(CODE_PROXY_NOT_RUNNING, err.to_string())
            }
            DaemonError::AgentNotFound(_) => RpcError::new(CODE_AGENT_NOT_FOUND, err.to_string()),
            DaemonError::ProviderNotFound(_) => RpcError::new(CODE_PROVIDER_NOT_FOUND, err.to_string()),
            DaemonError::Refresh(_) => RpcError::new(CODE_AUTH_FAILED, err.to_string()),
            DaemonError::Store(quotio_store::StoreError::Config(_)) => {
                RpcError::new(CODE_CONFIG_ERROR, err.to_string())
            }
            DaemonError::InvalidParams(detail) => RpcError::invalid_params(detail),
            DaemonError::Store(_) | DaemonError::Core(_) | DaemonError::Ipc(_) | DaemonError::Io(_) => {
                RpcError::new(CODE_INTERNAL_ERROR, err.to_string())
            }
        }
    }
}

impl From<DaemonError> for RpcError {
    fn from(err: DaemonError) -> Self {
        RpcError::from(&err)
    }
}
