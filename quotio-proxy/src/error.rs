//! Supervisor error taxonomy.

use thiserror::Error;

/// Everything that can go wrong locating, starting, or stopping the
/// supervised proxy child process.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// No usable binary was found at any of the three candidate locations.
    #[error("proxy binary not found: {0}")]
    BinaryNotFound(String),

    /// The child failed to spawn at all (exec error, permission denied).
    #[error("failed to spawn proxy process: {0}")]
    SpawnFailed(String),

    /// The child was spawned but never answered a healthy response before
    /// the startup deadline elapsed.
    #[error("proxy did not become healthy within the startup deadline")]
    StartupTimeout,

    /// The health endpoint returned something other than 200.
    #[error("proxy health check failed: {0}")]
    HealthCheckFailed(String),

    /// A start was requested while a child is already running.
    #[error("proxy is already running")]
    AlreadyRunning,

    /// An operation that requires a running child was attempted while none
    /// is running.
    #[error("proxy is not running")]
    NotRunning,

    /// Filesystem I/O failed (PID file, binary extraction).
    #[error("proxy I/O error: {0}")]
    Io(#[from] std::io::Error),
}
