//! Transport-level error taxonomy. Distinct from [`crate::protocol::RpcError`],
//! which is what a client actually sees on the wire.

use thiserror::Error;

/// Everything that can go wrong setting up or running the socket server,
/// as opposed to a single request failing.
#[derive(Debug, Error)]
pub enum IpcError {
    /// Binding the Unix socket failed (stale socket, permission denied,
    /// directory missing).
    #[error("failed to bind socket at {path}: {source}")]
    Bind {
        /// Socket path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A filesystem operation other than bind failed (permissions, PID
    /// check, directory creation).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
