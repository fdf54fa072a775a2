//! Unix-socket accept loop dispatching through a [`MethodRegistry`].

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::net::unix::OwnedWriteHalf;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{Mutex, Notify};
use tracing::{debug, info, instrument, warn};

use crate::error::IpcError;
use crate::framing::{MessageReader, MessageWriter};
use crate::protocol::{JsonRpcRequest, JsonRpcResponse, RpcError};
use crate::registry::MethodRegistry;

/// How long `shutdown()` waits for in-flight connections to finish their
/// current request before the listener is dropped out from under them.
pub const SHUTDOWN_DRAIN: Duration = Duration::from_millis(500);

/// Serves JSON-RPC requests over a Unix domain socket.
///
/// Each accepted connection is handled on its own task, and within a
/// connection each request is itself dispatched onto its own task, so a
/// slow handler can't stall requests behind it on the same connection, let
/// alone on other connections.
pub struct IpcServer {
    listener: UnixListener,
    socket_path: PathBuf,
    registry: Arc<MethodRegistry>,
    shutdown: Arc<Notify>,
}

impl IpcServer {
    /// Binds a Unix socket at `socket_path`.
    ///
    /// The containing directory is created with mode `0700` if missing and
    /// the socket file itself is chmod'd to `0600` after bind. Removing a
    /// stale socket left behind by a dead process is the caller's
    /// responsibility (it requires a liveness check against a PID file,
    /// which this crate has no opinion about) — binding over an existing
    /// live socket simply fails with [`IpcError::Bind`].
    #[instrument(skip(registry))]
    pub fn bind(socket_path: impl AsRef<Path>, registry: MethodRegistry) -> Result<Self, IpcError> {
        let socket_path = socket_path.as_ref().to_path_buf();

        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent).map_err(IpcError::Io)?;
            std::fs::set_permissions(parent, std::fs::Permissions::from_mode(0o700)).map_err(IpcError::Io)?;
        }

        let listener = UnixListener::bind(&socket_path).map_err(|source| IpcError::Bind {
            path: socket_path.display().to_string(),
            source,
        })?;

        std::fs::set_permissions(&socket_path, std::fs::Permissions::from_mode(0o600)).map_err(IpcError::Io)?;

        Ok(Self {
            listener,
            socket_path,
            registry: Arc::new(registry),
            shutdown: Arc::new(Notify::new()),
        })
    }

    /// Path of the bound socket.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// A handle that, when notified, stops [`serve`](Self::serve) from
    /// accepting new connections.
    pub fn shutdown_handle(&self) -> Arc<Notify> {
        Arc::clone(&self.shutdown)
    }

    /// Accepts connections until `shutdown_handle().notify_one()` is called,
    /// then waits up to [`SHUTDOWN_DRAIN`] for in-flight connections before
    /// returning.
    #[instrument(skip(self))]
    pub async fn serve(self) {
        let mut in_flight = tokio::task::JoinSet::new();

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.notified() => {
                    info!("ipc server shutting down, draining connections");
                    break;
                }
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, _addr)) => {
                            let registry = Arc::clone(&self.registry);
                            in_flight.spawn(async move {
                                handle_connection(stream, registry).await;
                            });
                        }
                        Err(err) => warn!(error = %err, "accept failed"),
                    }
                }
            }
        }

        let _ = tokio::time::timeout(SHUTDOWN_DRAIN, async {
            while in_flight.join_next().await.is_some() {}
        })
        .await;

        if let Err(err) = std::fs::remove_file(&self.socket_path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!(error = %err, path = %self.socket_path.display(), "failed to remove socket file");
            }
        }
    }
}

/// Reads requests off `stream` and hands each one to its own task so a slow
/// handler (a `quota.fetch` hitting the network) never holds up the next
/// request's framing or a faster sibling's response. The write half is
/// shared behind a mutex rather than owned by the read loop, since more than
/// one handler task may finish, and want to write, at the same time;
/// responses can therefore reach the client in a different order than the
/// requests that produced them arrived in.
#[instrument(skip(stream, registry))]
async fn handle_connection(stream: UnixStream, registry: Arc<MethodRegistry>) {
    let (read_half, write_half) = stream.into_split();
    let mut reader = MessageReader::new(read_half);
    let writer = Arc::new(Mutex::new(MessageWriter::new(write_half)));

    loop {
        let parsed = match reader.next::<JsonRpcRequest>().await {
            Ok(None) => break,
            Ok(Some(parsed)) => parsed,
            Err(err) => {
                warn!(error = %err, "connection read error");
                break;
            }
        };

        let request = match parsed {
            Ok(request) => request,
            Err(err) => {
                let response = JsonRpcResponse::error(Value::Null, RpcError::parse_error(err));
                if write_response(&writer, response).await.is_err() {
                    break;
                }
                continue;
            }
        };

        debug!(method = %request.method, notification = request.is_notification(), "dispatching request");

        let registry = Arc::clone(&registry);
        let writer = Arc::clone(&writer);
        tokio::spawn(async move {
            let result = registry.dispatch(&request.method, request.params).await;

            if request.is_notification() {
                return;
            }

            let id = request.id.unwrap_or(Value::Null);
            let response = match result {
                Ok(value) => JsonRpcResponse::success(id, value),
                Err(err) => JsonRpcResponse::error(id, err),
            };
            let _ = write_response(&writer, response).await;
        });
    }
}

async fn write_response(writer: &Mutex<MessageWriter<OwnedWriteHalf>>, response: JsonRpcResponse) -> std::io::Result<()> {
    writer.lock().await.write(&response).await
}
