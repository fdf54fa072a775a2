//! Method handlers, one module per namespace in the method catalog.

mod api_keys;
mod auth;
mod config;
mod daemon;
mod logs;
mod oauth;
mod proxy;
mod quota;
mod stats;

use std::sync::Arc;

use quotio_ipc::MethodRegistry;

use crate::state::AppState;

/// Registers every method in the catalog against `registry`.
pub fn register_all(registry: &mut MethodRegistry, state: Arc<AppState>) {
    daemon::register(registry, state.clone());
    proxy::register(registry, state.clone());
    auth::register(registry, state.clone());
    oauth::register(registry, state.clone());
    quota::register(registry, state.clone());
    stats::register(registry, state.clone());
    config::register(registry, state.clone());
    api_keys::register(registry, state.clone());
    logs::register(registry, state);
}

/// Shared helper: pulls a required string param out of `params[field]`.
fn require_str<'a>(params: &'a serde_json::Value, field: &str) -> Result<&'a str, quotio_ipc::RpcError> {
    params
        .get(field)
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| quotio_ipc::RpcError::invalid_params(format!("missing `{field}`")))
}

/// Narrows a [`quotio_store::StoreError`] from a by-key read/write into
/// [`crate::error::DaemonError::AgentNotFound`] when the file simply isn't
/// there, so callers see `1004` rather than a generic internal error.
fn account_error(key: &str, err: quotio_store::StoreError) -> crate::error::DaemonError {
    match err {
        quotio_store::StoreError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => {
            crate::error::DaemonError::AgentNotFound(key.to_string())
        }
        other => crate::error::DaemonError::Store(other),
    }
}
