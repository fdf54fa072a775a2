//! `stats.add`, `stats.list`, `stats.get`, `stats.clear`, `stats.status`.

use std::sync::Arc;

use quotio_core::RequestLogEntry;
use quotio_ipc::{MethodRegistry, RpcError};
use serde_json::{json, Value};

use super::require_str;
use crate::state::AppState;

fn entry_from_params(params: &Value) -> Result<RequestLogEntry, RpcError> {
    let method = require_str(params, "method")?;
    let endpoint = require_str(params, "endpoint")?;
    let duration_ms = params.get("duration_ms").and_then(Value::as_u64).unwrap_or(0);

    let mut entry = RequestLogEntry::new(method, endpoint, duration_ms);
    if let Some(provider) = params.get("provider").and_then(Value::as_str) {
        entry = entry.with_provider(provider);
    }
    if let Some(model) = params.get("model").and_then(Value::as_str) {
        entry = entry.with_model(model);
    }
    if params.get("in_tok").is_some() || params.get("out_tok").is_some() {
        entry = entry.with_tokens(
            params.get("in_tok").and_then(Value::as_u64),
            params.get("out_tok").and_then(Value::as_u64),
        );
    }
    if let Some(status) = params.get("status").and_then(Value::as_u64) {
        entry = entry.with_status(status as u16);
    }
    entry = entry.with_bytes(
        params.get("req_bytes").and_then(Value::as_u64).unwrap_or(0),
        params.get("resp_bytes").and_then(Value::as_u64).unwrap_or(0),
    );
    if let Some(error) = params.get("error").and_then(Value::as_str) {
        entry = entry.with_error(error);
    }

    Ok(entry)
}

pub fn register(registry: &mut MethodRegistry, state: Arc<AppState>) {
    {
        let state = state.clone();
        registry.register("stats.add", move |params: Value| {
            let state = state.clone();
            async move {
                let entry = entry_from_params(&params)?;
                state.tracker.add(entry).await;
                Ok::<Value, RpcError>(json!({"success": true}))
            }
        });
    }

    {
        let state = state.clone();
        registry.register("stats.list", move |params: Value| {
            let state = state.clone();
            async move {
                let provider = params.get("provider").and_then(Value::as_str);
                let minutes = params.get("minutes").and_then(Value::as_i64);
                let entries = state.tracker.list(provider, minutes).await;
                Ok::<Value, RpcError>(json!({"success": true, "entries": entries}))
            }
        });
    }

    {
        let state = state.clone();
        registry.register("stats.get", move |_params: Value| {
            let state = state.clone();
            async move { Ok::<Value, RpcError>(json!(state.tracker.stats().await)) }
        });
    }

    {
        let state = state.clone();
        registry.register("stats.clear", move |_params: Value| {
            let state = state.clone();
            async move {
                state.tracker.clear().await;
                Ok::<Value, RpcError>(json!({"success": true}))
            }
        });
    }

    registry.register("stats.status", move |_params: Value| {
        let state = state.clone();
        async move {
            let stats = state.tracker.stats().await;
            let oldest = state.tracker.oldest_ts().await;
            Ok::<Value, RpcError>(json!({
                "entry_count": stats.entry_count,
                "capacity": stats.capacity,
                "oldest_ts": oldest,
            }))
        }
    });
}
