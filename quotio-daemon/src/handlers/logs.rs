//! `logs.fetch`, `logs.clear`.
//!
//! Backed by the same [`quotio_tracker::RequestTracker`] ring as `stats.*`;
//! this namespace just renames fields to the log-viewer's expected shape
//! and adds cursor-based pagination via `fetch_after`.

use std::sync::Arc;

use quotio_ipc::{MethodRegistry, RpcError};
use serde_json::{json, Value};

use crate::state::AppState;

pub fn register(registry: &mut MethodRegistry, state: Arc<AppState>) {
    {
        let state = state.clone();
        registry.register("logs.fetch", move |params: Value| {
            let state = state.clone();
            async move {
                let after = params.get("after").and_then(Value::as_str);
                let (entries, total, last_id) = state.tracker.fetch_after(after).await;

                let logs: Vec<Value> = entries
                    .iter()
                    .map(|e| {
                        json!({
                            "id": e.id,
                            "timestamp": e.ts,
                            "method": e.method,
                            "path": e.endpoint,
                            "status_code": e.status,
                            "duration": e.duration_ms,
                            "provider": e.provider,
                            "model": e.model,
                            "in_tok": e.in_tok,
                            "out_tok": e.out_tok,
                            "error": e.error,
                        })
                    })
                    .collect();

                Ok::<Value, RpcError>(json!({
                    "success": true,
                    "logs": logs,
                    "total": total,
                    "last_id": last_id,
                }))
            }
        });
    }

    registry.register("logs.clear", move |_params: Value| {
        let state = state.clone();
        async move {
            state.tracker.clear().await;
            Ok::<Value, RpcError>(json!({"success": true}))
        }
    });
}
