//! `daemon.ping`, `daemon.status`, `daemon.shutdown`.

use std::sync::Arc;

use quotio_ipc::{MethodRegistry, RpcError};
use serde_json::{json, Value};

use crate::state::AppState;

pub fn register(registry: &mut MethodRegistry, state: Arc<AppState>) {
    registry.register("daemon.ping", move |_params: Value| async move {
        Ok(json!({"pong": true, "timestamp": chrono::Utc::now().timestamp()}))
    });

    {
        let state = state.clone();
        registry.register("daemon.status", move |_params: Value| {
            let state = state.clone();
            async move {
                let proxy = state.proxy.status().await;
                Ok(json!({
                    "running": true,
                    "pid": std::process::id(),
                    "started_at": state.started_at,
                    "uptime_ms": state.uptime_ms(),
                    "proxy_running": proxy.running,
                    "proxy_port": if proxy.running { Some(proxy.port) } else { None },
                    "version": state.version,
                }))
            }
        });
    }

    registry.register("daemon.shutdown", move |_params: Value| {
        let state = state.clone();
        async move {
            state.initiate_shutdown().await;
            Ok::<Value, RpcError>(json!({"success": true}))
        }
    });
}
