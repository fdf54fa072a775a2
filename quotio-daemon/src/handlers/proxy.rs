//! `proxy.start`, `proxy.stop`, `proxy.status`, `proxy.health`,
//! `proxy.healthCheck`, `proxy.latestVersion`.

use std::sync::Arc;

use quotio_ipc::{MethodRegistry, RpcError};
use serde_json::{json, Value};

use crate::error::DaemonError;
use crate::state::AppState;

pub fn register(registry: &mut MethodRegistry, state: Arc<AppState>) {
    {
        let state = state.clone();
        registry.register("proxy.start", move |params: Value| {
            let state = state.clone();
            async move {
                let port = params
                    .get("port")
                    .and_then(Value::as_u64)
                    .map(|p| p as u16)
                    .unwrap_or_else(|| state.proxy_default_port());

                let started = state.proxy.start(port).await.map_err(DaemonError::from)?;
                Ok::<Value, RpcError>(json!({
                    "success": true,
                    "port": started.port,
                    "pid": started.pid,
                }))
            }
        });
    }

    {
        let state = state.clone();
        registry.register("proxy.stop", move |_params: Value| {
            let state = state.clone();
            async move {
                state.proxy.stop().await.map_err(DaemonError::from)?;
                Ok::<Value, RpcError>(json!({"success": true}))
            }
        });
    }

    {
        let state = state.clone();
        registry.register("proxy.status", move |_params: Value| {
            let state = state.clone();
            async move {
                let status = state.proxy.status().await;
                Ok::<Value, RpcError>(json!({
                    "running": status.running,
                    "port": if status.running { Some(status.port) } else { None },
                    "pid": status.pid,
                    "started_at": status.started_at,
                    "healthy": status.running && state.proxy.health().await,
                }))
            }
        });
    }

    {
        let state = state.clone();
        registry.register("proxy.health", move |_params: Value| {
            let state = state.clone();
            async move { Ok::<Value, RpcError>(json!({"healthy": state.proxy.health().await})) }
        });
    }

    {
        let state = state.clone();
        registry.register("proxy.healthCheck", move |_params: Value| {
            let state = state.clone();
            async move { Ok::<Value, RpcError>(json!({"healthy": state.proxy.health().await})) }
        });
    }

    registry.register("proxy.latestVersion", move |_params: Value| {
        let state = state.clone();
        async move {
            let latest_version = match state.proxy.binary_path().await {
                Ok(path) => quotio_proxy::sniff_version(&path).await,
                Err(_) => None,
            };
            Ok::<Value, RpcError>(json!({
                "success": latest_version.is_some(),
                "latest_version": latest_version,
            }))
        }
    });
}
