//! `config.get`, `config.set`, `proxyConfig.getAll`, `proxyConfig.get`,
//! `proxyConfig.set`.
//!
//! Both namespaces address the same persisted key/value document;
//! `proxyConfig` is the view the supervised proxy's own settings UI reads,
//! `config` is the daemon's own. There's exactly one `Config` behind both.

use std::sync::Arc;

use quotio_ipc::{MethodRegistry, RpcError};
use serde_json::{json, Value};

use super::require_str;
use crate::error::DaemonError;
use crate::state::AppState;

async fn get(state: &AppState, key: &str) -> Value {
    state.config.read().await.get(key).cloned().unwrap_or(Value::Null)
}

async fn set(state: &AppState, key: &str, value: Value) -> Result<(), RpcError> {
    {
        let mut config = state.config.write().await;
        config.set(key.to_string(), value);
    }
    state
        .config
        .read()
        .await
        .save()
        .await
        .map_err(|e| RpcError::from(DaemonError::from(e)))
}

pub fn register(registry: &mut MethodRegistry, state: Arc<AppState>) {
    {
        let state = state.clone();
        registry.register("config.get", move |params: Value| {
            let state = state.clone();
            async move {
                let key = require_str(&params, "key")?.to_string();
                Ok::<Value, RpcError>(json!({"key": key, "value": get(&state, &key).await}))
            }
        });
    }

    {
        let state = state.clone();
        registry.register("config.set", move |params: Value| {
            let state = state.clone();
            async move {
                let key = require_str(&params, "key")?.to_string();
                let value = params
                    .get("value")
                    .cloned()
                    .ok_or_else(|| RpcError::invalid_params("missing `value`"))?;
                set(&state, &key, value).await?;
                Ok::<Value, RpcError>(json!({"success": true}))
            }
        });
    }

    {
        let state = state.clone();
        registry.register("proxyConfig.getAll", move |_params: Value| {
            let state = state.clone();
            async move {
                let config = state.config.read().await;
                let entries: serde_json::Map<String, Value> =
                    config.entries().map(|(k, v)| (k.clone(), v.clone())).collect();
                Ok::<Value, RpcError>(json!(entries))
            }
        });
    }

    {
        let state = state.clone();
        registry.register("proxyConfig.get", move |params: Value| {
            let state = state.clone();
            async move {
                let key = require_str(&params, "key")?.to_string();
                Ok::<Value, RpcError>(json!({"key": key, "value": get(&state, &key).await}))
            }
        });
    }

    registry.register("proxyConfig.set", move |params: Value| {
        let state = state.clone();
        async move {
            let key = require_str(&params, "key")?.to_string();
            let value = params
                .get("value")
                .cloned()
                .ok_or_else(|| RpcError::invalid_params("missing `value`"))?;
            set(&state, &key, value).await?;
            Ok::<Value, RpcError>(json!({"success": true}))
        }
    });
}
