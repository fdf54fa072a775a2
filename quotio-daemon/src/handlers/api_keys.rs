//! `apiKeys.list`, `apiKeys.add`, `apiKeys.delete`.
//!
//! API keys gate the supervised proxy's HTTP surface; they're stored in the
//! same config document as everything else under `quotio-store`, under the
//! well-known key `api_keys`, as a JSON array of [`ApiKeyRecord`].

use std::sync::Arc;

use quotio_core::ApiKeyRecord;
use quotio_ipc::{MethodRegistry, RpcError};
use serde_json::{json, Value};

use super::require_str;
use crate::error::DaemonError;
use crate::state::AppState;

const CONFIG_KEY: &str = "api_keys";

fn load(config: &quotio_store::Config) -> Vec<ApiKeyRecord> {
    config
        .get(CONFIG_KEY)
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default()
}

async fn save(state: &AppState, keys: &[ApiKeyRecord]) -> Result<(), RpcError> {
    {
        let mut config = state.config.write().await;
        config.set(CONFIG_KEY, json!(keys));
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
        registry.register("apiKeys.list", move |_params: Value| {
            let state = state.clone();
            async move {
                let keys = load(&*state.config.read().await);
                Ok::<Value, RpcError>(json!({"success": true, "keys": keys}))
            }
        });
    }

    {
        let state = state.clone();
        registry.register("apiKeys.add", move |params: Value| {
            let state = state.clone();
            async move {
                let label = params.get("label").and_then(Value::as_str).map(str::to_string);
                let mut keys = load(&*state.config.read().await);
                let key = ApiKeyRecord::new(label);
                keys.push(key.clone());
                save(&state, &keys).await?;
                Ok::<Value, RpcError>(json!({"success": true, "key": key}))
            }
        });
    }

    registry.register("apiKeys.delete", move |params: Value| {
        let state = state.clone();
        async move {
            let id = require_str(&params, "key")?.to_string();
            let mut keys = load(&*state.config.read().await);
            let before = keys.len();
            keys.retain(|k| k.id != id);
            let removed = keys.len() != before;
            save(&state, &keys).await?;
            Ok::<Value, RpcError>(json!({"success": removed}))
        }
    });
}
