//! `auth.list`, `auth.delete`, `auth.deleteAll`, `auth.setDisabled`,
//! `auth.models`.

use std::sync::Arc;

use quotio_core::ProviderKind;
use quotio_ipc::{MethodRegistry, RpcError};
use serde_json::{json, Value};

use super::{account_error, require_str};
use crate::error::DaemonError;
use crate::state::AppState;

fn parse_provider(params: &Value) -> Result<Option<ProviderKind>, RpcError> {
    match params.get("provider") {
        None | Some(Value::Null) => Ok(None),
        Some(v) => serde_json::from_value(v.clone())
            .map(Some)
            .map_err(|e| RpcError::invalid_params(format!("invalid provider: {e}"))),
    }
}

pub fn register(registry: &mut MethodRegistry, state: Arc<AppState>) {
    {
        let state = state.clone();
        registry.register("auth.list", move |params: Value| {
            let state = state.clone();
            async move {
                let provider = parse_provider(&params)?;
                let accounts = state.store.list(provider).await.map_err(DaemonError::from)?;
                Ok::<Value, RpcError>(json!({"accounts": accounts}))
            }
        });
    }

    {
        let state = state.clone();
        registry.register("auth.delete", move |params: Value| {
            let state = state.clone();
            async move {
                let name = require_str(&params, "name")?.to_string();
                state.store.delete(&name).await.map_err(DaemonError::from)?;
                Ok::<Value, RpcError>(json!({"success": true}))
            }
        });
    }

    {
        let state = state.clone();
        registry.register("auth.deleteAll", move |_params: Value| {
            let state = state.clone();
            async move {
                let accounts = state.store.list(None).await.map_err(DaemonError::from)?;
                for account in &accounts {
                    state.store.delete(&account.id).await.map_err(DaemonError::from)?;
                }
                Ok::<Value, RpcError>(json!({"success": true, "deleted": accounts.len()}))
            }
        });
    }

    {
        let state = state.clone();
        registry.register("auth.setDisabled", move |params: Value| {
            let state = state.clone();
            async move {
                let name = require_str(&params, "name")?.to_string();
                let disabled = params
                    .get("disabled")
                    .and_then(Value::as_bool)
                    .ok_or_else(|| RpcError::invalid_params("missing `disabled`"))?;
                let record = state
                    .store
                    .set_disabled(&name, disabled)
                    .await
                    .map_err(|e| account_error(&name, e))?;
                Ok::<Value, RpcError>(json!({"success": true, "account": record.to_meta()}))
            }
        });
    }

    registry.register("auth.models", move |params: Value| {
        let state = state.clone();
        async move {
            let name = require_str(&params, "name")?.to_string();
            // Ensure the account exists before answering, so a typo'd name
            // doesn't silently report "no models" instead of an error.
            state.store.read(&name).await.map_err(|e| account_error(&name, e))?;

            let (cache, _) = state.quotas.cached().await;
            let models = cache
                .get(&name)
                .map(|snapshot| {
                    snapshot
                        .models
                        .iter()
                        .map(|m| json!({"id": m.name, "name": m.name}))
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default();

            Ok::<Value, RpcError>(json!({"success": true, "models": models}))
        }
    });
}
