//! `oauth.start`, `oauth.poll`.

use std::sync::Arc;

use quotio_core::ProviderKind;
use quotio_ipc::{MethodRegistry, RpcError};
use serde_json::{json, Value};

use crate::oauth::OAuthStatus;
use crate::state::AppState;

pub fn register(registry: &mut MethodRegistry, state: Arc<AppState>) {
    {
        let state = state.clone();
        registry.register("oauth.start", move |params: Value| {
            let state = state.clone();
            async move {
                let provider: ProviderKind = params
                    .get("provider")
                    .cloned()
                    .ok_or_else(|| RpcError::invalid_params("missing `provider`"))
                    .and_then(|v| serde_json::from_value(v).map_err(|e| RpcError::invalid_params(e.to_string())))?;

                let state_token = state.oauth.start(&state.store, provider).await;
                Ok::<Value, RpcError>(json!({"success": true, "state": state_token}))
            }
        });
    }

    registry.register("oauth.poll", move |params: Value| {
        let state = state.clone();
        async move {
            let token = params
                .get("state")
                .and_then(Value::as_str)
                .ok_or_else(|| RpcError::invalid_params("missing `state`"))?;

            match state.oauth.poll(&state.store, token).await {
                Some(OAuthStatus::Pending) => Ok(json!({"status": "pending"})),
                Some(OAuthStatus::Success) => Ok(json!({"status": "success"})),
                Some(OAuthStatus::Error(message)) => Ok(json!({"status": "error", "error": message})),
                None => Ok(json!({"status": "error", "error": "unknown oauth session"})),
            }
        }
    });
}
