//! `quota.fetch`, `quota.list`.

use std::collections::HashMap;
use std::sync::Arc;

use quotio_core::{ProviderKind, QuotaSnapshot};
use quotio_ipc::{MethodRegistry, RpcError};
use serde_json::{json, Value};

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

/// Joins a `{account_key: snapshot}` map with provider metadata so each
/// entry carries the account's provider tag for client-side grouping.
async fn quota_entries(state: &AppState, snapshots: &HashMap<String, QuotaSnapshot>) -> Vec<Value> {
    let accounts = state.store.list(None).await.unwrap_or_default();
    let provider_by_key: HashMap<&str, ProviderKind> =
        accounts.iter().map(|a| (a.id.as_str(), a.provider)).collect();

    snapshots
        .iter()
        .map(|(key, snapshot)| {
            json!({
                "account": key,
                "provider": provider_by_key.get(key.as_str()),
                "models": snapshot.models,
                "fetched_at": snapshot.fetched_at,
                "is_forbidden": snapshot.is_forbidden,
                "plan_label": snapshot.plan_label,
            })
        })
        .collect()
}

pub fn register(registry: &mut MethodRegistry, state: Arc<AppState>) {
    {
        let state = state.clone();
        registry.register("quota.fetch", move |params: Value| {
            let state = state.clone();
            async move {
                let provider = parse_provider(&params)?;
                let result = state.quotas.fetch_all(provider).await.map_err(DaemonError::from)?;

                let quotas = quota_entries(&state, &result.by_key).await;
                let errors: Vec<Value> = result
                    .errors
                    .iter()
                    .map(|e| json!({"account": e.account_key, "provider": e.provider, "error": e.message}))
                    .collect();

                Ok::<Value, RpcError>(json!({
                    "success": true,
                    "quotas": quotas,
                    "errors": errors,
                }))
            }
        });
    }

    registry.register("quota.list", move |_params: Value| {
        let state = state.clone();
        async move {
            let (cache, last_fetched) = state.quotas.cached().await;
            let quotas = quota_entries(&state, &cache).await;
            Ok::<Value, RpcError>(json!({"quotas": quotas, "last_fetched": last_fetched}))
        }
    });
}
