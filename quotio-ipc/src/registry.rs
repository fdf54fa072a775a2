//! `method_name → handler` dispatch table.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::protocol::RpcError;

/// One method's implementation. Object-safe so the registry can hold a
/// heterogeneous table of handlers behind `Arc<dyn MethodHandler>`.
#[async_trait]
pub trait MethodHandler: Send + Sync {
    /// Runs the handler against the request's `params`, returning the
    /// JSON-RPC `result` value or an [`RpcError`].
    async fn call(&self, params: Value) -> Result<Value, RpcError>;
}

#[async_trait]
impl<F, Fut> MethodHandler for F
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, RpcError>> + Send,
{
    async fn call(&self, params: Value) -> Result<Value, RpcError> {
        self(params).await
    }
}

/// The daemon's `method_name → handler` table.
#[derive(Default)]
pub struct MethodRegistry {
    handlers: HashMap<String, Arc<dyn MethodHandler>>,
}

impl MethodRegistry {
    /// Builds an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler under `method`. Registering the same method
    /// twice replaces the earlier handler.
    pub fn register(&mut self, method: impl Into<String>, handler: impl MethodHandler + 'static) {
        self.handlers.insert(method.into(), Arc::new(handler));
    }

    /// Dispatches to the handler registered for `method`, or
    /// [`RpcError::method_not_found`] if none is.
    pub async fn dispatch(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        match self.handlers.get(method) {
            Some(handler) => handler.call(params).await,
            None => Err(RpcError::method_not_found(method)),
        }
    }

    /// Every registered method name, for `daemon.status`-style introspection.
    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn registered_method_dispatches() {
        let mut registry = MethodRegistry::new();
        registry.register("daemon.ping", |_params: Value| async move { Ok(json!({"pong": true})) });

        let result = registry.dispatch("daemon.ping", Value::Null).await.unwrap();
        assert_eq!(result, json!({"pong": true}));
    }

    #[tokio::test]
    async fn unregistered_method_is_method_not_found() {
        let registry = MethodRegistry::new();
        let err = registry.dispatch("nope.nope", Value::Null).await.unwrap_err();
        assert_eq!(err.code, crate::protocol::CODE_METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn later_registration_replaces_earlier() {
        let mut registry = MethodRegistry::new();
        registry.register("x", |_: Value| async move { Ok(json!(1)) });
        registry.register("x", |_: Value| async move { Ok(json!(2)) });

        let result = registry.dispatch("x", Value::Null).await.unwrap();
        assert_eq!(result, json!(2));
    }
}
