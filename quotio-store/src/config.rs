//! Daemon configuration: a key/value document persisted verbatim.
//!
//! Unlike a rigid settings struct, `Config` keeps its document as a
//! `serde_json::Map` so `config.get`/`config.set` can touch arbitrary keys
//! without the daemon needing to know about them ahead of time, while a
//! handful of well-known keys get typed accessors for internal use.

use quotio_core::ProviderKind;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::StoreError;
use crate::persistence;

const KEY_HTTP_PROXY_URL: &str = "http_proxy_url";
const KEY_LOG_LEVEL: &str = "log_level";
const KEY_TRACKER_CAPACITY: &str = "tracker_capacity";
const KEY_PROVIDER_ENABLED_PREFIX: &str = "provider_enabled.";

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_TRACKER_CAPACITY: u64 = 10_000;

/// The daemon's persisted configuration document.
#[derive(Debug, Clone, Default)]
pub struct Config {
    document: Map<String, Value>,
}

impl Config {
    /// Returns the default configuration file path, `<config-dir>/config.json`.
    pub fn default_path() -> PathBuf {
        persistence::default_config_dir().join("config.json")
    }

    /// Loads configuration from the default path, or an empty document if
    /// the file does not exist.
    pub async fn load() -> Result<Self, StoreError> {
        Self::load_from(&Self::default_path()).await
    }

    /// Loads configuration from a specific path.
    pub async fn load_from(path: &Path) -> Result<Self, StoreError> {
        let document: Map<String, Value> = persistence::load_json_or_default(path).await;
        info!(path = %path.display(), "Loaded configuration");
        Ok(Self { document })
    }

    /// Saves configuration to the default path, atomically.
    pub async fn save(&self) -> Result<(), StoreError> {
        self.save_to(&Self::default_path()).await
    }

    /// Saves configuration to a specific path, atomically and verbatim (no
    /// schema coercion).
    pub async fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        persistence::save_json(path, &self.document).await?;
        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Returns the raw value for an arbitrary key (`config.get`).
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.document.get(key)
    }

    /// Sets an arbitrary key to a value (`config.set`), returning the
    /// previous value if one existed.
    pub fn set(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.document.insert(key.into(), value)
    }

    /// Returns every key in the document (`proxyConfig.getAll`).
    pub fn entries(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.document.iter()
    }

    /// The process-wide HTTP proxy URL override, if set.
    pub fn http_proxy_url(&self) -> Option<&str> {
        self.document.get(KEY_HTTP_PROXY_URL)?.as_str()
    }

    /// The configured tracing filter / log level.
    pub fn log_level(&self) -> &str {
        self.document
            .get(KEY_LOG_LEVEL)
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// The Request Tracker's ring buffer capacity.
    pub fn tracker_capacity(&self) -> usize {
        self.document
            .get(KEY_TRACKER_CAPACITY)
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_TRACKER_CAPACITY) as usize
    }

    /// Returns whether a provider is enabled, defaulting to `true` when the
    /// key is absent.
    pub fn is_provider_enabled(&self, kind: ProviderKind) -> bool {
        let key = format!("{KEY_PROVIDER_ENABLED_PREFIX}{}", kind.cli_name());
        self.document
            .get(&key)
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    /// Enables or disables a provider.
    pub fn set_provider_enabled(&mut self, kind: ProviderKind, enabled: bool) {
        let key = format!("{KEY_PROVIDER_ENABLED_PREFIX}{}", kind.cli_name());
        self.document.insert(key, Value::Bool(enabled));
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_no_keys_set() {
        let config = Config::default();
        assert_eq!(config.log_level(), "info");
        assert_eq!(config.tracker_capacity(), 10_000);
        assert!(config.http_proxy_url().is_none());
        assert!(config.is_provider_enabled(ProviderKind::Codex));
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut config = Config::default();
        config.set("log_level", Value::String("debug".to_string()));
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.get("log_level").unwrap().as_str(), Some("debug"));
    }

    #[test]
    fn provider_enabled_toggle() {
        let mut config = Config::default();
        config.set_provider_enabled(ProviderKind::Cursor, false);
        assert!(!config.is_provider_enabled(ProviderKind::Cursor));
        assert!(config.is_provider_enabled(ProviderKind::Codex));
    }

    #[tokio::test]
    async fn unknown_keys_round_trip_through_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.set("some_future_field", Value::String("kept".to_string()));
        config.save_to(&path).await.unwrap();

        let reloaded = Config::load_from(&path).await.unwrap();
        assert_eq!(
            reloaded.get("some_future_field").unwrap().as_str(),
            Some("kept")
        );
    }
}
