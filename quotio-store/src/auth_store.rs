//! The Auth-File Store: one JSON file per account under `<config-dir>/auth/`.
//!
//! Each account is named `<provider>-<local-part>.json` (e.g.
//! `codex-alice.json`). Writes go through a temp file, an explicit fsync,
//! and a rename, so a crash mid-write never leaves a half-written account
//! file behind. Per-key mutexes serialize concurrent writers (the refresher
//! and an `auth.` RPC call can race on the same account) without blocking
//! unrelated accounts.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use quotio_core::{AccountMeta, AccountRecord, ProviderKind};
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::error::StoreError;
use crate::persistence;

/// File-backed store of provider account credentials.
#[derive(Debug, Clone)]
pub struct AuthStore {
    dir: PathBuf,
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl AuthStore {
    /// Opens the store rooted at the default auth directory (`~/.cli-proxy-api`,
    /// overridable with `QUOTIO_AUTH_DIR`).
    pub fn new() -> Self {
        Self::at(persistence::default_auth_dir())
    }

    /// Opens the store rooted at an explicit directory (used in tests).
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    async fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Lists every account, optionally filtered to one provider.
    ///
    /// Malformed account files are skipped with a warning rather than
    /// failing the whole listing, so one corrupt file doesn't hide every
    /// other account.
    #[instrument(skip(self))]
    pub async fn list(&self, provider: Option<ProviderKind>) -> Result<Vec<AccountMeta>, StoreError> {
        persistence::ensure_dir(&self.dir).await?;

        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut accounts = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(key) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            match self.read_at(&path, key).await {
                Ok(record) => {
                    if provider.is_none_or(|p| p == record.provider) {
                        accounts.push(record.to_meta());
                    }
                }
                Err(e) => {
                    warn!(key, error = %e, "Skipping unreadable account file");
                }
            }
        }

        accounts.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(accounts)
    }

    /// Reads one account by key (`<provider>-<local-part>`).
    #[instrument(skip(self))]
    pub async fn read(&self, key: &str) -> Result<AccountRecord, StoreError> {
        self.read_at(&self.path_for(key), key).await
    }

    async fn read_at(&self, path: &Path, key: &str) -> Result<AccountRecord, StoreError> {
        let mut record: AccountRecord = persistence::load_json(path).await?;
        record.key = key.to_string();
        Ok(record)
    }

    /// Writes an account, read-modify-write, under the per-key lock.
    ///
    /// `updater` receives the current record (or a fresh default for
    /// `provider` if the account doesn't exist yet) and returns the record
    /// to persist.
    #[instrument(skip(self, updater))]
    pub async fn write<F>(
        &self,
        key: &str,
        provider: ProviderKind,
        updater: F,
    ) -> Result<AccountRecord, StoreError>
    where
        F: FnOnce(AccountRecord) -> AccountRecord,
    {
        let lock = self.lock_for(key).await;
        let _guard = lock.lock().await;

        let path = self.path_for(key);
        let current = match self.read_at(&path, key).await {
            Ok(record) => record,
            Err(StoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                AccountRecord::new(key, provider)
            }
            Err(e) => return Err(e),
        };

        let updated = updater(current);
        self.write_atomic(&path, &updated).await?;
        debug!(key, "Wrote account");
        Ok(updated)
    }

    async fn write_atomic(&self, path: &Path, record: &AccountRecord) -> Result<(), StoreError> {
        persistence::save_json_fsync(path, record).await
    }

    /// Deletes an account. Not an error if it doesn't exist.
    #[instrument(skip(self))]
    pub async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let lock = self.lock_for(key).await;
        let _guard = lock.lock().await;

        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(key, "Deleted account");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Enables or disables an account without touching its credentials.
    #[instrument(skip(self))]
    pub async fn set_disabled(&self, key: &str, disabled: bool) -> Result<AccountRecord, StoreError> {
        let provider = self.read(key).await?.provider;
        self.write(key, provider, |mut record| {
            record.disabled = disabled;
            record
        })
        .await
    }
}

impl Default for AuthStore {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, AuthStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = AuthStore::at(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let (_dir, store) = store();
        store
            .write("codex-alice", ProviderKind::Codex, |mut r| {
                r.access_token = "tok123".to_string();
                r
            })
            .await
            .unwrap();

        let record = store.read("codex-alice").await.unwrap();
        assert_eq!(record.access_token, "tok123");
        assert_eq!(record.key, "codex-alice");
        assert_eq!(record.provider, ProviderKind::Codex);
    }

    #[tokio::test]
    async fn list_filters_by_provider() {
        let (_dir, store) = store();
        store
            .write("codex-alice", ProviderKind::Codex, |r| r)
            .await
            .unwrap();
        store
            .write("claude-bob", ProviderKind::Claude, |r| r)
            .await
            .unwrap();

        let all = store.list(None).await.unwrap();
        assert_eq!(all.len(), 2);

        let codex_only = store.list(Some(ProviderKind::Codex)).await.unwrap();
        assert_eq!(codex_only.len(), 1);
        assert_eq!(codex_only[0].id, "codex-alice");
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (_dir, store) = store();
        store
            .write("codex-alice", ProviderKind::Codex, |r| r)
            .await
            .unwrap();
        store.delete("codex-alice").await.unwrap();
        store.delete("codex-alice").await.unwrap();
        assert!(store.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn set_disabled_preserves_credentials() {
        let (_dir, store) = store();
        store
            .write("codex-alice", ProviderKind::Codex, |mut r| {
                r.access_token = "tok123".to_string();
                r
            })
            .await
            .unwrap();

        let record = store.set_disabled("codex-alice", true).await.unwrap();
        assert!(record.disabled);
        assert_eq!(record.access_token, "tok123");
    }

    #[tokio::test]
    async fn unknown_json_keys_survive_round_trip() {
        let (dir, store) = store();
        let path = dir.path().join("codex-alice.json");
        tokio::fs::write(
            &path,
            r#"{"provider":"codex","access_token":"t","vendor_specific":"keepme"}"#,
        )
        .await
        .unwrap();

        let record = store.read("codex-alice").await.unwrap();
        assert_eq!(
            record.extras.unknown.get("vendor_specific").unwrap().as_str(),
            Some("keepme")
        );

        store
            .write("codex-alice", ProviderKind::Codex, |mut r| {
                r.last_refresh_at = Some(chrono::Utc::now());
                r
            })
            .await
            .unwrap();

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(content.contains("keepme"));
    }
}
