//! `fetch_all`: the orchestration contract tying the Store, the Token
//! Refresher and the per-provider fetchers together into one
//! `quota.fetch`/`quota.list` cycle.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use quotio_core::{AccountStatus, CoreError, ProviderKind, QuotaFetcher, QuotaSnapshot};
use quotio_refresh::TokenRefresher;
use quotio_store::AuthStore;
use tokio::sync::{RwLock, Semaphore};
use tracing::{info, instrument, warn};

use crate::quota_fetchers::all_fetchers;

/// Per-provider cap on concurrent in-flight fetches, so one slow provider
/// can't starve the others of a connection-pool slot.
const PER_PROVIDER_CONCURRENCY: usize = 4;

/// Cooldown applied when a provider returns 429 without a `Retry-After`
/// value of its own.
const DEFAULT_COOLDOWN_SECS: i64 = 60;

/// One account's fetch failure, attributed for `quota.fetch`'s
/// partial-success payload.
#[derive(Debug, Clone)]
pub struct FetchError {
    /// The account key the error is attributed to.
    pub account_key: String,
    /// The provider the account belongs to.
    pub provider: ProviderKind,
    /// Human-readable failure message.
    pub message: String,
}

/// Result of one `fetch_all` cycle.
#[derive(Debug, Clone, Default)]
pub struct FetchAllResult {
    /// Snapshot per account key that produced one.
    pub by_key: HashMap<String, QuotaSnapshot>,
    /// Accounts that failed this cycle. Never aborts the others.
    pub errors: Vec<FetchError>,
}

/// Owns the per-provider fetcher table, the last-known snapshot cache, and
/// drives one fetch cycle across every enabled, non-disabled account.
pub struct QuotaRegistry {
    store: AuthStore,
    refresher: Arc<TokenRefresher>,
    fetchers: HashMap<ProviderKind, Box<dyn QuotaFetcher>>,
    cache: RwLock<HashMap<String, QuotaSnapshot>>,
    last_fetched: RwLock<Option<chrono::DateTime<Utc>>>,
}

impl QuotaRegistry {
    /// Builds a registry over every known provider's fetcher.
    pub fn new(store: AuthStore, refresher: Arc<TokenRefresher>) -> Self {
        let fetchers = all_fetchers().into_iter().map(|f| (f.kind(), f)).collect();
        Self {
            store,
            refresher,
            fetchers,
            cache: RwLock::new(HashMap::new()),
            last_fetched: RwLock::new(None),
        }
    }

    /// Returns the last-known snapshot for every account (`quota.list`).
    pub async fn cached(&self) -> (HashMap<String, QuotaSnapshot>, Option<chrono::DateTime<Utc>>) {
        (self.cache.read().await.clone(), *self.last_fetched.read().await)
    }

    /// Runs one fetch cycle (`quota.fetch`).
    ///
    /// Loads every account, optionally filtered to one provider, refreshes
    /// each token proactively, then dispatches the matching fetcher with a
    /// per-provider concurrency cap. A single account's failure never
    /// aborts the others; cooling accounts are skipped and served their
    /// cached snapshot instead of a new network call.
    #[instrument(skip(self))]
    pub async fn fetch_all(&self, provider: Option<ProviderKind>) -> Result<FetchAllResult, CoreError> {
        let accounts = self
            .store
            .list(provider)
            .await
            .map_err(|e| CoreError::Other(e.to_string()))?;

        let semaphores: HashMap<ProviderKind, Arc<Semaphore>> = ProviderKind::all()
            .iter()
            .map(|kind| (*kind, Arc::new(Semaphore::new(PER_PROVIDER_CONCURRENCY))))
            .collect();

        let mut tasks = Vec::with_capacity(accounts.len());
        for meta in accounts {
            if meta.disabled {
                continue;
            }
            let Some(semaphore) = semaphores.get(&meta.provider).cloned() else {
                continue;
            };
            let Some(fetcher) = self.fetchers.get(&meta.provider) else {
                continue;
            };
            let store = self.store.clone();
            let refresher = Arc::clone(&self.refresher);
            let key = meta.id.clone();
            let provider_kind = meta.provider;
            let fetcher: &dyn QuotaFetcher = fetcher.as_ref();

            tasks.push(async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore never closed");
                fetch_one(&store, refresher.as_ref(), fetcher, &key, provider_kind).await
            });
        }

        let outcomes = futures::future::join_all(tasks).await;

        let mut result = FetchAllResult::default();
        let mut cache = self.cache.write().await;
        for outcome in outcomes {
            match outcome {
                FetchOutcome::Snapshot { key, snapshot } => {
                    cache.insert(key.clone(), snapshot.clone());
                    result.by_key.insert(key, snapshot);
                }
                FetchOutcome::Forbidden { key, provider, message } => {
                    let previous = cache.get(&key);
                    let snapshot = QuotaSnapshot::forbidden(previous);
                    cache.insert(key.clone(), snapshot.clone());
                    result.by_key.insert(key.clone(), snapshot);
                    result.errors.push(FetchError {
                        account_key: key,
                        provider,
                        message,
                    });
                }
                FetchOutcome::Cooling { key } => {
                    if let Some(snapshot) = cache.get(&key).cloned() {
                        result.by_key.insert(key, snapshot);
                    }
                }
                FetchOutcome::Error { key, provider, message } => {
                    warn!(key, provider = ?provider, error = %message, "quota fetch failed");
                    result.errors.push(FetchError {
                        account_key: key,
                        provider,
                        message,
                    });
                }
            }
        }
        drop(cache);
        *self.last_fetched.write().await = Some(Utc::now());

        Ok(result)
    }
}

enum FetchOutcome {
    Snapshot { key: String, snapshot: QuotaSnapshot },
    Forbidden { key: String, provider: ProviderKind, message: String },
    Cooling { key: String },
    Error { key: String, provider: ProviderKind, message: String },
}

/// Runs one account's fetch, applying the proactive-refresh, reactive
/// refresh-then-retry, and 429-cooldown rules around the raw fetcher call.
///
/// Reactive refresh fires at most once: a 401/403 triggers exactly one
/// [`TokenRefresher::refresh_now`] call followed by exactly one retried
/// fetch, never a loop. A 429 instead writes a cooldown onto the account and
/// reports [`FetchOutcome::Cooling`] without retrying at all this cycle.
#[instrument(skip(store, refresher, fetcher))]
async fn fetch_one(
    store: &AuthStore,
    refresher: &TokenRefresher,
    fetcher: &dyn QuotaFetcher,
    key: &str,
    provider: ProviderKind,
) -> FetchOutcome {
    let account = match store.read(key).await {
        Ok(account) => account,
        Err(e) => {
            return FetchOutcome::Error {
                key: key.to_string(),
                provider,
                message: e.to_string(),
            };
        }
    };

    if account.status == AccountStatus::Cooling && account.cooling_until.is_some_and(|until| until > Utc::now()) {
        return FetchOutcome::Cooling { key: key.to_string() };
    }

    let account = match refresher.ensure_valid(key).await {
        Ok(account) => account,
        Err(e) => {
            return FetchOutcome::Error {
                key: key.to_string(),
                provider,
                message: e.to_string(),
            };
        }
    };

    match fetcher.fetch(&account).await {
        Ok(snapshot) if snapshot.is_forbidden => FetchOutcome::Forbidden {
            key: key.to_string(),
            provider,
            message: "forbidden".to_string(),
        },
        Ok(snapshot) => {
            if account.status == AccountStatus::Cooling {
                clear_cooldown(store, key, provider).await;
            }
            FetchOutcome::Snapshot {
                key: key.to_string(),
                snapshot,
            }
        }
        Err(e) if e.is_forbidden() => {
            reactive_refresh_and_retry(store, refresher, fetcher, key, provider, e).await
        }
        Err(e) => {
            if let Some(retry_after) = e.retry_after() {
                apply_cooldown(store, key, provider, retry_after).await;
                return FetchOutcome::Cooling { key: key.to_string() };
            }
            FetchOutcome::Error {
                key: key.to_string(),
                provider,
                message: e.to_string(),
            }
        }
    }
}

/// The reactive half of the refresh rule: one forced refresh, then one
/// retried fetch. Never called recursively, so a provider that keeps
/// answering 401/403 surfaces as `Forbidden` rather than looping.
async fn reactive_refresh_and_retry(
    store: &AuthStore,
    refresher: &TokenRefresher,
    fetcher: &dyn QuotaFetcher,
    key: &str,
    provider: ProviderKind,
    first_error: CoreError,
) -> FetchOutcome {
    warn!(key, provider = ?provider, "downstream fetch forbidden, attempting one reactive refresh");

    let account = match refresher.refresh_now(key).await {
        Ok(account) => account,
        Err(_) => {
            return FetchOutcome::Forbidden {
                key: key.to_string(),
                provider,
                message: first_error.to_string(),
            };
        }
    };

    match fetcher.fetch(&account).await {
        Ok(snapshot) if snapshot.is_forbidden => FetchOutcome::Forbidden {
            key: key.to_string(),
            provider,
            message: first_error.to_string(),
        },
        Ok(snapshot) => FetchOutcome::Snapshot {
            key: key.to_string(),
            snapshot,
        },
        Err(e) if e.is_forbidden() => FetchOutcome::Forbidden {
            key: key.to_string(),
            provider,
            message: e.to_string(),
        },
        Err(e) => {
            if let Some(retry_after) = e.retry_after() {
                apply_cooldown(store, key, provider, retry_after).await;
                return FetchOutcome::Cooling { key: key.to_string() };
            }
            FetchOutcome::Error {
                key: key.to_string(),
                provider,
                message: e.to_string(),
            }
        }
    }
}

/// Persists `AccountStatus::Cooling` with a `cooling_until` derived from the
/// provider's `Retry-After` hint (or [`DEFAULT_COOLDOWN_SECS`] absent one).
async fn apply_cooldown(store: &AuthStore, key: &str, provider: ProviderKind, retry_after: Option<u64>) {
    let cooldown = retry_after
        .map(|secs| ChronoDuration::seconds(secs as i64))
        .unwrap_or_else(|| ChronoDuration::seconds(DEFAULT_COOLDOWN_SECS));
    let cooling_until = Utc::now() + cooldown;

    info!(key, provider = ?provider, cooling_until = %cooling_until, "rate limited, cooling account down");

    if let Err(e) = store
        .write(key, provider, |mut record| {
            record.status = AccountStatus::Cooling;
            record.cooling_until = Some(cooling_until);
            record
        })
        .await
    {
        warn!(key, error = %e, "failed to persist cooldown status");
    }
}

/// Clears a lapsed cooldown once a fetch through it succeeds.
async fn clear_cooldown(store: &AuthStore, key: &str, provider: ProviderKind) {
    if let Err(e) = store
        .write(key, provider, |mut record| {
            record.status = AccountStatus::Ready;
            record.cooling_until = None;
            record
        })
        .await
    {
        warn!(key, error = %e, "failed to clear cooldown status");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use quotio_core::AccountRecord;

    struct AlwaysOkFetcher;

    #[async_trait]
    impl QuotaFetcher for AlwaysOkFetcher {
        fn kind(&self) -> ProviderKind {
            ProviderKind::Codex
        }

        async fn fetch(&self, _account: &AccountRecord) -> Result<QuotaSnapshot, CoreError> {
            Ok(QuotaSnapshot::new(vec![]))
        }
    }

    struct AlwaysFailFetcher;

    #[async_trait]
    impl QuotaFetcher for AlwaysFailFetcher {
        fn kind(&self) -> ProviderKind {
            ProviderKind::Claude
        }

        async fn fetch(&self, _account: &AccountRecord) -> Result<QuotaSnapshot, CoreError> {
            Err(CoreError::Other("boom".to_string()))
        }
    }

    fn store() -> (tempfile::TempDir, AuthStore) {
        let dir = tempfile::tempdir().unwrap();
        (dir, AuthStore::at(dir.path()))
    }

    #[tokio::test]
    async fn partial_failure_keeps_other_accounts() {
        let (_dir, store) = store();
        store
            .write("codex-ok", ProviderKind::Codex, |mut r| {
                r.access_token = "tok".to_string();
                r
            })
            .await
            .unwrap();
        store
            .write("claude-bad", ProviderKind::Claude, |mut r| {
                r.access_token = "tok".to_string();
                r
            })
            .await
            .unwrap();

        let refresher = Arc::new(TokenRefresher::new(store.clone()));
        let mut registry = QuotaRegistry::new(store, refresher);
        registry.fetchers.clear();
        registry.fetchers.insert(ProviderKind::Codex, Box::new(AlwaysOkFetcher));
        registry
            .fetchers
            .insert(ProviderKind::Claude, Box::new(AlwaysFailFetcher));

        let result = registry.fetch_all(None).await.unwrap();
        assert_eq!(result.by_key.len(), 1);
        assert!(result.by_key.contains_key("codex-ok"));
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].account_key, "claude-bad");
    }

    #[tokio::test]
    async fn disabled_accounts_are_skipped() {
        let (_dir, store) = store();
        store
            .write("codex-off", ProviderKind::Codex, |mut r| {
                r.disabled = true;
                r
            })
            .await
            .unwrap();

        let refresher = Arc::new(TokenRefresher::new(store.clone()));
        let mut registry = QuotaRegistry::new(store, refresher);
        registry.fetchers.insert(ProviderKind::Codex, Box::new(AlwaysOkFetcher));

        let result = registry.fetch_all(None).await.unwrap();
        assert!(result.by_key.is_empty());
        assert!(result.errors.is_empty());
    }

    #[tokio::test]
    async fn cached_reflects_last_cycle() {
        let (_dir, store) = store();
        store
            .write("codex-ok", ProviderKind::Codex, |mut r| {
                r.access_token = "tok".to_string();
                r
            })
            .await
            .unwrap();

        let refresher = Arc::new(TokenRefresher::new(store.clone()));
        let mut registry = QuotaRegistry::new(store, refresher);
        registry.fetchers.insert(ProviderKind::Codex, Box::new(AlwaysOkFetcher));

        let (before, _) = registry.cached().await;
        assert!(before.is_empty());

        registry.fetch_all(None).await.unwrap();

        let (after, last_fetched) = registry.cached().await;
        assert!(after.contains_key("codex-ok"));
        assert!(last_fetched.is_some());
    }

    struct ForbiddenFetcher;

    #[async_trait]
    impl QuotaFetcher for ForbiddenFetcher {
        fn kind(&self) -> ProviderKind {
            ProviderKind::Claude
        }

        async fn fetch(&self, _account: &AccountRecord) -> Result<QuotaSnapshot, CoreError> {
            Err(CoreError::Forbidden("token rejected".to_string()))
        }
    }

    #[tokio::test]
    async fn forbidden_fetch_attempts_one_reactive_refresh_then_reports_forbidden() {
        let (_dir, store) = store();
        store
            .write("claude-jane", ProviderKind::Claude, |mut r| {
                r.access_token = "sk-ant-whatever".to_string();
                r
            })
            .await
            .unwrap();

        let refresher = TokenRefresher::new(store.clone());
        let outcome = fetch_one(&store, &refresher, &ForbiddenFetcher, "claude-jane", ProviderKind::Claude).await;

        match outcome {
            FetchOutcome::Forbidden { key, message, .. } => {
                assert_eq!(key, "claude-jane");
                assert_eq!(message, "Forbidden: token rejected");
            }
            _ => panic!("expected a Forbidden outcome"),
        }

        // Claude is an opaque-API-key provider with no refresh token, so the
        // one reactive refresh attempt fails and persists `Error`.
        let record = store.read("claude-jane").await.unwrap();
        assert_eq!(record.status, AccountStatus::Error);
    }

    struct RateLimitedFetcher;

    #[async_trait]
    impl QuotaFetcher for RateLimitedFetcher {
        fn kind(&self) -> ProviderKind {
            ProviderKind::Codex
        }

        async fn fetch(&self, _account: &AccountRecord) -> Result<QuotaSnapshot, CoreError> {
            Err(CoreError::RateLimited { retry_after: Some(5) })
        }
    }

    #[tokio::test]
    async fn rate_limited_fetch_cools_the_account_down_without_an_error() {
        let (_dir, store) = store();
        store
            .write("codex-jane", ProviderKind::Codex, |mut r| {
                r.access_token = "tok".to_string();
                r
            })
            .await
            .unwrap();

        let refresher = TokenRefresher::new(store.clone());
        let outcome = fetch_one(&store, &refresher, &RateLimitedFetcher, "codex-jane", ProviderKind::Codex).await;
        assert!(matches!(outcome, FetchOutcome::Cooling { .. }));

        let record = store.read("codex-jane").await.unwrap();
        assert_eq!(record.status, AccountStatus::Cooling);
        assert!(record.cooling_until.unwrap() > Utc::now());
    }

    #[tokio::test]
    async fn cooling_account_is_served_its_cached_snapshot_instead_of_fetched_again() {
        use quotio_core::ModelQuota;

        let (_dir, store) = store();
        store
            .write("codex-ok", ProviderKind::Codex, |mut r| {
                r.access_token = "tok".to_string();
                r.status = AccountStatus::Cooling;
                r.cooling_until = Some(Utc::now() + ChronoDuration::seconds(60));
                r
            })
            .await
            .unwrap();

        let refresher = Arc::new(TokenRefresher::new(store.clone()));
        let mut registry = QuotaRegistry::new(store, refresher);
        registry.fetchers.insert(ProviderKind::Codex, Box::new(AlwaysOkFetcher));

        let cached_snapshot = QuotaSnapshot::new(vec![ModelQuota::from_used_percent("weekly", 10.0)]);
        registry
            .cache
            .write()
            .await
            .insert("codex-ok".to_string(), cached_snapshot.clone());

        let result = registry.fetch_all(None).await.unwrap();
        assert!(result.errors.is_empty());
        assert_eq!(
            result.by_key.get("codex-ok").unwrap().models[0].percent_remaining,
            cached_snapshot.models[0].percent_remaining
        );
    }
}
