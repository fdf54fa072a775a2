//! The fixed-capacity ring buffer of recent requests, plus aggregates kept
//! incrementally in step with it.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use quotio_core::RequestLogEntry;
use tokio::sync::RwLock;

use crate::aggregate::Aggregate;

/// Default ring capacity, matching the Request Tracker's default.
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Snapshot of every maintained aggregate (`stats.get`).
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct TrackerStats {
    /// Totals across every request.
    pub totals: Aggregate,
    /// Totals keyed by provider.
    pub by_provider: HashMap<String, Aggregate>,
    /// Totals keyed by model.
    pub by_model: HashMap<String, Aggregate>,
    /// Current ring occupancy.
    pub entry_count: usize,
    /// Configured ring capacity.
    pub capacity: usize,
}

struct State {
    entries: VecDeque<RequestLogEntry>,
    by_provider: HashMap<String, Aggregate>,
    by_model: HashMap<String, Aggregate>,
    totals: Aggregate,
}

impl State {
    fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            by_provider: HashMap::new(),
            by_model: HashMap::new(),
            totals: Aggregate::default(),
        }
    }
}

/// In-memory request log, shared (behind an `Arc`) between the proxy
/// traffic observer and the `stats.*`/`logs.*` RPC handlers.
pub struct RequestTracker {
    capacity: usize,
    state: RwLock<State>,
}

impl RequestTracker {
    /// Builds an empty tracker holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: RwLock::new(State::new()),
        }
    }

    /// Pushes a new entry, evicting the oldest if at capacity. Aggregates
    /// are decremented for the evicted row, then incremented for the new
    /// one.
    pub async fn add(&self, entry: RequestLogEntry) {
        let mut state = self.state.write().await;

        if state.entries.len() >= self.capacity {
            if let Some(evicted) = state.entries.pop_front() {
                state.totals.remove(&evicted);
                if let Some(provider) = &evicted.provider {
                    if let Some(agg) = state.by_provider.get_mut(provider) {
                        agg.remove(&evicted);
                    }
                }
                if let Some(model) = &evicted.model {
                    if let Some(agg) = state.by_model.get_mut(model) {
                        agg.remove(&evicted);
                    }
                }
            }
        }

        state.totals.add(&entry);
        if let Some(provider) = &entry.provider {
            state.by_provider.entry(provider.clone()).or_default().add(&entry);
        }
        if let Some(model) = &entry.model {
            state.by_model.entry(model.clone()).or_default().add(&entry);
        }
        state.entries.push_back(entry);
    }

    /// Lists entries, optionally filtered to one provider and/or a recency
    /// window (`minutes` before now). Newest first.
    pub async fn list(&self, provider: Option<&str>, minutes: Option<i64>) -> Vec<RequestLogEntry> {
        let state = self.state.read().await;
        let cutoff = minutes.map(|m| Utc::now() - chrono::Duration::minutes(m));

        state
            .entries
            .iter()
            .rev()
            .filter(|e| provider.is_none_or(|p| e.provider.as_deref() == Some(p)))
            .filter(|e| cutoff.is_none_or(|c| e.ts >= c))
            .cloned()
            .collect()
    }

    /// Entries with an id lexicographically greater than `after` (or every
    /// entry, if `after` is `None`), oldest first, plus the total ring
    /// occupancy and the newest entry's id.
    pub async fn fetch_after(&self, after: Option<&str>) -> (Vec<RequestLogEntry>, usize, Option<String>) {
        let state = self.state.read().await;
        let matches: Vec<RequestLogEntry> = state
            .entries
            .iter()
            .filter(|e| after.is_none_or(|cursor| e.id.as_str() > cursor))
            .cloned()
            .collect();
        let last_id = state.entries.back().map(|e| e.id.clone());
        (matches, state.entries.len(), last_id)
    }

    /// Snapshot of every maintained aggregate.
    pub async fn stats(&self) -> TrackerStats {
        let state = self.state.read().await;
        TrackerStats {
            totals: state.totals,
            by_provider: state.by_provider.clone(),
            by_model: state.by_model.clone(),
            entry_count: state.entries.len(),
            capacity: self.capacity,
        }
    }

    /// Drops every entry and resets aggregates to zero (`stats.clear` /
    /// `logs.clear`).
    pub async fn clear(&self) {
        *self.state.write().await = State::new();
    }

    /// When the oldest retained entry was recorded, if any.
    pub async fn oldest_ts(&self) -> Option<DateTime<Utc>> {
        self.state.read().await.entries.front().map(|e| e.ts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(provider: &str, model: &str) -> RequestLogEntry {
        RequestLogEntry::new("POST", "/v1/chat/completions", 10)
            .with_provider(provider)
            .with_model(model)
            .with_status(200)
    }

    #[tokio::test]
    async fn add_increments_totals_and_per_provider_aggregate() {
        let tracker = RequestTracker::new(10);
        tracker.add(entry("codex", "gpt-5")).await;
        tracker.add(entry("codex", "gpt-5")).await;
        tracker.add(entry("claude", "opus")).await;

        let stats = tracker.stats().await;
        assert_eq!(stats.totals.count, 3);
        assert_eq!(stats.by_provider["codex"].count, 2);
        assert_eq!(stats.by_provider["claude"].count, 1);
        assert_eq!(stats.by_model["gpt-5"].count, 2);
        assert_eq!(stats.entry_count, 3);
    }

    #[tokio::test]
    async fn eviction_at_capacity_decrements_aggregates() {
        let tracker = RequestTracker::new(2);
        tracker.add(entry("codex", "gpt-5")).await;
        tracker.add(entry("codex", "gpt-5")).await;
        tracker.add(entry("codex", "gpt-5")).await;

        let stats = tracker.stats().await;
        assert_eq!(stats.entry_count, 2);
        assert_eq!(stats.totals.count, 2);
        assert_eq!(stats.by_provider["codex"].count, 2);
    }

    #[tokio::test]
    async fn list_filters_by_provider_and_is_newest_first() {
        let tracker = RequestTracker::new(10);
        tracker.add(entry("codex", "gpt-5")).await;
        tracker.add(entry("claude", "opus")).await;
        tracker.add(entry("codex", "gpt-5")).await;

        let codex_only = tracker.list(Some("codex"), None).await;
        assert_eq!(codex_only.len(), 2);

        let all = tracker.list(None, None).await;
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn fetch_after_returns_only_newer_entries() {
        let tracker = RequestTracker::new(10);
        tracker.add(entry("codex", "gpt-5")).await;
        let (first_batch, total, last_id) = tracker.fetch_after(None).await;
        assert_eq!(first_batch.len(), 1);
        assert_eq!(total, 1);
        let cursor = last_id.unwrap();

        tracker.add(entry("codex", "gpt-5")).await;
        let (second_batch, total, _) = tracker.fetch_after(Some(&cursor)).await;
        assert_eq!(second_batch.len(), 1);
        assert_eq!(total, 2);
    }

    #[tokio::test]
    async fn clear_resets_everything() {
        let tracker = RequestTracker::new(10);
        tracker.add(entry("codex", "gpt-5")).await;
        tracker.clear().await;

        let stats = tracker.stats().await;
        assert_eq!(stats.totals.count, 0);
        assert!(stats.by_provider.is_empty());
        assert_eq!(stats.entry_count, 0);
    }
}
