//! Normalized quota types returned by the fetcher registry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UsageSnapshot;

/// Sentinel used wherever a percentage is unknown rather than zero.
pub const UNKNOWN_PERCENT: f64 = -1.0;

/// One window of quota for one model/tier, e.g. `codex-session` or `weekly`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelQuota {
    /// Stable window name (`codex-session`, `codex-weekly`, `weekly`, `5-hour`, ...).
    pub name: String,
    /// Percentage remaining in `[0, 100]`, or [`UNKNOWN_PERCENT`] if unknown.
    pub percent_remaining: f64,
    /// When this window resets, if the provider reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_at: Option<DateTime<Utc>>,
    /// Raw used amount, if the provider reports absolute numbers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used: Option<f64>,
    /// Raw limit, if the provider reports absolute numbers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<f64>,
    /// Raw remaining, if the provider reports absolute numbers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining: Option<f64>,
}

impl ModelQuota {
    /// Builds a window from `used`/`limit`, deriving `percent_remaining`.
    pub fn from_used_limit(name: impl Into<String>, used: f64, limit: f64) -> Self {
        let remaining = (limit - used).max(0.0);
        let percent_remaining = if limit > 0.0 {
            (remaining / limit * 100.0).clamp(0.0, 100.0)
        } else {
            UNKNOWN_PERCENT
        };
        Self {
            name: name.into(),
            percent_remaining,
            reset_at: None,
            used: Some(used),
            limit: Some(limit),
            remaining: Some(remaining),
        }
    }

    /// Builds a window from a provider's `used_percent`, per the Codex contract
    /// (`percent_remaining = 100 - used_percent`).
    pub fn from_used_percent(name: impl Into<String>, used_percent: f64) -> Self {
        let used_percent = if used_percent.is_finite() {
            used_percent.clamp(0.0, 100.0)
        } else {
            0.0
        };
        Self {
            name: name.into(),
            percent_remaining: (100.0 - used_percent).clamp(0.0, 100.0),
            reset_at: None,
            used: None,
            limit: None,
            remaining: None,
        }
    }

    /// Builds a window whose percentage is explicitly unknown.
    pub fn unknown(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            percent_remaining: UNKNOWN_PERCENT,
            reset_at: None,
            used: None,
            limit: None,
            remaining: None,
        }
    }

    /// Attaches a reset time, builder-style.
    pub fn with_reset_at(mut self, reset_at: DateTime<Utc>) -> Self {
        self.reset_at = Some(reset_at);
        self
    }

    /// Returns `true` if this window's percentage is the unknown sentinel.
    pub fn is_unknown(&self) -> bool {
        self.percent_remaining < 0.0
    }
}

/// Normalized quota view for one account, as returned by a Fetcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaSnapshot {
    /// One entry per model/window the provider reports.
    pub models: Vec<ModelQuota>,
    /// When this snapshot was produced.
    pub fetched_at: DateTime<Utc>,
    /// `true` if the provider answered 401/403 after a fresh refresh.
    #[serde(default)]
    pub is_forbidden: bool,
    /// Plan/subscription label, if the provider reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_label: Option<String>,
}

impl QuotaSnapshot {
    /// Adapts a legacy [`UsageSnapshot`] (primary/secondary/tertiary windows)
    /// into the normalized window-list shape fetchers return.
    ///
    /// Used by fetchers built around older per-provider usage-window clients:
    /// each populated window becomes one named [`ModelQuota`].
    pub fn from_usage_snapshot(snapshot: &UsageSnapshot) -> Self {
        let mut models = Vec::with_capacity(3);
        for (name, window) in [
            ("primary", &snapshot.primary),
            ("secondary", &snapshot.secondary),
            ("tertiary", &snapshot.tertiary),
        ] {
            if let Some(window) = window {
                let mut mq = ModelQuota::from_used_percent(name, window.used_percent);
                if let Some(reset_at) = window.resets_at {
                    mq = mq.with_reset_at(reset_at);
                }
                models.push(mq);
            }
        }

        Self {
            models,
            fetched_at: snapshot.updated_at,
            is_forbidden: false,
            plan_label: snapshot.identity.as_ref().and_then(|i| i.plan_name.clone()),
        }
    }

    /// Builds a snapshot from a set of windows, stamped with the current time.
    pub fn new(models: Vec<ModelQuota>) -> Self {
        Self {
            models,
            fetched_at: Utc::now(),
            is_forbidden: false,
            plan_label: None,
        }
    }

    /// Builds the snapshot cached for a forbidden (401/403) account.
    ///
    /// `previous` lets the cache keep showing the last-known models rather
    /// than hiding the account entirely.
    pub fn forbidden(previous: Option<&QuotaSnapshot>) -> Self {
        Self {
            models: previous.map(|p| p.models.clone()).unwrap_or_default(),
            fetched_at: Utc::now(),
            is_forbidden: true,
            plan_label: previous.and_then(|p| p.plan_label.clone()),
        }
    }

    /// Returns the lowest `percent_remaining` across known windows, ignoring
    /// unknown (`-1`) entries. `None` if every window is unknown or there are
    /// no windows at all.
    pub fn min_percent_remaining(&self) -> Option<f64> {
        self.models
            .iter()
            .filter(|m| !m.is_unknown())
            .map(|m| m.percent_remaining)
            .fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.min(v))))
    }
}

// ============================================================================
// Tests
// ============================================================================
