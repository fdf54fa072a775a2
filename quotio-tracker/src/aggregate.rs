//! Running totals kept in lockstep with the ring buffer: incremented when
//! an entry is pushed, decremented when it's evicted.

use serde::{Deserialize, Serialize};

use quotio_core::RequestLogEntry;

/// Totals for one provider or one model.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Aggregate {
    /// Number of requests counted.
    pub count: u64,
    /// Sum of input tokens across counted requests.
    pub in_tok_sum: u64,
    /// Sum of output tokens across counted requests.
    pub out_tok_sum: u64,
    /// Sum of request durations in milliseconds.
    pub dur_sum: u64,
    /// Of `count`, how many were successful (see `RequestLogEntry::is_success`).
    pub success_count: u64,
}

impl Aggregate {
    /// Adds one entry's contribution to this aggregate.
    pub fn add(&mut self, entry: &RequestLogEntry) {
        self.count += 1;
        self.in_tok_sum += entry.in_tok.unwrap_or(0);
        self.out_tok_sum += entry.out_tok.unwrap_or(0);
        self.dur_sum += entry.duration_ms;
        if entry.is_success() {
            self.success_count += 1;
        }
    }

    /// Removes one entry's contribution (the mirror of `add`, called when
    /// the ring buffer evicts that entry).
    pub fn remove(&mut self, entry: &RequestLogEntry) {
        self.count = self.count.saturating_sub(1);
        self.in_tok_sum = self.in_tok_sum.saturating_sub(entry.in_tok.unwrap_or(0));
        self.out_tok_sum = self.out_tok_sum.saturating_sub(entry.out_tok.unwrap_or(0));
        self.dur_sum = self.dur_sum.saturating_sub(entry.duration_ms);
        if entry.is_success() {
            self.success_count = self.success_count.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(in_tok: u64, out_tok: u64, duration_ms: u64, status: Option<u16>) -> RequestLogEntry {
        RequestLogEntry {
            id: "01J000000000000000000000".to_string(),
            ts: Utc::now(),
            method: "POST".to_string(),
            endpoint: "/v1/chat/completions".to_string(),
            provider: Some("codex".to_string()),
            model: Some("gpt-5".to_string()),
            in_tok: Some(in_tok),
            out_tok: Some(out_tok),
            duration_ms,
            status,
            req_bytes: 10,
            resp_bytes: 20,
            error: None,
        }
    }

    #[test]
    fn add_then_remove_returns_to_zero() {
        let mut agg = Aggregate::default();
        let e = entry(10, 20, 500, Some(200));
        agg.add(&e);
        assert_eq!(agg.count, 1);
        assert_eq!(agg.success_count, 1);
        agg.remove(&e);
        assert_eq!(agg, Aggregate::default());
    }

    #[test]
    fn failed_requests_dont_count_toward_success() {
        let mut agg = Aggregate::default();
        agg.add(&entry(1, 1, 10, Some(500)));
        assert_eq!(agg.count, 1);
        assert_eq!(agg.success_count, 0);
    }
}
