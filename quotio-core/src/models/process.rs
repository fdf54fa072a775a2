//! Child-proxy process state and request-tracker log entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Observable state of the supervised child proxy process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyProcessState {
    /// Whether the child is currently believed to be running.
    pub running: bool,
    /// OS pid, valid iff `running`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    /// Port the child's proxy server listens on.
    pub port: u16,
    /// When the child was started.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// Last time the health probe succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_healthy_at: Option<DateTime<Utc>>,
    /// Exit status or supervisor-side error from the last stop or crash.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl ProxyProcessState {
    /// The all-stopped state reported before `proxy.start` is ever called.
    pub fn stopped(port: u16) -> Self {
        Self {
            running: false,
            pid: None,
            port,
            started_at: None,
            last_healthy_at: None,
            last_error: None,
        }
    }

    /// The state right after a successful `start`.
    pub fn started(pid: u32, port: u16, now: DateTime<Utc>) -> Self {
        Self {
            running: true,
            pid: Some(pid),
            port,
            started_at: Some(now),
            last_healthy_at: Some(now),
            last_error: None,
        }
    }

    /// Transitions to stopped, keeping `port` and recording why (if the
    /// exit was unexpected).
    pub fn into_stopped(self, error: Option<String>) -> Self {
        Self {
            running: false,
            pid: None,
            last_error: error,
            ..self
        }
    }

    /// `true` if the last health probe is recent enough to call healthy.
    pub fn is_healthy(&self, now: DateTime<Utc>, max_age: chrono::Duration) -> bool {
        self.running
            && self
                .last_healthy_at
                .is_some_and(|t| now - t <= max_age)
    }
}

/// One entry in the Request Tracker's ring buffer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestLogEntry {
    /// ULID, unique and lexicographically sortable by creation time.
    pub id: String,
    /// When the request was recorded.
    pub ts: DateTime<Utc>,
    /// HTTP method of the proxied request.
    pub method: String,
    /// Endpoint path the proxied request hit.
    pub endpoint: String,
    /// Provider the request was routed to, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Model name, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Input token count, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_tok: Option<u64>,
    /// Output token count, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_tok: Option<u64>,
    /// Wall-clock duration of the request in milliseconds.
    pub duration_ms: u64,
    /// HTTP status code returned to the client, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Request body size in bytes.
    #[serde(default)]
    pub req_bytes: u64,
    /// Response body size in bytes.
    #[serde(default)]
    pub resp_bytes: u64,
    /// Error message, if the request failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RequestLogEntry {
    /// Builds a fresh entry, timestamped now and id'd with a new ULID so
    /// entries sort lexicographically by creation order.
    pub fn new(method: impl Into<String>, endpoint: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            id: Ulid::new().to_string(),
            ts: Utc::now(),
            method: method.into(),
            endpoint: endpoint.into(),
            provider: None,
            model: None,
            in_tok: None,
            out_tok: None,
            duration_ms,
            status: None,
            req_bytes: 0,
            resp_bytes: 0,
            error: None,
        }
    }

    /// Attaches the provider this request was routed to.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Attaches the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Attaches input/output token counts.
    pub fn with_tokens(mut self, in_tok: Option<u64>, out_tok: Option<u64>) -> Self {
        self.in_tok = in_tok;
        self.out_tok = out_tok;
        self
    }

    /// Attaches the HTTP status returned to the client.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Attaches request/response body sizes.
    pub fn with_bytes(mut self, req_bytes: u64, resp_bytes: u64) -> Self {
        self.req_bytes = req_bytes;
        self.resp_bytes = resp_bytes;
        self
    }

    /// Attaches an error message.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// `true` if `status` is a successful HTTP status or unknown-but-error-free.
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.status.is_none_or(|s| (200..400).contains(&s))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopped_state_has_no_pid() {
        let s = ProxyProcessState::stopped(18317);
        assert!(!s.running);
        assert!(s.pid.is_none());
        assert_eq!(s.port, 18317);
    }

    #[test]
    fn healthy_requires_recent_probe() {
        let now = Utc::now();
        let mut s = ProxyProcessState::stopped(1);
        s.running = true;
        s.last_healthy_at = Some(now - chrono::Duration::seconds(3));
        assert!(s.is_healthy(now, chrono::Duration::seconds(10)));

        s.last_healthy_at = Some(now - chrono::Duration::seconds(30));
        assert!(!s.is_healthy(now, chrono::Duration::seconds(10)));
    }

    #[test]
    fn started_then_into_stopped_preserves_port_and_records_error() {
        let now = Utc::now();
        let state = ProxyProcessState::started(4242, 18317, now);
        assert!(state.running);
        assert_eq!(state.pid, Some(4242));

        let stopped = state.into_stopped(Some("exited with code 1".to_string()));
        assert!(!stopped.running);
        assert!(stopped.pid.is_none());
        assert_eq!(stopped.port, 18317);
        assert_eq!(stopped.last_error.as_deref(), Some("exited with code 1"));
    }

    fn sample_entry(status: Option<u16>, error: Option<&str>) -> RequestLogEntry {
        RequestLogEntry {
            id: "01J000000000000000000000".to_string(),
            ts: Utc::now(),
            method: "POST".to_string(),
            endpoint: "/v1/chat/completions".to_string(),
            provider: Some("codex".to_string()),
            model: Some("gpt-5".to_string()),
            in_tok: Some(10),
            out_tok: Some(20),
            duration_ms: 500,
            status,
            req_bytes: 100,
            resp_bytes: 200,
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn new_entry_gets_a_fresh_ulid_and_no_optional_fields() {
        let a = RequestLogEntry::new("POST", "/v1/chat/completions", 42);
        let b = RequestLogEntry::new("POST", "/v1/chat/completions", 42);
        assert_ne!(a.id, b.id);
        assert!(a.provider.is_none());
        assert!(a.status.is_none());
        assert_eq!(a.duration_ms, 42);
    }

    #[test]
    fn builder_methods_set_expected_fields() {
        let entry = RequestLogEntry::new("POST", "/v1/chat/completions", 42)
            .with_provider("codex")
            .with_model("gpt-5")
            .with_tokens(Some(10), Some(20))
            .with_status(200)
            .with_bytes(100, 200);
        assert_eq!(entry.provider.as_deref(), Some("codex"));
        assert_eq!(entry.model.as_deref(), Some("gpt-5"));
        assert_eq!(entry.in_tok, Some(10));
        assert_eq!(entry.status, Some(200));
        assert_eq!(entry.req_bytes, 100);
    }

    #[test]
    fn success_requires_no_error_and_2xx_3xx() {
        assert!(sample_entry(Some(200), None).is_success());
        assert!(!sample_entry(Some(500), None).is_success());
        assert!(!sample_entry(Some(200), Some("boom")).is_success());
        assert!(sample_entry(None, None).is_success());
    }
}
