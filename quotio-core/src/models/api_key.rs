//! API keys gating access to the supervised proxy's HTTP surface.
//!
//! Distinct from an [`AccountRecord`](super::AccountRecord): an account is a
//! provider credential the daemon uses outbound; an API key is a bearer
//! token the daemon's own proxy checks on inbound requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One issued API key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyRecord {
    /// Stable id, independent of the key's secret value.
    pub id: String,
    /// The bearer value clients present.
    pub value: String,
    /// Caller-supplied label, e.g. which tool it was issued to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// When this key was issued.
    pub created_at: DateTime<Utc>,
}

impl ApiKeyRecord {
    /// Builds a new key with a freshly generated id and value.
    pub fn new(label: Option<String>) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            value: format!("qtk_{}", ulid::Ulid::new()),
            label,
            created_at: Utc::now(),
        }
    }
}
