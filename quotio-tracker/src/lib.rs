//! The Request Tracker: a fixed-capacity ring of recently proxied
//! requests, plus per-provider and per-model aggregates maintained
//! incrementally as entries are pushed and evicted.

pub mod aggregate;
pub mod tracker;

pub use aggregate::Aggregate;
pub use tracker::{RequestTracker, TrackerStats, DEFAULT_CAPACITY};
