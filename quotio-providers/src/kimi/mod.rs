//! Kimi (Moonshot AI) provider implementation.
//!
//! Kimi exposes no usage API, so this provider is PTY-only: it drives the
//! `kimi` CLI's `/usage` command the same way Codex's PTY fallback works.

mod descriptor;
mod error;
mod fetcher;
mod pty_probe;
mod strategies;

pub use descriptor::kimi_descriptor;
pub use error::KimiError;
pub use fetcher::KimiUsageFetcher;
pub use pty_probe::{parse_usage_output, KimiPtyProbe, KimiUsageSnapshot};
pub use strategies::KimiPtyStrategy;
