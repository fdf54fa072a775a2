//! PTY-based Kimi usage probe.
//!
//! Kimi (Moonshot AI) has no public usage HTTP endpoint, so usage is
//! scraped the same way Codex's fallback does: drive the `kimi` CLI
//! interactively and parse its `/usage` output.
//!
//! # Output Format
//!
//! ```text
//! Plan: Kimi+
//! 5h window: 37% left (resets in 2h14m)
//! Weekly window: 88% left (resets in 4d)
//! ```

use quotio_fetch::host::pty::{PtyOptions, PtyRunner};
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, instrument};

use super::error::KimiError;

const KIMI_BINARY: &str = "kimi";
const PTY_TIMEOUT: Duration = Duration::from_secs(30);
const IDLE_TIMEOUT: Duration = Duration::from_secs(5);
const STOP_PATTERNS: &[&str] = &["Weekly window:", "Error:", "error:"];

static PERCENT_LEFT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(5h|weekly)\s*window\s*:\s*(\d+(?:\.\d+)?)%\s*left(?:\s*\(resets in ([^)]+)\))?")
        .expect("invalid regex")
});

static PLAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)plan\s*:\s*(\S+)").expect("invalid regex"));

/// Parsed `/usage` output.
#[derive(Debug, Clone, Default)]
pub struct KimiUsageSnapshot {
    /// 5-hour window, percentage remaining.
    pub primary_left_percent: Option<f64>,
    /// 5-hour window, human-readable reset description, if printed.
    pub primary_reset: Option<String>,
    /// Weekly window, percentage remaining.
    pub secondary_left_percent: Option<f64>,
    /// Weekly window, human-readable reset description, if printed.
    pub secondary_reset: Option<String>,
    /// Plan name, if reported.
    pub plan: Option<String>,
    /// Raw PTY output, kept for debugging parse misses.
    pub raw_output: String,
}

impl KimiUsageSnapshot {
    /// Returns `true` if any window was parsed out of the output.
    pub fn has_data(&self) -> bool {
        self.primary_left_percent.is_some() || self.secondary_left_percent.is_some()
    }
}

/// PTY-based probe for Kimi CLI usage.
#[derive(Debug, Clone, Default)]
pub struct KimiPtyProbe {
    runner: PtyRunner,
}

impl KimiPtyProbe {
    /// Creates a new probe.
    pub fn new() -> Self {
        Self {
            runner: PtyRunner::new(120, 40),
        }
    }

    /// Returns `true` if the `kimi` binary is on `PATH`.
    pub fn is_available() -> bool {
        PtyRunner::exists(KIMI_BINARY)
    }

    /// Drives `kimi` interactively and parses its `/usage` output.
    #[instrument(skip(self))]
    pub async fn fetch_usage(&self) -> Result<KimiUsageSnapshot, KimiError> {
        if !Self::is_available() {
            return Err(KimiError::BinaryNotFound(KIMI_BINARY.to_string()));
        }

        let options = PtyOptions::with_timeout(PTY_TIMEOUT)
            .with_idle_timeout(IDLE_TIMEOUT)
            .stop_on_any(STOP_PATTERNS.iter().copied())
            .with_env("TERM", "xterm-256color")
            .with_env("NO_COLOR", "1");

        let input = "/usage\nexit\n";
        let result = self.runner.run(KIMI_BINARY, input, options).await?;

        debug!(
            output_len = result.output.len(),
            timed_out = result.timed_out,
            "Kimi PTY command completed"
        );

        let snapshot = parse_usage_output(&result.output);
        if !snapshot.has_data() {
            return Err(KimiError::NoData);
        }
        Ok(snapshot)
    }
}

/// Parses the `/usage` command's raw terminal output. Looks for a line
/// containing `"% left"`; a window with no such line is left unset
/// rather than defaulted to zero.
pub fn parse_usage_output(text: &str) -> KimiUsageSnapshot {
    let mut snapshot = KimiUsageSnapshot {
        raw_output: text.to_string(),
        ..Default::default()
    };

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = PERCENT_LEFT_RE.captures(line) {
            let window = caps.get(1).map(|m| m.as_str().to_lowercase());
            let percent: Option<f64> = caps.get(2).and_then(|m| m.as_str().parse().ok());
            let reset = caps.get(3).map(|m| m.as_str().trim().to_string());
            if let (Some(window), Some(percent)) = (window, percent) {
                if window == "5h" {
                    snapshot.primary_left_percent = Some(percent);
                    snapshot.primary_reset = reset;
                } else {
                    snapshot.secondary_left_percent = Some(percent);
                    snapshot.secondary_reset = reset;
                }
            }
            continue;
        }

        if let Some(caps) = PLAN_RE.captures(line) {
            if let Some(plan) = caps.get(1) {
                snapshot.plan = Some(plan.as_str().to_string());
            }
        }
    }

    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_windows() {
        let out = "Plan: Kimi+\n5h window: 37% left (resets in 2h14m)\nWeekly window: 88% left (resets in 4d)";
        let snapshot = parse_usage_output(out);
        assert!(snapshot.has_data());
        assert_eq!(snapshot.primary_left_percent, Some(37.0));
        assert_eq!(snapshot.primary_reset, Some("2h14m".to_string()));
        assert_eq!(snapshot.secondary_left_percent, Some(88.0));
        assert_eq!(snapshot.secondary_reset, Some("4d".to_string()));
        assert_eq!(snapshot.plan, Some("Kimi+".to_string()));
    }

    #[test]
    fn parses_without_reset_clause() {
        let out = "5h window: 37% left";
        let snapshot = parse_usage_output(out);
        assert_eq!(snapshot.primary_left_percent, Some(37.0));
        assert!(snapshot.primary_reset.is_none());
    }

    #[test]
    fn empty_output_has_no_data() {
        let snapshot = parse_usage_output("no recognizable lines here");
        assert!(!snapshot.has_data());
    }

    #[test]
    fn is_available_runs() {
        let _ = KimiPtyProbe::is_available();
    }
}
