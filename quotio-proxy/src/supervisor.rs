//! Owns the lifecycle of the supervised proxy child process: locate,
//! spawn, health-probe, stop, and orphan adoption on boot.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use quotio_core::ProxyProcessState;
use quotio_fetch::HttpClient;
use tokio::process::Command;
use tokio::sync::RwLock;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::error::ProxyError;
use crate::locator::BinaryLocator;

const STARTUP_DEADLINE: Duration = Duration::from_secs(5);
const STARTUP_POLL_INTERVAL: Duration = Duration::from_millis(100);
const STOP_GRACE_PERIOD: Duration = Duration::from_millis(500);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const HEALTH_FAILURE_THRESHOLD: u32 = 2;

/// Supervises exactly one child proxy process at a time.
pub struct ProxySupervisor {
    locator: BinaryLocator,
    http: HttpClient,
    pid_file: PathBuf,
    state: RwLock<ProxyProcessState>,
}

impl ProxySupervisor {
    /// Builds a supervisor rooted at `data_dir` (binary install location and
    /// `proxy.pid`), reporting `default_port` until `start` is first called.
    pub fn new(locator: BinaryLocator, data_dir: impl Into<PathBuf>, default_port: u16) -> Self {
        Self {
            locator,
            http: HttpClient::with_timeout(Duration::from_secs(5)),
            pid_file: data_dir.into().join("proxy.pid"),
            state: RwLock::new(ProxyProcessState::stopped(default_port)),
        }
    }

    fn health_url(port: u16) -> String {
        format!("http://127.0.0.1:{port}/health")
    }

    /// Current lifecycle snapshot.
    pub async fn status(&self) -> ProxyProcessState {
        self.state.read().await.clone()
    }

    /// Resolves the supervised binary's path without starting it, for
    /// version sniffing (`proxy.latestVersion`).
    pub async fn binary_path(&self) -> Result<PathBuf, ProxyError> {
        self.locator.locate().await
    }

    /// Probes the health endpoint once, only if a child is believed to be
    /// running. Does not mutate state.
    pub async fn health(&self) -> bool {
        let state = self.state.read().await;
        state.running && self.probe(state.port).await
    }

    async fn probe(&self, port: u16) -> bool {
        matches!(self.http.get(&Self::health_url(port)).await, Ok(resp) if resp.status().is_success())
    }

    /// Starts the child on `port`. Blocks until the health endpoint answers
    /// 200 or [`ProxyError::StartupTimeout`] elapses.
    #[instrument(skip(self))]
    pub async fn start(self: &Arc<Self>, port: u16) -> Result<ProxyProcessState, ProxyError> {
        if self.state.read().await.running {
            return Err(ProxyError::AlreadyRunning);
        }

        let binary = self.locator.locate().await?;
        info!(binary = %binary.display(), port, "Starting proxy");

        let mut command = Command::new(&binary);
        command
            .args(["--port", &port.to_string()])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let mut child = command
            .spawn()
            .map_err(|e| ProxyError::SpawnFailed(e.to_string()))?;
        let pid = child.id().ok_or_else(|| ProxyError::SpawnFailed("child exited immediately".to_string()))?;

        write_pid_file(&self.pid_file, pid).await?;

        let deadline = tokio::time::Instant::now() + STARTUP_DEADLINE;
        let became_healthy = loop {
            if self.probe(port).await {
                break true;
            }
            if tokio::time::Instant::now() >= deadline {
                break false;
            }
            sleep(STARTUP_POLL_INTERVAL).await;
        };

        if !became_healthy {
            let _ = child.start_kill();
            remove_pid_file(&self.pid_file).await;
            return Err(ProxyError::StartupTimeout);
        }

        *self.state.write().await = ProxyProcessState::started(pid, port, Utc::now());

        let this = Arc::clone(self);
        tokio::spawn(async move {
            this.watch_child(child, pid).await;
        });

        Ok(self.state.read().await.clone())
    }

    async fn watch_child(&self, mut child: tokio::process::Child, pid: u32) {
        match child.wait().await {
            Ok(status) if status.success() => {
                debug!(pid, "Proxy exited cleanly");
                self.mark_stopped(None).await;
            }
            Ok(status) => {
                warn!(pid, code = ?status.code(), "Proxy exited unexpectedly");
                self.mark_stopped(Some(format!("exited with {status}"))).await;
            }
            Err(e) => {
                warn!(pid, error = %e, "Failed to reap proxy child");
                self.mark_stopped(Some(e.to_string())).await;
            }
        }
        remove_pid_file(&self.pid_file).await;
    }

    async fn mark_stopped(&self, error: Option<String>) {
        let mut state = self.state.write().await;
        *state = state.clone().into_stopped(error);
    }

    /// Sends `SIGTERM`, waits up to 500 ms, escalates to `SIGKILL`.
    #[instrument(skip(self))]
    pub async fn stop(&self) -> Result<(), ProxyError> {
        let pid = {
            let state = self.state.read().await;
            state.pid.ok_or(ProxyError::NotRunning)?
        };

        let _ = signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM);

        let deadline = tokio::time::Instant::now() + STOP_GRACE_PERIOD;
        while tokio::time::Instant::now() < deadline {
            if !self.state.read().await.running {
                return Ok(());
            }
            sleep(Duration::from_millis(25)).await;
        }

        if self.state.read().await.running {
            warn!(pid, "Proxy did not exit after SIGTERM, sending SIGKILL");
            let _ = signal::kill(Pid::from_raw(pid as i32), Signal::SIGKILL);
        }

        Ok(())
    }

    /// Runs forever, probing health every 5 s; after two consecutive
    /// failures flips `running` to `false`.
    pub async fn run_health_monitor(self: Arc<Self>) {
        let mut consecutive_failures = 0u32;
        loop {
            sleep(HEALTH_POLL_INTERVAL).await;

            let (running, port) = {
                let state = self.state.read().await;
                (state.running, state.port)
            };
            if !running {
                consecutive_failures = 0;
                continue;
            }

            if self.probe(port).await {
                consecutive_failures = 0;
                self.state.write().await.last_healthy_at = Some(Utc::now());
            } else {
                consecutive_failures += 1;
                if consecutive_failures >= HEALTH_FAILURE_THRESHOLD {
                    warn!(port, "Proxy health checks failing, marking connection lost");
                    self.mark_stopped(Some("connection lost".to_string())).await;
                    consecutive_failures = 0;
                }
            }
        }
    }

    /// Called once at daemon boot. If a stale PID file names a process
    /// that's alive and healthy, adopts it; otherwise kills the owner (if
    /// still alive) and removes the file.
    #[instrument(skip(self))]
    pub async fn adopt_or_cleanup_orphan(&self, expected_port: u16) {
        let Some(pid) = read_pid_file(&self.pid_file).await else {
            return;
        };

        if !process_alive(pid) {
            remove_pid_file(&self.pid_file).await;
            return;
        }

        if self.probe(expected_port).await {
            info!(pid, port = expected_port, "Adopting orphaned proxy process");
            *self.state.write().await = ProxyProcessState::started(pid, expected_port, Utc::now());
        } else {
            warn!(pid, "Orphaned proxy process failed health check, killing it");
            let _ = signal::kill(Pid::from_raw(pid as i32), Signal::SIGKILL);
            remove_pid_file(&self.pid_file).await;
        }
    }
}

fn process_alive(pid: u32) -> bool {
    signal::kill(Pid::from_raw(pid as i32), None).is_ok()
}

async fn write_pid_file(path: &PathBuf, pid: u32) -> Result<(), ProxyError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, pid.to_string()).await?;
    Ok(())
}

async fn remove_pid_file(path: &PathBuf) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(error = %e, path = %path.display(), "Failed to remove PID file");
        }
    }
}

async fn read_pid_file(path: &PathBuf) -> Option<u32> {
    let content = tokio::fs::read_to_string(path).await.ok()?;
    content.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::BinaryLocator;

    #[tokio::test]
    async fn start_fails_with_binary_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let supervisor = Arc::new(ProxySupervisor::new(BinaryLocator::new(dir.path()), dir.path(), 38765));
        let err = supervisor.start(38765).await.unwrap_err();
        assert!(matches!(err, ProxyError::BinaryNotFound(_)));
    }

    #[tokio::test]
    async fn stop_without_start_reports_not_running() {
        let dir = tempfile::tempdir().unwrap();
        let supervisor = ProxySupervisor::new(BinaryLocator::new(dir.path()), dir.path(), 38765);
        let err = supervisor.stop().await.unwrap_err();
        assert!(matches!(err, ProxyError::NotRunning));
    }

    #[tokio::test]
    async fn status_before_any_start_reports_configured_port_and_not_running() {
        let dir = tempfile::tempdir().unwrap();
        let supervisor = ProxySupervisor::new(BinaryLocator::new(dir.path()), dir.path(), 38765);
        let status = supervisor.status().await;
        assert!(!status.running);
        assert_eq!(status.port, 38765);
    }

    #[tokio::test]
    async fn adopt_orphan_with_no_pid_file_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let supervisor = ProxySupervisor::new(BinaryLocator::new(dir.path()), dir.path(), 38765);
        supervisor.adopt_or_cleanup_orphan(38765).await;
        assert!(!supervisor.status().await.running);
    }

    #[tokio::test]
    async fn adopt_orphan_cleans_up_dead_pid() {
        let dir = tempfile::tempdir().unwrap();
        let pid_file = dir.path().join("proxy.pid");
        // A pid that is very unlikely to be alive right now.
        tokio::fs::write(&pid_file, "999999").await.unwrap();

        let supervisor = ProxySupervisor::new(BinaryLocator::new(dir.path()), dir.path(), 38765);
        supervisor.adopt_or_cleanup_orphan(38765).await;

        assert!(!supervisor.status().await.running);
        assert!(!tokio::fs::try_exists(&pid_file).await.unwrap());
    }
}
