//! Single-instance discipline: `<config-dir>/quotio.pid`.

use std::path::{Path, PathBuf};

use nix::sys::signal;
use nix::unistd::Pid;
use tracing::{info, warn};

use crate::error::DaemonError;

/// Checks `path` for a live owner and, if none, claims it for the current
/// process.
///
/// Returns [`DaemonError::AlreadyRunning`] if the file names a process that
/// responds to signal 0. A stale file (process gone) is overwritten
/// silently.
pub async fn claim(path: &Path) -> Result<(), DaemonError> {
    if let Some(pid) = read(path).await {
        if alive(pid) {
            return Err(DaemonError::AlreadyRunning(pid));
        }
        warn!(pid, path = %path.display(), "removing stale pid file");
    }

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, std::process::id().to_string()).await?;
    info!(pid = std::process::id(), path = %path.display(), "claimed pid file");
    Ok(())
}

/// Removes the PID file on graceful shutdown. Not an error if it's
/// already gone.
pub async fn release(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(error = %e, path = %path.display(), "failed to remove pid file");
        }
    }
}

async fn read(path: &Path) -> Option<u32> {
    tokio::fs::read_to_string(path).await.ok()?.trim().parse().ok()
}

fn alive(pid: u32) -> bool {
    signal::kill(Pid::from_raw(pid as i32), None).is_ok()
}

/// Default PID file path, `<config-dir>/quotio.pid`.
pub fn default_path() -> PathBuf {
    quotio_store::default_config_dir().join("quotio.pid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn claim_writes_current_pid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quotio.pid");

        claim(&path).await.unwrap();
        let written: u32 = tokio::fs::read_to_string(&path).await.unwrap().trim().parse().unwrap();
        assert_eq!(written, std::process::id());
    }

    #[tokio::test]
    async fn claim_fails_when_current_process_already_owns_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quotio.pid");

        tokio::fs::write(&path, std::process::id().to_string()).await.unwrap();
        let err = claim(&path).await.unwrap_err();
        assert!(matches!(err, DaemonError::AlreadyRunning(_)));
    }

    #[tokio::test]
    async fn claim_overwrites_a_stale_pid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quotio.pid");

        tokio::fs::write(&path, "999999").await.unwrap();
        claim(&path).await.unwrap();

        let written: u32 = tokio::fs::read_to_string(&path).await.unwrap().trim().parse().unwrap();
        assert_eq!(written, std::process::id());
    }

    #[tokio::test]
    async fn release_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quotio.pid");
        release(&path).await;
        release(&path).await;
    }
}
