//! Locates the child proxy binary.
//!
//! Three candidates are tried in order: an explicit app-resources
//! directory (the common case when this daemon ships inside a desktop
//! app bundle), a bundled per-platform asset path, and a previously
//! extracted, version-pinned copy under `<data-dir>/bin/<name>`. The
//! first one that resolves to an existing file wins.

use std::path::{Path, PathBuf};

use quotio_fetch::ProcessRunner;
use tracing::{debug, info, instrument};

use crate::error::ProxyError;

/// Default binary name on this platform.
#[cfg(not(target_os = "windows"))]
pub const DEFAULT_BINARY_NAME: &str = "cli-proxy-api";
#[cfg(target_os = "windows")]
pub const DEFAULT_BINARY_NAME: &str = "cli-proxy-api.exe";

/// Resolves the path to the supervised proxy binary.
#[derive(Debug, Clone)]
pub struct BinaryLocator {
    app_resources_dir: Option<PathBuf>,
    bundled_asset: Option<PathBuf>,
    data_dir: PathBuf,
    binary_name: String,
}

impl BinaryLocator {
    /// Builds a locator rooted at `data_dir` (where a previously extracted
    /// binary lives, or where a bundled asset gets extracted to).
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            app_resources_dir: None,
            bundled_asset: None,
            data_dir: data_dir.into(),
            binary_name: DEFAULT_BINARY_NAME.to_string(),
        }
    }

    /// Sets the app-resources directory to check first (highest priority).
    pub fn with_app_resources_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.app_resources_dir = Some(dir.into());
        self
    }

    /// Sets a bundled per-platform asset path to extract if no installed
    /// copy is found.
    pub fn with_bundled_asset(mut self, path: impl Into<PathBuf>) -> Self {
        self.bundled_asset = Some(path.into());
        self
    }

    fn installed_path(&self) -> PathBuf {
        self.data_dir.join("bin").join(&self.binary_name)
    }

    /// Resolves the binary path, extracting a bundled asset if necessary.
    #[instrument(skip(self))]
    pub async fn locate(&self) -> Result<PathBuf, ProxyError> {
        if let Some(dir) = &self.app_resources_dir {
            let candidate = dir.join(&self.binary_name);
            if tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
                debug!(path = %candidate.display(), "Found proxy binary in app resources");
                return Ok(candidate);
            }
        }

        let installed = self.installed_path();
        if tokio::fs::try_exists(&installed).await.unwrap_or(false) {
            debug!(path = %installed.display(), "Found previously extracted proxy binary");
            return Ok(installed);
        }

        if let Some(asset) = &self.bundled_asset {
            if tokio::fs::try_exists(asset).await.unwrap_or(false) {
                self.extract(asset, &installed).await?;
                return Ok(installed);
            }
        }

        Err(ProxyError::BinaryNotFound(format!(
            "no proxy binary at app resources, {}, or a bundled asset",
            installed.display()
        )))
    }

    async fn extract(&self, asset: &Path, destination: &Path) -> Result<(), ProxyError> {
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(asset, destination).await?;
        set_executable(destination).await?;
        info!(from = %asset.display(), to = %destination.display(), "Extracted proxy binary");
        Ok(())
    }
}

#[cfg(unix)]
async fn set_executable(path: &Path) -> Result<(), ProxyError> {
    use std::os::unix::fs::PermissionsExt;
    let metadata = tokio::fs::metadata(path).await?;
    let mut perms = metadata.permissions();
    perms.set_mode(0o755);
    tokio::fs::set_permissions(path, perms).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn set_executable(_path: &Path) -> Result<(), ProxyError> {
    Ok(())
}

/// Sniffs the installed binary's version via `<bin> --version`.
pub async fn sniff_version(binary: &Path) -> Option<String> {
    let runner = ProcessRunner::new();
    let output = runner.run(binary.to_str()?, &["--version"]).await.ok()?;
    output.success().then(|| output.stdout.trim().to_string())
}
