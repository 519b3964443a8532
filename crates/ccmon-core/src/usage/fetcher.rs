//! Runs ccusage through `npx` to fetch raw report text.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info, warn};

/// System directories prepended to PATH so `npx` can find `node`
const SYSTEM_PATH_PREFIX: &str = "/usr/local/bin:/usr/bin:/bin:/usr/sbin:/sbin";

/// Fixed `npx` install locations checked after `which`
const NPX_LOCATIONS: &[&str] = &["/usr/local/bin/npx", "/usr/bin/npx", "/opt/homebrew/bin/npx"];

/// Error from a report invocation
#[derive(Debug, Error)]
pub enum ReportError {
    /// `npx` could not be located
    #[error("npx not found; is Node.js installed?")]
    ToolNotFound,

    /// The process could not be started
    #[error("failed to start ccusage: {0}")]
    Spawn(#[from] std::io::Error),

    /// The process did not finish in time
    #[error("ccusage timed out after {0}s")]
    Timeout(u64),

    /// The process exited with a failure code
    #[error("ccusage exited with code {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },
}

/// Which ccusage report to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Session blocks
    Blocks,
    /// Per-day breakdown
    Daily,
}

impl ReportKind {
    /// ccusage arguments for this report (always `--mode calculate`)
    pub fn args(&self) -> &'static [&'static str] {
        match self {
            ReportKind::Blocks => &["blocks", "--mode", "calculate"],
            ReportKind::Daily => &["daily", "--mode", "calculate", "--order", "asc"],
        }
    }
}

/// Raw result of one invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOutput {
    /// Exit code (-1 when terminated by a signal)
    pub exit_code: i32,
    /// Captured stdout
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
}

impl ReportOutput {
    /// Report text, or `NonZeroExit` when the tool failed
    pub fn into_stdout(self) -> Result<String, ReportError> {
        if self.exit_code == 0 {
            Ok(self.stdout)
        } else {
            Err(ReportError::NonZeroExit {
                code: self.exit_code,
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

/// Source of ccusage report text
pub trait ReportRunner: Send + Sync {
    /// Run a report under the runner's timeout
    fn run_report(
        &self,
        kind: ReportKind,
    ) -> impl Future<Output = Result<ReportOutput, ReportError>> + Send;

    /// Refresh the tool itself; returns the new version string
    fn self_update(&self) -> impl Future<Output = Result<String, ReportError>> + Send;
}

/// Runs `npx <package> ...` as a subprocess
pub struct CcusageRunner {
    /// npm package spec (e.g., "ccusage@latest")
    package: String,
    /// Explicit npx path from settings
    npx_override: Option<PathBuf>,
    /// Hard timeout per invocation
    timeout: Duration,
    /// npx path resolved on first use
    npx_path: Mutex<Option<PathBuf>>,
}

impl CcusageRunner {
    /// Create a runner for `package` with the given timeout
    pub fn new(package: String, npx_override: Option<PathBuf>, timeout_secs: u64) -> Self {
        Self {
            package,
            npx_override,
            timeout: Duration::from_secs(timeout_secs),
            npx_path: Mutex::new(None),
        }
    }

    /// Locate `npx`, caching the first hit
    pub fn resolve_npx(&self) -> Option<PathBuf> {
        if let Some(ref path) = self.npx_override {
            return Some(path.clone());
        }

        let mut cached = self.npx_path.lock();
        if let Some(ref path) = *cached {
            return Some(path.clone());
        }

        let found = which_npx().or_else(|| candidate_paths().into_iter().find(|p| is_executable(p)));
        match found {
            Some(ref path) => info!("Using npx at {}", path.display()),
            None => warn!(
                "npx not found (PATH={})",
                std::env::var("PATH").unwrap_or_default()
            ),
        }
        *cached = found.clone();
        found
    }

    async fn run_npx(&self, args: &[&str]) -> Result<ReportOutput, ReportError> {
        let npx = self.resolve_npx().ok_or(ReportError::ToolNotFound)?;
        let path_env = format!(
            "{}:{}",
            SYSTEM_PATH_PREFIX,
            std::env::var("PATH").unwrap_or_default()
        );

        debug!("Running {} {}", npx.display(), args.join(" "));

        let child = tokio::process::Command::new(&npx)
            .args(args)
            .env("PATH", path_env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            // The child is killed when the cancelled future drops it
            Err(_) => return Err(ReportError::Timeout(self.timeout.as_secs())),
        };

        Ok(ReportOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

impl ReportRunner for CcusageRunner {
    async fn run_report(&self, kind: ReportKind) -> Result<ReportOutput, ReportError> {
        let mut args = vec![self.package.as_str()];
        args.extend_from_slice(kind.args());
        self.run_npx(&args).await
    }

    async fn self_update(&self) -> Result<String, ReportError> {
        let output = self
            .run_npx(&["--yes", self.package.as_str(), "--version"])
            .await?;
        output.into_stdout().map(|s| s.trim().to_string())
    }
}

/// Ask the shell where `npx` lives
fn which_npx() -> Option<PathBuf> {
    let output = Command::new("which").arg("npx").output().ok()?;
    if !output.status.success() {
        return None;
    }
    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!path.is_empty()).then(|| PathBuf::from(path))
}

/// Well-known install locations, including per-version node managers
pub(crate) fn candidate_paths() -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = NPX_LOCATIONS.iter().map(PathBuf::from).collect();

    if let Some(home) = dirs::home_dir() {
        for versions_dir in [home.join(".nvm/versions/node"), home.join("n")] {
            let Ok(entries) = std::fs::read_dir(&versions_dir) else {
                continue;
            };
            let mut found: Vec<PathBuf> = entries
                .flatten()
                .map(|entry| entry.path().join("bin/npx"))
                .collect();
            found.sort();
            paths.extend(found);
        }
    }

    paths
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_args() {
        assert_eq!(ReportKind::Blocks.args(), &["blocks", "--mode", "calculate"]);
        assert_eq!(
            ReportKind::Daily.args(),
            &["daily", "--mode", "calculate", "--order", "asc"]
        );
    }

    #[test]
    fn test_into_stdout_success() {
        let output = ReportOutput {
            exit_code: 0,
            stdout: "table".to_string(),
            stderr: String::new(),
        };
        assert_eq!(output.into_stdout().unwrap(), "table");
    }

    #[test]
    fn test_into_stdout_nonzero_exit() {
        let output = ReportOutput {
            exit_code: 1,
            stdout: "partial".to_string(),
            stderr: "boom\n".to_string(),
        };
        match output.into_stdout() {
            Err(ReportError::NonZeroExit { code, stderr }) => {
                assert_eq!(code, 1);
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_override_path_is_used() {
        let runner = CcusageRunner::new(
            "ccusage@latest".to_string(),
            Some(PathBuf::from("/custom/npx")),
            30,
        );
        assert_eq!(runner.resolve_npx(), Some(PathBuf::from("/custom/npx")));
    }

    #[cfg(unix)]
    #[test]
    fn test_candidate_paths_include_nvm_versions() {
        use std::os::unix::fs::PermissionsExt;

        let home = tempfile::tempdir().unwrap();
        let bin = home.path().join(".nvm/versions/node/v20.11.0/bin");
        std::fs::create_dir_all(&bin).unwrap();
        let npx = bin.join("npx");
        std::fs::write(&npx, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&npx, std::fs::Permissions::from_mode(0o755)).unwrap();

        temp_env::with_var("HOME", Some(home.path()), || {
            let paths = candidate_paths();
            assert!(paths.contains(&npx));
            assert!(is_executable(&npx));
        });
    }

    #[cfg(unix)]
    #[test]
    fn test_non_executable_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("npx");
        std::fs::write(&file, "").unwrap();
        assert!(!is_executable(&file));
        assert!(!is_executable(&dir.path().join("missing")));
    }
}
