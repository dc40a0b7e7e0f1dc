//! Infrastructure implementation of the `CommandRunner` port.
//!
//! `TokioCommandRunner` is the production implementation that uses tokio
//! for async process execution with guaranteed timeout and kill on all platforms.
//! It also owns the search-path overlay: directories added through
//! `add_search_path` are prepended to `PATH` for every child it spawns.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;

use crate::application::ports::CommandRunner;

/// Default timeout for installers, package-manager calls, and builds.
pub const DEFAULT_INSTALL_TIMEOUT: Duration = Duration::from_secs(30 * 60);

#[cfg(windows)]
const DETACHED_PROCESS: u32 = 0x0000_0008;

/// Production `CommandRunner`: uses tokio for async process execution
/// with guaranteed timeout and kill on all platforms.
///
/// On Windows, `tokio::time::timeout` around `.output().await` does NOT kill
/// the child process when the timeout fires: the future is dropped but the
/// OS process keeps running. This implementation uses `tokio::select!` with
/// explicit `child.kill()` to guarantee the process is terminated.
pub struct TokioCommandRunner {
    timeout: Duration,
    overlay: Mutex<Vec<PathBuf>>,
}

impl TokioCommandRunner {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            overlay: Mutex::new(Vec::new()),
        }
    }

    /// Directories added so far, most recent first.
    #[must_use]
    pub fn search_path_overlay(&self) -> Vec<PathBuf> {
        self.overlay
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// `PATH` value for children: overlay first, then the inherited entries.
    /// `None` while the overlay is empty.
    fn child_path(&self) -> Option<OsString> {
        let overlay = self.search_path_overlay();
        if overlay.is_empty() {
            return None;
        }
        let inherited = std::env::var_os("PATH").unwrap_or_default();
        let merged = overlay
            .into_iter()
            .chain(std::env::split_paths(&inherited));
        match std::env::join_paths(merged) {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!("search path overlay not applied: {e}");
                None
            }
        }
    }

    fn command(&self, program: &str, args: &[&str]) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(program);
        cmd.args(args);
        if let Some(path) = self.child_path() {
            cmd.env("PATH", path);
        }
        cmd
    }
}

impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.run_with_timeout(program, args, self.timeout).await
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output> {
        tracing::debug!(program, ?args, "spawning");
        let mut child = self
            .command(program, args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;

        let mut stdout_handle = child.stdout.take();
        let mut stderr_handle = child.stderr.take();

        tokio::select! {
            result = async {
                let (status, stdout, stderr) = tokio::join!(
                    child.wait(),
                    async {
                        let mut buf = Vec::new();
                        if let Some(ref mut h) = stdout_handle {
                            let _ = h.read_to_end(&mut buf).await;
                        }
                        buf
                    },
                    async {
                        let mut buf = Vec::new();
                        if let Some(ref mut h) = stderr_handle {
                            let _ = h.read_to_end(&mut buf).await;
                        }
                        buf
                    },
                );
                let status = status.with_context(|| format!("waiting for {program}"))?;
                tracing::debug!(program, code = ?status.code(), "exited");
                Ok(Output { status, stdout, stderr })
            } => result,
            () = tokio::time::sleep(timeout) => {
                let _ = child.kill().await;
                anyhow::bail!("{program} timed out after {}s", timeout.as_secs())
            }
        }
    }

    fn spawn_detached(&self, program: &str, args: &[&str]) -> Result<()> {
        let mut cmd = self.command(program, args);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        #[cfg(windows)]
        cmd.creation_flags(DETACHED_PROCESS);
        let child = cmd
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;
        tracing::debug!(program, pid = ?child.id(), "spawned detached");
        Ok(())
    }

    fn add_search_path(&self, dir: &Path) {
        if dir.as_os_str().is_empty() {
            return;
        }
        let mut overlay = self.overlay.lock().unwrap_or_else(PoisonError::into_inner);
        if !overlay.iter().any(|p| p == dir) {
            overlay.insert(0, dir.to_path_buf());
        }
    }
}
