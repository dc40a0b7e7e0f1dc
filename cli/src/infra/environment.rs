//! Infrastructure implementation of the `HostEnvironment` port.
//!
//! Privilege and user-environment queries go through the `CommandRunner`, so
//! the same adapter works with a mock runner in tests.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, HostEnvironment};
use crate::application::services::ensure_success;
use crate::domain::{powershell, search_path};

/// Timeout for the quick environment queries.
const QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Scratch directory for packages and logs: `%TEMP%\winrice`.
#[must_use]
pub fn default_temp_dir() -> PathBuf {
    std::env::temp_dir().join("winrice")
}

/// Windows host environment backed by `net session` and PowerShell.
pub struct WindowsEnvironment<'a, R: CommandRunner> {
    runner: &'a R,
    temp: PathBuf,
}

impl<'a, R: CommandRunner> WindowsEnvironment<'a, R> {
    #[must_use]
    pub fn new(runner: &'a R, temp: PathBuf) -> Self {
        Self { runner, temp }
    }

    async fn powershell(&self, script: &str) -> Result<String> {
        let mut args: Vec<&str> = powershell::BASE_ARGS.to_vec();
        args.extend(["-Command", script]);
        let out = self
            .runner
            .run_with_timeout("powershell.exe", &args, QUERY_TIMEOUT)
            .await
            .context("running powershell")?;
        ensure_success(&out, "powershell", &[])?;
        Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
    }
}

impl<R: CommandRunner> HostEnvironment for WindowsEnvironment<'_, R> {
    async fn is_elevated(&self) -> bool {
        // `net session` only succeeds for an elevated administrator.
        match self
            .runner
            .run_with_timeout("net", &["session"], QUERY_TIMEOUT)
            .await
        {
            Ok(out) => out.status.success(),
            Err(e) => {
                tracing::warn!("elevation check failed: {e:#}");
                false
            }
        }
    }

    async fn persist_user_path(&self, dir: &Path) -> Result<()> {
        let current = self
            .powershell(&powershell::read_user_path_script())
            .await
            .context("reading user Path")?;
        let Some(updated) = search_path::append_entry(&current, &dir.to_string_lossy()) else {
            return Ok(());
        };
        self.powershell(&powershell::write_user_path_script(&updated))
            .await
            .context("writing user Path")?;
        tracing::info!(dir = %dir.display(), "added to user Path");
        Ok(())
    }

    fn temp_dir(&self) -> PathBuf {
        self.temp.clone()
    }
}
