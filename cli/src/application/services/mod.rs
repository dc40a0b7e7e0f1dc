//! Application services: use-case orchestration.
//!
//! Each service module implements one slice of the provisioning run by
//! composing domain logic with port trait calls. Services import only from
//! `crate::domain` and `crate::application::ports`, never from
//! `crate::infra`, `crate::commands`, or `crate::output`.

pub mod desktop_app;
pub mod launch;
pub mod pipeline;
pub mod prerequisites;
pub mod theme;

use std::path::Path;
use std::process::Output;

use anyhow::Result;

use crate::application::ports::HostFs;
use crate::domain::Effect;

/// Installer exit codes meaning "succeeded, reboot required".
pub const REBOOT_REQUIRED_CODES: &[i32] = &[1641, 3010];

/// Fail with the exit code and the tail of stderr when `output` is unsuccessful.
///
/// Exit codes in `also_ok` count as success.
///
/// # Errors
///
/// Returns an error describing `what` when the process failed.
pub fn ensure_success(output: &Output, what: &str, also_ok: &[i32]) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }
    let code = output.status.code();
    if code.is_some_and(|c| also_ok.contains(&c)) {
        return Ok(());
    }
    let code = code.map_or_else(|| "a signal".to_string(), |c| c.to_string());
    let stderr = String::from_utf8_lossy(&output.stderr);
    let mut tail: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .rev()
        .take(3)
        .collect();
    tail.reverse();
    if tail.is_empty() {
        anyhow::bail!("{what} exited with {code}");
    }
    anyhow::bail!("{what} exited with {code}: {}", tail.join(" | "))
}

/// Search-path effect for the directory containing `executable`.
pub(crate) fn parent_on_path(executable: &Path) -> Vec<Effect> {
    executable
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| vec![Effect::AppendSearchPath(p.to_path_buf())])
        .unwrap_or_default()
}

/// Delete a scratch file, logging instead of failing.
pub(crate) fn remove_scratch(fs: &impl HostFs, path: &Path) {
    if fs.exists(path) {
        if let Err(e) = fs.remove_file(path) {
            tracing::warn!(path = %path.display(), "could not remove scratch file: {e:#}");
        }
    }
}
