//! Application service: themed configuration provisioning.

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, HostFs};
use crate::application::services::ensure_success;
use crate::domain::{Effect, Presence, ProvisionConfig};

pub fn check_repository(fs: &impl HostFs, cfg: &ProvisionConfig) -> Presence {
    if fs.exists(&cfg.theme.directory) {
        Presence::Present
    } else {
        Presence::Missing
    }
}

/// Clone the theme repository into its fixed directory.
///
/// # Errors
///
/// Returns an error if the clone fails.
pub async fn clone_repository(
    runner: &impl CommandRunner,
    fs: &impl HostFs,
    cfg: &ProvisionConfig,
) -> Result<Vec<Effect>> {
    let dir = &cfg.theme.directory;
    if let Some(parent) = dir.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs.create_dir_all(parent)?;
    }
    let git = cfg.git.executable.to_string_lossy().into_owned();
    let dir_arg = dir.to_string_lossy().into_owned();
    let out = runner
        .run(
            &git,
            &["clone", "--depth", "1", &cfg.theme.repository, &dir_arg],
        )
        .await
        .context("running git clone")?;
    ensure_success(&out, "git clone", &[])?;
    Ok(Vec::new())
}

/// The settings document is in place once it has left the clone and sits
/// at its destination.
pub fn check_settings(fs: &impl HostFs, cfg: &ProvisionConfig) -> Presence {
    let source = cfg.theme.directory.join(&cfg.theme.settings_file);
    if !fs.exists(&source) && fs.exists(&cfg.theme.destination) {
        Presence::Present
    } else {
        Presence::Missing
    }
}

/// Move the settings document into the application's config path,
/// overwriting whatever is there.
///
/// # Errors
///
/// Returns an error if the clone has no settings document or the move fails.
pub fn relocate_settings(fs: &impl HostFs, cfg: &ProvisionConfig) -> Result<Vec<Effect>> {
    let source = cfg.theme.directory.join(&cfg.theme.settings_file);
    anyhow::ensure!(
        fs.exists(&source),
        "{} not found in theme repository",
        cfg.theme.settings_file
    );
    let dest = &cfg.theme.destination;
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs.create_dir_all(parent)?;
    }
    fs.move_file(&source, dest)?;
    Ok(Vec::new())
}
