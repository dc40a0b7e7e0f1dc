//! Application service: start the primary application.

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, HostFs};
use crate::domain::{Effect, ProvisionConfig};

/// Launch the primary executable without waiting for it.
///
/// # Errors
///
/// Returns an error if the executable is not on disk or cannot be spawned.
pub fn launch_primary(
    runner: &impl CommandRunner,
    fs: &impl HostFs,
    cfg: &ProvisionConfig,
) -> Result<Vec<Effect>> {
    let app = &cfg.apps.primary;
    let exe = app.executable_path(&cfg.apps.install_root);
    anyhow::ensure!(
        fs.exists(&exe),
        "{} is not installed ({} missing); not launching",
        app.name,
        exe.display()
    );
    runner
        .spawn_detached(&exe.to_string_lossy(), &[])
        .with_context(|| format!("launching {}", app.name))?;
    tracing::info!(app = %app.name, "launched");
    Ok(Vec::new())
}
