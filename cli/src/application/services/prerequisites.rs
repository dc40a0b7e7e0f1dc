//! Application service: host prerequisites installed before the desktop apps.
//!
//! Package manager, Git, Rust toolchain, MSVC build tools, and the browser.
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, Downloader, HostEnvironment, HostFs};
use crate::application::services::{REBOOT_REQUIRED_CODES, ensure_success, parent_on_path, remove_scratch};
use crate::domain::powershell;
use crate::domain::{Effect, Presence, ProvisionConfig, ProvisionError};

// ── Checks ────────────────────────────────────────────────────────────────────

/// Presence check backed by an installed-tool marker.
pub fn check_marker(fs: &impl HostFs, marker: &Path) -> Presence {
    if fs.exists(marker) {
        Presence::Present
    } else {
        Presence::Missing
    }
}

/// Ask `vswhere` whether the required build-tools component is installed.
///
/// A missing `vswhere` makes the answer unknown rather than "missing".
pub async fn check_build_tools(
    runner: &impl CommandRunner,
    fs: &impl HostFs,
    cfg: &ProvisionConfig,
) -> Presence {
    let vswhere = &cfg.build_tools.vswhere;
    if !fs.exists(vswhere) {
        return Presence::Unknown(format!(
            "{} not found; cannot detect build tools",
            vswhere.display()
        ));
    }
    let program = vswhere.to_string_lossy().into_owned();
    let args = [
        "-products",
        "*",
        "-requires",
        cfg.build_tools.component.as_str(),
        "-property",
        "installationPath",
    ];
    match runner.run(&program, &args).await {
        Ok(out) if out.status.success() && !String::from_utf8_lossy(&out.stdout).trim().is_empty() => {
            Presence::Present
        }
        Ok(_) => Presence::Missing,
        Err(e) => Presence::Unknown(format!("vswhere failed: {e:#}")),
    }
}

/// Look the browser command up on the search path with `where.exe`.
pub async fn check_browser(runner: &impl CommandRunner, cfg: &ProvisionConfig) -> Presence {
    match runner.run("where.exe", &[cfg.browser.command.as_str()]).await {
        Ok(out) if out.status.success() => Presence::Present,
        Ok(_) => Presence::Missing,
        Err(e) => Presence::Unknown(format!("where.exe failed: {e:#}")),
    }
}

// ── Actions ───────────────────────────────────────────────────────────────────

/// Run the remote bootstrap script, then require the package-manager marker.
///
/// The script's own exit status is only logged: the marker decides.
///
/// # Errors
///
/// Returns `ProvisionError::PackageManagerMissing` when the marker is still absent.
pub async fn bootstrap_package_manager(
    runner: &impl CommandRunner,
    fs: &impl HostFs,
    cfg: &ProvisionConfig,
) -> Result<Vec<Effect>> {
    let script = powershell::bootstrap_script(&cfg.package_manager.bootstrap_url);
    let mut args: Vec<&str> = powershell::BASE_ARGS.to_vec();
    args.extend(["-Command", script.as_str()]);

    match runner.run("powershell.exe", &args).await {
        Ok(out) if !out.status.success() => {
            tracing::warn!(
                code = ?out.status.code(),
                stderr = %String::from_utf8_lossy(&out.stderr),
                "package manager bootstrap script reported failure"
            );
        }
        Ok(_) => {}
        Err(e) => tracing::warn!("package manager bootstrap could not run: {e:#}"),
    }

    let choco = &cfg.package_manager.executable;
    if !fs.exists(choco) {
        return Err(ProvisionError::PackageManagerMissing(choco.clone()).into());
    }
    Ok(parent_on_path(choco))
}

/// `choco install <package> -y --no-progress [extra...]`.
///
/// # Errors
///
/// Returns an error if the package manager cannot be run or reports failure.
pub async fn choco_install(
    runner: &impl CommandRunner,
    cfg: &ProvisionConfig,
    package: &str,
    extra: &[&str],
) -> Result<()> {
    let choco = cfg.package_manager.executable.to_string_lossy().into_owned();
    let mut args: Vec<&str> = vec!["install", package, "-y", "--no-progress"];
    args.extend_from_slice(extra);
    let what = format!("choco install {package}");
    let out = runner.run(&choco, &args).await.with_context(|| what.clone())?;
    ensure_success(&out, &what, REBOOT_REQUIRED_CODES)
}

/// Install Git through the package manager.
///
/// # Errors
///
/// Returns an error if the install fails or `git.exe` is still missing.
pub async fn install_git(
    runner: &impl CommandRunner,
    fs: &impl HostFs,
    cfg: &ProvisionConfig,
) -> Result<Vec<Effect>> {
    choco_install(runner, cfg, &cfg.git.package, &[]).await?;
    let git = &cfg.git.executable;
    anyhow::ensure!(fs.exists(git), "{} missing after install", git.display());
    Ok(parent_on_path(git))
}

/// Download `rustup-init.exe`, run it silently, and delete it.
///
/// # Errors
///
/// Returns an error if the download or installer fails, or `cargo.exe` is
/// still missing afterwards.
pub async fn install_toolchain(
    runner: &impl CommandRunner,
    fs: &impl HostFs,
    net: &impl Downloader,
    env: &impl HostEnvironment,
    cfg: &ProvisionConfig,
) -> Result<Vec<Effect>> {
    let installer = env.temp_dir().join("rustup-init.exe");
    net.download(&cfg.toolchain.installer_url, &installer)
        .await
        .with_context(|| format!("downloading {}", cfg.toolchain.installer_url))?;

    let program = installer.to_string_lossy().into_owned();
    let result = match runner.run(&program, &["-y"]).await {
        Ok(out) => ensure_success(&out, "rustup-init", &[]),
        Err(e) => Err(e.context("running rustup-init")),
    };
    remove_scratch(fs, &installer);
    result?;

    let cargo = &cfg.toolchain.cargo;
    anyhow::ensure!(fs.exists(cargo), "{} missing after install", cargo.display());
    Ok(parent_on_path(cargo))
}

/// `rustup default <toolchain>`. Safe to repeat.
///
/// # Errors
///
/// Returns an error if `rustup` cannot be run or reports failure.
pub async fn set_default_toolchain(
    runner: &impl CommandRunner,
    cfg: &ProvisionConfig,
) -> Result<Vec<Effect>> {
    let rustup = cfg.toolchain.rustup.to_string_lossy().into_owned();
    let toolchain = cfg.toolchain.default_toolchain.as_str();
    let out = runner
        .run(&rustup, &["default", toolchain])
        .await
        .context("running rustup default")?;
    ensure_success(&out, &format!("rustup default {toolchain}"), &[])?;
    Ok(Vec::new())
}

/// Install the MSVC build tools with the configured workload flags.
///
/// # Errors
///
/// Returns an error if the package install fails.
pub async fn install_build_tools(
    runner: &impl CommandRunner,
    cfg: &ProvisionConfig,
) -> Result<Vec<Effect>> {
    let params = cfg.build_tools.package_parameters.as_str();
    choco_install(
        runner,
        cfg,
        &cfg.build_tools.package,
        &["--package-parameters", params],
    )
    .await?;
    Ok(Vec::new())
}

/// Install the browser package.
///
/// # Errors
///
/// Returns an error if the package install fails.
pub async fn install_browser(
    runner: &impl CommandRunner,
    cfg: &ProvisionConfig,
) -> Result<Vec<Effect>> {
    choco_install(runner, cfg, &cfg.browser.package, &[]).await?;
    Ok(Vec::new())
}
