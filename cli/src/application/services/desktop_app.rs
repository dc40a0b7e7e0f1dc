//! Application service: desktop application install with source fallback.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::{
    CommandRunner, Downloader, FileHasher, Host, HostEnvironment, HostFs, ProgressReporter,
};
use crate::application::services::{REBOOT_REQUIRED_CODES, ensure_success, remove_scratch};
use crate::domain::digest::digests_match;
use crate::domain::{AppConfig, AppRole, Effect, Presence, ProvisionConfig, SourceBuildConfig};

// ── Directories ───────────────────────────────────────────────────────────────

pub fn check_directories(fs: &impl HostFs, cfg: &ProvisionConfig) -> Presence {
    let root = &cfg.apps.install_root;
    let all_present = [&cfg.apps.primary, &cfg.apps.secondary]
        .iter()
        .all(|app| fs.exists(&app.install_dir(root)));
    if all_present {
        Presence::Present
    } else {
        Presence::Missing
    }
}

/// Create both application directories under the shared root.
///
/// # Errors
///
/// Returns an error if a directory cannot be created.
pub fn create_directories(fs: &impl HostFs, cfg: &ProvisionConfig) -> Result<Vec<Effect>> {
    let root = &cfg.apps.install_root;
    for app in [&cfg.apps.primary, &cfg.apps.secondary] {
        fs.create_dir_all(&app.install_dir(root))?;
    }
    Ok(Vec::new())
}

// ── Install ───────────────────────────────────────────────────────────────────

pub fn check_installed(fs: &impl HostFs, cfg: &ProvisionConfig, role: AppRole) -> Presence {
    let exe = cfg.apps.get(role).executable_path(&cfg.apps.install_root);
    if fs.exists(&exe) {
        Presence::Present
    } else {
        Presence::Missing
    }
}

/// Install one desktop application from its MSI package.
///
/// When the package route fails and the application has a source build
/// configured, the failed package is removed and the application is built
/// once from source instead.
///
/// # Errors
///
/// Returns the package error when there is no fallback, or the fallback error.
pub async fn install<R, F, D, E>(
    host: Host<'_, R, F, D, E>,
    cfg: &ProvisionConfig,
    role: AppRole,
    reporter: &impl ProgressReporter,
) -> Result<Vec<Effect>>
where
    R: CommandRunner,
    F: HostFs + FileHasher,
    D: Downloader,
    E: HostEnvironment,
{
    let app = cfg.apps.get(role);
    let root = &cfg.apps.install_root;
    let dir = app.install_dir(root);
    let exe = app.executable_path(root);

    if let Err(err) = install_package(host, app, &dir, &exe).await {
        let Some(source) = &app.source else {
            return Err(err);
        };
        tracing::warn!(app = %app.name, "package install failed: {err:#}");
        reporter.warn(&format!(
            "{} package install failed ({err:#}); building from source",
            app.name
        ));
        build_from_source(host, cfg, app, source, &dir, &exe)
            .await
            .with_context(|| format!("building {} from source", app.name))?;
    }
    Ok(vec![Effect::AppendSearchPath(dir)])
}

/// Download, verify, and silently install the MSI. The package is deleted
/// whether or not the install succeeded.
async fn install_package<R, F, D, E>(
    host: Host<'_, R, F, D, E>,
    app: &AppConfig,
    dir: &Path,
    exe: &Path,
) -> Result<()>
where
    R: CommandRunner,
    F: HostFs + FileHasher,
    D: Downloader,
    E: HostEnvironment,
{
    let temp = host.env.temp_dir();
    let package = temp.join(app.package_file_name());
    let bytes = host
        .net
        .download(&app.msi_url, &package)
        .await
        .with_context(|| format!("downloading {}", app.msi_url))?;
    tracing::info!(app = %app.name, bytes, "downloaded installer package");

    let result = run_msi(host, app, &package, dir, &temp).await;
    remove_scratch(host.fs, &package);
    result?;

    anyhow::ensure!(
        host.fs.exists(exe),
        "installer finished but {} is missing",
        exe.display()
    );
    Ok(())
}

async fn run_msi<R, F, D, E>(
    host: Host<'_, R, F, D, E>,
    app: &AppConfig,
    package: &Path,
    dir: &Path,
    temp: &Path,
) -> Result<()>
where
    R: CommandRunner,
    F: HostFs + FileHasher,
{
    if let Some(expected) = &app.msi_sha256 {
        let actual = host.fs.sha256_file(package)?;
        anyhow::ensure!(
            digests_match(expected, &actual),
            "checksum mismatch for {}: expected {expected}, got {actual}",
            app.package_file_name()
        );
    }

    let package_arg = package.to_string_lossy().into_owned();
    let target = format!("{}={}", app.install_dir_property, dir.display());
    let log = temp.join(format!("{}-install.log", app.name));
    let log_arg = log.to_string_lossy().into_owned();
    let out = host
        .runner
        .run(
            "msiexec",
            &["/i", &package_arg, "/qn", "/norestart", &target, "/l*v", &log_arg],
        )
        .await
        .context("running msiexec")?;
    ensure_success(
        &out,
        &format!("msiexec (log: {})", log.display()),
        REBOOT_REQUIRED_CODES,
    )
}

/// Clone the source repository, build it in release mode, and copy the
/// binary into the install directory.
async fn build_from_source<R, F, D, E>(
    host: Host<'_, R, F, D, E>,
    cfg: &ProvisionConfig,
    app: &AppConfig,
    source: &SourceBuildConfig,
    dir: &Path,
    exe: &Path,
) -> Result<()>
where
    R: CommandRunner,
    F: HostFs,
    E: HostEnvironment,
{
    let checkout = host.env.temp_dir().join(format!("{}-src", app.name));
    if host.fs.exists(&checkout) {
        host.fs.remove_dir_all(&checkout)?;
    }

    let git = cfg.git.executable.to_string_lossy().into_owned();
    let checkout_arg = checkout.to_string_lossy().into_owned();
    let out = host
        .runner
        .run(
            &git,
            &["clone", "--depth", "1", &source.repository, &checkout_arg],
        )
        .await
        .context("running git clone")?;
    ensure_success(&out, "git clone", &[])?;

    let cargo = cfg.toolchain.cargo.to_string_lossy().into_owned();
    let manifest = checkout.join("Cargo.toml").to_string_lossy().into_owned();
    let mut args: Vec<&str> = vec!["build", "--release", "--manifest-path", &manifest];
    if let Some(package) = &source.package {
        args.extend(["--package", package.as_str()]);
    }
    let out = host
        .runner
        .run(&cargo, &args)
        .await
        .context("running cargo build")?;
    ensure_success(&out, "cargo build --release", &[])?;

    let built = checkout.join("target").join("release").join(&source.binary);
    anyhow::ensure!(
        host.fs.exists(&built),
        "build finished but {} is missing",
        built.display()
    );
    host.fs.create_dir_all(dir)?;
    host.fs.copy_file(&built, exe)?;
    Ok(())
}
