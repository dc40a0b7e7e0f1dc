//! Application service: the sequential provisioning runner.
//!
//! Executes a declarative plan: for every step, run its presence check, run
//! its action only when the check says the work is missing, apply the effects
//! the action returns, and classify failures by the step's severity.
//! All I/O is routed through the injected `Host` ports.

use anyhow::{Context, Result};
use chrono::Utc;

use crate::application::ports::{
    CommandRunner, Downloader, FileHasher, Host, HostEnvironment, HostFs, ProgressReporter,
};
use crate::application::services::{desktop_app, launch, prerequisites, theme};
use crate::domain::{
    Action, Effect, PipelineReport, PlanEntry, PlanReport, Presence, ProvisionConfig,
    ProvisionError, Severity, Step, StepStatus,
};

/// Run every step of `steps` in order.
///
/// # Errors
///
/// Returns `ProvisionError::NotElevated` before any step when the process is
/// not elevated, and stops at the first failing fatal step.
pub async fn run_pipeline<R, F, D, E>(
    host: Host<'_, R, F, D, E>,
    cfg: &ProvisionConfig,
    steps: &[Step],
    reporter: &impl ProgressReporter,
) -> Result<PipelineReport>
where
    R: CommandRunner,
    F: HostFs + FileHasher,
    D: Downloader,
    E: HostEnvironment,
{
    if !host.env.is_elevated().await {
        return Err(ProvisionError::NotElevated.into());
    }
    let temp = host.env.temp_dir();
    host.fs
        .create_dir_all(&temp)
        .with_context(|| format!("creating scratch directory {}", temp.display()))?;

    let mut report = PipelineReport::new(Utc::now());
    for step in steps {
        match check(host, cfg, step).await {
            Presence::Present => {
                tracing::info!(step = %step.name, "already present");
                reporter.success(&format!("{} already present", step.name));
                report.record(&step.name, step.severity, StepStatus::Present, None);
                continue;
            }
            Presence::Unknown(reason) => {
                tracing::warn!(step = %step.name, "check inconclusive: {reason}");
                reporter.warn(&format!("{}: {reason}", step.name));
                report.record(&step.name, step.severity, StepStatus::Warned, Some(reason));
                continue;
            }
            Presence::Missing | Presence::Always => {}
        }

        reporter.step(&format!("{}...", step.name));
        match apply(host, cfg, step, reporter).await {
            Ok(effects) => {
                apply_effects(host, &effects, reporter).await;
                tracing::info!(step = %step.name, "applied");
                reporter.success(&format!("{} done", step.name));
                report.record(&step.name, step.severity, StepStatus::Applied, None);
            }
            Err(err) => {
                let reason = format!("{err:#}");
                match step.severity {
                    Severity::Soft => {
                        tracing::warn!(step = %step.name, "failed: {reason}");
                        reporter.warn(&format!("{} failed: {reason}", step.name));
                        report.record(&step.name, step.severity, StepStatus::Warned, Some(reason));
                    }
                    Severity::Fatal => {
                        tracing::error!(step = %step.name, "failed: {reason}");
                        if err.is::<ProvisionError>() {
                            return Err(err);
                        }
                        return Err(ProvisionError::StepFailed {
                            step: step.name.clone(),
                            reason,
                        }
                        .into());
                    }
                }
            }
        }
    }
    Ok(report)
}

/// Evaluate every step's check without running any action.
pub async fn inspect_plan<R, F, D, E>(
    host: Host<'_, R, F, D, E>,
    cfg: &ProvisionConfig,
    steps: &[Step],
) -> PlanReport
where
    R: CommandRunner,
    F: HostFs + FileHasher,
    D: Downloader,
    E: HostEnvironment,
{
    let mut report = PlanReport::default();
    for step in steps {
        let presence = check(host, cfg, step).await;
        report.steps.push(PlanEntry {
            name: step.name.clone(),
            severity: step.severity,
            presence,
        });
    }
    report
}

async fn check<R, F, D, E>(host: Host<'_, R, F, D, E>, cfg: &ProvisionConfig, step: &Step) -> Presence
where
    R: CommandRunner,
    F: HostFs,
{
    match step.action {
        Action::PackageManager => {
            prerequisites::check_marker(host.fs, &cfg.package_manager.executable)
        }
        Action::Git => prerequisites::check_marker(host.fs, &cfg.git.executable),
        Action::Toolchain => prerequisites::check_marker(host.fs, &cfg.toolchain.cargo),
        Action::ToolchainDefault | Action::Launch => Presence::Always,
        Action::BuildTools => prerequisites::check_build_tools(host.runner, host.fs, cfg).await,
        Action::Browser => prerequisites::check_browser(host.runner, cfg).await,
        Action::AppDirectories => desktop_app::check_directories(host.fs, cfg),
        Action::DesktopApp(role) => desktop_app::check_installed(host.fs, cfg, role),
        Action::ThemeRepository => theme::check_repository(host.fs, cfg),
        Action::ThemeSettings => theme::check_settings(host.fs, cfg),
    }
}

async fn apply<R, F, D, E>(
    host: Host<'_, R, F, D, E>,
    cfg: &ProvisionConfig,
    step: &Step,
    reporter: &impl ProgressReporter,
) -> Result<Vec<Effect>>
where
    R: CommandRunner,
    F: HostFs + FileHasher,
    D: Downloader,
    E: HostEnvironment,
{
    match step.action {
        Action::PackageManager => {
            prerequisites::bootstrap_package_manager(host.runner, host.fs, cfg).await
        }
        Action::Git => prerequisites::install_git(host.runner, host.fs, cfg).await,
        Action::Toolchain => {
            prerequisites::install_toolchain(host.runner, host.fs, host.net, host.env, cfg).await
        }
        Action::ToolchainDefault => prerequisites::set_default_toolchain(host.runner, cfg).await,
        Action::BuildTools => prerequisites::install_build_tools(host.runner, cfg).await,
        Action::Browser => prerequisites::install_browser(host.runner, cfg).await,
        Action::AppDirectories => desktop_app::create_directories(host.fs, cfg),
        Action::DesktopApp(role) => desktop_app::install(host, cfg, role, reporter).await,
        Action::ThemeRepository => theme::clone_repository(host.runner, host.fs, cfg).await,
        Action::ThemeSettings => theme::relocate_settings(host.fs, cfg),
        Action::Launch => launch::launch_primary(host.runner, host.fs, cfg),
    }
}

/// Apply step effects. Persisting to the user environment is best-effort.
async fn apply_effects<R, F, D, E>(
    host: Host<'_, R, F, D, E>,
    effects: &[Effect],
    reporter: &impl ProgressReporter,
) where
    R: CommandRunner,
    E: HostEnvironment,
{
    for effect in effects {
        match effect {
            Effect::AppendSearchPath(dir) => {
                host.runner.add_search_path(dir);
                if let Err(e) = host.env.persist_user_path(dir).await {
                    tracing::warn!(dir = %dir.display(), "could not persist user Path: {e:#}");
                    reporter.warn(&format!(
                        "could not add {} to the user Path: {e:#}",
                        dir.display()
                    ));
                }
            }
        }
    }
}
