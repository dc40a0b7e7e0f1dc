//! Declarative provisioning plan.
//!
//! The plan is plain data: an ordered list of named steps, each with an
//! action and a severity. `application::services::pipeline` executes it.

use serde::Serialize;

use crate::domain::config::ProvisionConfig;

/// What happens when a step's action fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Abort the pipeline.
    Fatal,
    /// Warn and continue with the next step.
    Soft,
}

/// Which of the two desktop applications a step targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppRole {
    Primary,
    Secondary,
}

/// The action a step performs once its check says the work is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    PackageManager,
    Git,
    Toolchain,
    ToolchainDefault,
    BuildTools,
    Browser,
    AppDirectories,
    DesktopApp(AppRole),
    ThemeRepository,
    ThemeSettings,
    Launch,
}

/// One entry of the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub name: String,
    pub action: Action,
    pub severity: Severity,
}

impl Step {
    fn new(name: impl Into<String>, action: Action, severity: Severity) -> Self {
        Self {
            name: name.into(),
            action,
            severity,
        }
    }
}

/// Knobs that change which steps are part of the plan.
#[derive(Debug, Clone, Copy)]
pub struct PlanOptions {
    pub launch: bool,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self { launch: true }
    }
}

/// Build the ordered step list for `cfg`.
#[must_use]
pub fn build_plan(cfg: &ProvisionConfig, opts: PlanOptions) -> Vec<Step> {
    let mut steps = vec![
        Step::new("package-manager", Action::PackageManager, Severity::Fatal),
        Step::new("git", Action::Git, Severity::Soft),
        Step::new("rustup", Action::Toolchain, Severity::Soft),
        Step::new("rust-default", Action::ToolchainDefault, Severity::Soft),
        Step::new("build-tools", Action::BuildTools, Severity::Soft),
        Step::new("browser", Action::Browser, Severity::Soft),
        Step::new("app-directories", Action::AppDirectories, Severity::Soft),
        Step::new(
            cfg.apps.primary.name.as_str(),
            Action::DesktopApp(AppRole::Primary),
            Severity::Fatal,
        ),
        Step::new(
            cfg.apps.secondary.name.as_str(),
            Action::DesktopApp(AppRole::Secondary),
            Severity::Soft,
        ),
        Step::new("theme-repository", Action::ThemeRepository, Severity::Soft),
        Step::new("theme-settings", Action::ThemeSettings, Severity::Soft),
    ];
    if opts.launch {
        steps.push(Step::new("launch", Action::Launch, Severity::Soft));
    }
    steps
}
