//! Human-readable terminal renderer.

use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::OwoColorize as _;

use crate::domain::config::ProvisionConfig;
use crate::domain::report::{PipelineReport, PlanReport, Presence, StepStatus};
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the CLI version information.
    pub fn render_version(&self, version: &str) {
        if self.ctx.quiet {
            return;
        }
        println!("winrice {version}");
    }

    /// Render the end-of-run summary.
    ///
    /// Steps that ended in a warning are listed again so they are not lost in
    /// the scrollback.
    pub fn render_report(&self, report: &PipelineReport) {
        if self.ctx.quiet {
            return;
        }
        println!();
        let warned: Vec<_> = report
            .steps
            .iter()
            .filter(|s| s.status == StepStatus::Warned)
            .collect();
        if !warned.is_empty() {
            self.ctx.header("Warnings:");
            for step in warned {
                let detail = step.detail.as_deref().unwrap_or("no detail");
                self.ctx.warn(&format!("{}: {detail}", step.name));
            }
            println!();
        }
        self.ctx
            .success(&format!("Provisioning complete ({})", report.summary()));
    }

    /// Render the read-only plan as a two-column table.
    pub fn render_plan(&self, plan: &PlanReport) {
        if self.ctx.quiet {
            return;
        }
        let width = plan.steps.iter().map(|e| e.name.len()).max().unwrap_or(0);
        for entry in &plan.steps {
            let label = format!("{:<width$}", entry.name);
            let state = match &entry.presence {
                Presence::Present => format!("{}", "present".style(self.ctx.styles.success)),
                Presence::Missing => format!("{}", "will install".style(self.ctx.styles.info)),
                Presence::Always => format!("{}", "will run".style(self.ctx.styles.info)),
                Presence::Unknown(reason) => format!(
                    "{} {}",
                    "unknown".style(self.ctx.styles.warning),
                    format!("({reason})").style(self.ctx.styles.dim)
                ),
            };
            println!("  {}  {state}", label.style(self.ctx.styles.dim));
        }
        println!();
        self.ctx
            .info(&format!("{} of {} steps would run", plan.pending(), plan.steps.len()));
    }

    /// Render the effective configuration as YAML, headed by its source file.
    ///
    /// # Errors
    ///
    /// Returns an error if YAML serialization fails.
    pub fn render_config(&self, config: &ProvisionConfig, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(config).context("YAML serialization failed")?;
        if self.ctx.quiet {
            return Ok(());
        }
        let source = if path.exists() {
            path.display().to_string()
        } else {
            format!("{} (not found, using defaults)", path.display())
        };
        self.ctx.kv("Config:", &source);
        println!();
        print!("{yaml}");
        Ok(())
    }
}
