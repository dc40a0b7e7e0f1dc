//! `winrice run`: provision the machine end to end.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::Host;
use crate::application::services::pipeline;
use crate::domain::plan::{PlanOptions, build_plan};
use crate::infra::command_runner::DEFAULT_INSTALL_TIMEOUT;
use crate::infra::environment::{WindowsEnvironment, default_temp_dir};
use crate::infra::fs::LocalFs;
use crate::infra::network::UreqDownloader;
use crate::output::reporter::TerminalReporter;

/// Arguments for the run command.
#[derive(Args, Default)]
pub struct RunArgs {
    /// Provision only; do not start the window manager afterwards
    #[arg(long)]
    pub no_launch: bool,
}

/// Entry point for `winrice run`.
///
/// # Errors
///
/// Returns an error if the config is invalid, the process is not elevated,
/// or a fatal step fails.
pub async fn run(app: &AppContext, args: &RunArgs) -> Result<ExitCode> {
    let config = app.load_config()?;
    app.init_logging();

    let runner = app.command_runner(DEFAULT_INSTALL_TIMEOUT);
    let env = WindowsEnvironment::new(&runner, default_temp_dir());
    let host = Host {
        runner: &runner,
        fs: &LocalFs,
        net: &UreqDownloader,
        env: &env,
    };
    let steps = build_plan(
        &config,
        PlanOptions {
            launch: !args.no_launch,
        },
    );

    app.output.header("Provisioning");
    let reporter = TerminalReporter::new(&app.output);
    let result = pipeline::run_pipeline(host, &config, &steps, &reporter).await;
    drop(reporter);

    let report = result.inspect_err(|e| tracing::error!("provisioning aborted: {e:#}"))?;
    tracing::info!(summary = %report.summary(), "provisioning complete");
    app.renderer().render_report(&report)?;
    Ok(ExitCode::SUCCESS)
}
