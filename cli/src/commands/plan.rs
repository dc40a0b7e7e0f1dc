//! `winrice plan`: evaluate every check without changing anything.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::ports::Host;
use crate::application::services::pipeline;
use crate::domain::plan::{PlanOptions, build_plan};
use crate::infra::environment::{WindowsEnvironment, default_temp_dir};
use crate::infra::fs::LocalFs;
use crate::infra::network::UreqDownloader;

/// Upper bound for a single check probe.
const CHECK_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(60);

/// Entry point for `winrice plan`.
///
/// # Errors
///
/// Returns an error if the config is invalid or rendering fails.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let config = app.load_config()?;
    let runner = app.command_runner(CHECK_TIMEOUT);
    let env = WindowsEnvironment::new(&runner, default_temp_dir());
    let host = Host {
        runner: &runner,
        fs: &LocalFs,
        net: &UreqDownloader,
        env: &env,
    };
    let steps = build_plan(&config, PlanOptions::default());
    let plan = pipeline::inspect_plan(host, &config, &steps).await;
    app.renderer().render_plan(&plan)?;
    Ok(ExitCode::SUCCESS)
}
