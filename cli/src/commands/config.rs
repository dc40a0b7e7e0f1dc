//! `winrice config`: show the effective configuration.

use std::process::ExitCode;

use anyhow::Result;
use clap::Subcommand;

use crate::app::AppContext;
use crate::application::ports::ConfigStore;

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration (defaults merged with the file)
    Show,
    /// Print the config file location
    Path,
}

/// Run the config command.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or rendered.
pub fn run(app: &AppContext, cmd: &ConfigCommand) -> Result<ExitCode> {
    match cmd {
        ConfigCommand::Show => {
            let config = app.load_config()?;
            app.renderer()
                .render_config(&config, app.config_store.path())?;
        }
        ConfigCommand::Path => app.renderer().render_path(app.config_store.path())?,
    }
    Ok(ExitCode::SUCCESS)
}
