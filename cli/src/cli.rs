//! CLI argument parsing with clap derive

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags};
use crate::commands;

/// Provision a tiling Windows desktop: toolchain, window manager, status bar, theme
#[derive(Parser)]
#[command(name = "winrice", version, propagate_version = true)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Config file (default: ~/.winrice/config.yaml)
    #[arg(long, global = true, env = "WINRICE_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Defaults to `run` when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Provision the machine and launch the window manager
    Run(commands::run::RunArgs),

    /// Show which steps are present and which would run
    Plan,

    /// Inspect configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            config,
            command,
        } = self;
        let app = AppContext::new(AppFlags {
            no_color,
            quiet,
            json,
            config,
        })?;
        match command.unwrap_or_default() {
            Command::Run(args) => commands::run::run(&app, &args).await,
            Command::Plan => commands::plan::run(&app).await,
            Command::Config(cmd) => commands::config::run(&app, &cmd),
            Command::Version => commands::version::run(&app),
        }
    }
}

impl Default for Command {
    fn default() -> Self {
        Self::Run(commands::run::RunArgs::default())
    }
}
