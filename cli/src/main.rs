//! winrice - provision a tiling Windows desktop

use std::process::ExitCode;

use clap::Parser;

use winrice_cli::cli::Cli;
use winrice_cli::domain::{ConfigError, ProvisionError};
use winrice_cli::output::OutputContext;
use winrice_cli::output::json::format_error;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let json = cli.json;
    let no_color = cli.no_color;
    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            if json {
                let message = format!("{e:#}");
                match format_error(&message, error_code(&e)) {
                    Ok(out) => println!("{out}"),
                    Err(_) => eprintln!("Error: {message}"),
                }
            } else {
                OutputContext::new(no_color, false).error(&format!("Error: {e:#}"));
            }
            ExitCode::FAILURE
        }
    }
}

fn error_code(e: &anyhow::Error) -> &'static str {
    if let Some(p) = e.downcast_ref::<ProvisionError>() {
        return p.code();
    }
    if e.chain()
        .any(|c| c.is::<ConfigError>() || c.is::<serde_yaml::Error>())
    {
        return "INVALID_CONFIG";
    }
    "ERROR"
}
