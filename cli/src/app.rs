//! Application context: unified state passed to every command handler.
//!
//! Adding a new cross-cutting concern requires only one field change here;
//! command signatures stay the same.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use crate::application::ports::ConfigStore;
use crate::domain::config::ProvisionConfig;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::config::YamlConfigStore;
use crate::infra::{environment, logging};
use crate::output::{HumanRenderer, JsonRenderer, OutputContext, Renderer};

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
    /// Explicit config file (`--config` / `WINRICE_CONFIG`).
    pub config: Option<PathBuf>,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// Where the provisioning config is read from.
    pub config_store: YamlConfigStore,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// JSON mode implies quiet so progress lines never interleave with the
    /// JSON document on stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if no config path was given and the home directory
    /// cannot be determined.
    pub fn new(flags: AppFlags) -> Result<Self> {
        let mode = if flags.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };
        Ok(Self {
            output: OutputContext::new(flags.no_color, flags.quiet || flags.json),
            mode,
            config_store: YamlConfigStore::resolve(flags.config)?,
        })
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Returns the appropriate `Renderer` variant for the current output mode.
    #[must_use]
    pub fn renderer(&self) -> Renderer<'_> {
        match self.mode {
            OutputMode::Human => Renderer::Human(HumanRenderer::new(&self.output)),
            OutputMode::Json => Renderer::Json(JsonRenderer),
        }
    }

    /// Load, expand and validate the provisioning config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load_config(&self) -> Result<ProvisionConfig> {
        self.config_store.load()
    }

    /// Process runner whose children are killed after `timeout`.
    #[must_use]
    pub fn command_runner(&self, timeout: Duration) -> TokioCommandRunner {
        TokioCommandRunner::new(timeout)
    }

    /// Start file logging in the scratch directory.
    ///
    /// Logging is diagnostic only; failure to set it up is reported and the
    /// command carries on.
    pub fn init_logging(&self) {
        match logging::init(&environment::default_temp_dir()) {
            Ok(path) => tracing::info!(log = %path.display(), "winrice {}", env!("CARGO_PKG_VERSION")),
            Err(e) => self.output.warn(&format!("file logging disabled: {e:#}")),
        }
    }
}
