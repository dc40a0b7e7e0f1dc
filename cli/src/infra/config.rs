//! Infrastructure implementation of the `ConfigStore` port.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::ConfigStore;
use crate::domain::config::ProvisionConfig;

/// Production implementation of `ConfigStore` that reads a YAML file on disk.
pub struct YamlConfigStore {
    path: PathBuf,
}

impl YamlConfigStore {
    /// Use `explicit` when given (from `--config` / `WINRICE_CONFIG`),
    /// otherwise `~/.winrice/config.yaml`.
    ///
    /// # Errors
    ///
    /// Returns an error if no path was given and the home directory cannot be
    /// determined.
    pub fn resolve(explicit: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = explicit {
            return Ok(Self::with_path(path));
        }
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(Self::with_path(home.join(".winrice").join("config.yaml")))
    }

    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    fn read(&self) -> Result<ProvisionConfig> {
        if !self.path.exists() {
            return Ok(ProvisionConfig::default());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("cannot read {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(ProvisionConfig::default());
        }
        serde_yaml::from_str(&content)
            .with_context(|| format!("cannot parse {}", self.path.display()))
    }
}

impl ConfigStore for YamlConfigStore {
    fn load(&self) -> Result<ProvisionConfig> {
        let mut config = self.read()?;
        let home = dirs::home_dir();
        config.expand_paths(home.as_deref(), &|name: &str| std::env::var(name).ok());
        config
            .validate()
            .with_context(|| format!("invalid configuration in {}", self.path.display()))?;
        Ok(config)
    }

    fn path(&self) -> &Path {
        &self.path
    }
}
