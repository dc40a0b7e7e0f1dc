//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use std::path::PathBuf;

use thiserror::Error;

// ── Provisioning errors ───────────────────────────────────────────────────────

/// Conditions that terminate the pipeline.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("Administrator privileges required. Re-run winrice from an elevated prompt.")]
    NotElevated,

    #[error("Package manager is still missing after bootstrap (expected {}).", .0.display())]
    PackageManagerMissing(PathBuf),

    #[error("Step '{step}' failed: {reason}")]
    StepFailed { step: String, reason: String },
}

impl ProvisionError {
    /// Stable machine-readable code used by `--json` error output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotElevated => "NOT_ELEVATED",
            Self::PackageManagerMissing(_) => "PACKAGE_MANAGER_MISSING",
            Self::StepFailed { .. } => "STEP_FAILED",
        }
    }
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors raised while validating the provisioning configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value}\n\nDownloads and clones must use https://")]
    InsecureUrl { field: String, value: String },

    #[error("Missing value for {0}")]
    EmptyField(String),

    #[error("Both applications are configured to install into '{0}'")]
    SharedAppDirectory(String),
}
