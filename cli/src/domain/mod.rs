//! Domain layer: pure types, plan construction, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod digest;
pub mod error;
pub mod plan;
pub mod powershell;
pub mod report;
pub mod search_path;

pub use config::{AppConfig, ProvisionConfig, SourceBuildConfig};
pub use error::{ConfigError, ProvisionError};
pub use plan::{Action, AppRole, PlanOptions, Severity, Step, build_plan};
pub use report::{Effect, PipelineReport, PlanEntry, PlanReport, Presence, StepStatus};
