//! Step results, side effects, and the reports rendered at the end of a run.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::plan::Severity;

// ── Check and action results ──────────────────────────────────────────────────

/// Result of a step's presence check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "lowercase")]
pub enum Presence {
    /// Already installed; the action is skipped.
    Present,
    /// Not installed; the action runs.
    Missing,
    /// The check itself could not be performed; the step is skipped with a warning.
    Unknown(String),
    /// The step has no check and runs every time.
    Always,
}

/// Side effect requested by a step and applied by the pipeline runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Make `dir` visible to later child processes and persist it to the user `Path`.
    AppendSearchPath(PathBuf),
}

// ── Pipeline report ───────────────────────────────────────────────────────────

/// Final status of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Check found the work already done.
    Present,
    /// Action ran and succeeded.
    Applied,
    /// Check or action failed softly.
    Warned,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub name: String,
    pub severity: Severity,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Everything a run did, in order.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub started_at: DateTime<Utc>,
    pub steps: Vec<StepRecord>,
}

impl PipelineReport {
    #[must_use]
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            steps: Vec::new(),
        }
    }

    pub fn record(
        &mut self,
        name: &str,
        severity: Severity,
        status: StepStatus,
        detail: Option<String>,
    ) {
        self.steps.push(StepRecord {
            name: name.to_string(),
            severity,
            status,
            detail,
        });
    }

    #[must_use]
    pub fn count(&self, status: StepStatus) -> usize {
        self.steps.iter().filter(|s| s.status == status).count()
    }

    #[must_use]
    pub fn status_of(&self, name: &str) -> Option<StepStatus> {
        self.steps.iter().find(|s| s.name == name).map(|s| s.status)
    }

    /// One-line summary, e.g. `"3 applied, 8 already present, 1 warning"`.
    #[must_use]
    pub fn summary(&self) -> String {
        let warnings = self.count(StepStatus::Warned);
        format!(
            "{} applied, {} already present, {warnings} {}",
            self.count(StepStatus::Applied),
            self.count(StepStatus::Present),
            if warnings == 1 { "warning" } else { "warnings" },
        )
    }
}

// ── Plan report ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct PlanEntry {
    pub name: String,
    pub severity: Severity,
    pub presence: Presence,
}

/// Read-only evaluation of every step's check.
#[derive(Debug, Clone, Serialize, Default)]
pub struct PlanReport {
    pub steps: Vec<PlanEntry>,
}

impl PlanReport {
    /// Number of steps whose action would run.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.steps
            .iter()
            .filter(|e| matches!(e.presence, Presence::Missing | Presence::Always))
            .count()
    }
}
