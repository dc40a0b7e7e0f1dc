//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use anyhow::Result;

use crate::domain::ProvisionConfig;

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
    /// Start a program and return without waiting for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned.
    fn spawn_detached(&self, program: &str, args: &[&str]) -> Result<()>;
    /// Prepend `dir` to the search path of every child spawned afterwards.
    fn add_search_path(&self, dir: &Path);
}

// ── Filesystem Ports ──────────────────────────────────────────────────────────

/// Abstracts the filesystem operations install steps rely on.
pub trait HostFs {
    /// Existence check used as the installed-tool marker.
    fn exists(&self, path: &Path) -> bool;
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    fn remove_file(&self, path: &Path) -> Result<()>;
    fn remove_dir_all(&self, path: &Path) -> Result<()>;
    /// Copy `from` to `to`, replacing `to` if it exists.
    fn copy_file(&self, from: &Path, to: &Path) -> Result<()>;
    /// Move `from` to `to`, replacing `to` if it exists.
    fn move_file(&self, from: &Path, to: &Path) -> Result<()>;
}

/// Abstracts file hashing operations.
pub trait FileHasher {
    /// Compute the SHA-256 hash of a file.
    fn sha256_file(&self, path: &Path) -> Result<String>;
}

// ── Network Port ──────────────────────────────────────────────────────────────

/// Abstracts HTTP downloads so steps can be tested without network access.
#[allow(async_fn_in_trait)]
pub trait Downloader {
    /// Download `url` to `dest`, returning the number of bytes written.
    async fn download(&self, url: &str, dest: &Path) -> Result<u64>;
}

// ── Host Environment Port ─────────────────────────────────────────────────────

/// Abstracts privilege and user-environment queries.
#[allow(async_fn_in_trait)]
pub trait HostEnvironment {
    /// Returns `true` when running with administrator privileges.
    async fn is_elevated(&self) -> bool;
    /// Append `dir` to the user-level `Path` if it is not already there.
    async fn persist_user_path(&self, dir: &Path) -> Result<()>;
    /// Scratch directory for downloaded packages and logs.
    fn temp_dir(&self) -> PathBuf;
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Abstracts loading the provisioning configuration.
pub trait ConfigStore {
    /// Load, expand, and validate the configuration. A missing file yields defaults.
    fn load(&self) -> Result<ProvisionConfig>;
    /// Location of the config file.
    fn path(&self) -> &Path;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait: no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Host bundle ───────────────────────────────────────────────────────────────

/// The set of ports a provisioning run talks to.
pub struct Host<'a, R, F, D, E> {
    pub runner: &'a R,
    pub fs: &'a F,
    pub net: &'a D,
    pub env: &'a E,
}

impl<R, F, D, E> Clone for Host<'_, R, F, D, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R, F, D, E> Copy for Host<'_, R, F, D, E> {}
