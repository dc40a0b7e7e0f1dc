//! Integration tests for the winrice CLI surface
//!
//! These tests only exercise commands that never touch the host: help,
//! version, and config inspection.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn winrice() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("winrice"));
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("WINRICE_CONFIG");
    cmd
}

// --- Help and version tests ---

#[test]
fn test_cli_help_flag_shows_help() {
    winrice()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Provision a tiling Windows desktop"));
}

#[test]
fn test_cli_help_lists_subcommands() {
    winrice()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("version"));
}

#[test]
fn test_run_help_documents_no_launch() {
    winrice()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--no-launch"));
}

#[test]
fn test_cli_version_flag_shows_version() {
    winrice()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("winrice"));
}

#[test]
fn test_version_command_shows_version() {
    winrice()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "winrice {}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_version_command_json_outputs_valid_json() {
    let output = winrice()
        .args(["version", "--json"])
        .output()
        .expect("run winrice");
    assert!(output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(v["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_unknown_subcommand_fails() {
    winrice()
        .arg("explode")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}
