//! Integration tests for `winrice config`.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn winrice() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("winrice"));
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("WINRICE_CONFIG");
    cmd
}

#[test]
fn test_config_path_prints_explicit_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("winrice.yaml");
    winrice()
        .arg("--config")
        .arg(&path)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(path.display().to_string()));
}

#[test]
fn test_config_path_reads_env_var() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("from-env.yaml");
    winrice()
        .env("WINRICE_CONFIG", &path)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("from-env.yaml"));
}

#[test]
fn test_config_show_defaults_when_file_missing() {
    let dir = tempfile::tempdir().expect("tempdir");
    winrice()
        .arg("--config")
        .arg(dir.path().join("missing.yaml"))
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("using defaults"))
        .stdout(predicate::str::contains("komorebi"))
        .stdout(predicate::str::contains("zebar"));
}

#[test]
fn test_config_show_json_applies_overrides() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "browser:\n  command: librewolf\n  package: librewolf\n")
        .expect("write config");

    let output = winrice()
        .arg("--config")
        .arg(&path)
        .args(["--json", "config", "show"])
        .output()
        .expect("run winrice");

    assert!(output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(v["config"]["browser"]["package"], "librewolf");
    assert_eq!(v["config"]["git"]["package"], "git");
}

#[test]
fn test_invalid_config_exits_nonzero() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "theme:\n  repository: http://example.com/theme.git\n")
        .expect("write config");

    winrice()
        .arg("--config")
        .arg(&path)
        .args(["config", "show"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("✗ Error:"))
        .stderr(predicate::str::contains("theme.repository"));
}

#[test]
fn test_partial_app_override_keeps_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.yaml");
    std::fs::write(
        &path,
        "apps:\n  primary:\n    msi_url: https://example.com/komorebi-0.1.39.msi\n",
    )
    .expect("write config");

    let output = winrice()
        .arg("--config")
        .arg(&path)
        .args(["--json", "config", "show"])
        .output()
        .expect("run winrice");

    assert_eq!(output.status.code(), Some(0));
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    let primary = &v["config"]["apps"]["primary"];
    assert_eq!(primary["msi_url"], "https://example.com/komorebi-0.1.39.msi");
    assert_eq!(primary["name"], "komorebi");
    assert_eq!(primary["executable"], "komorebi.exe");
    assert!(primary["source"]["repository"].is_string());
}

#[test]
fn test_invalid_config_json_error_code() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "apps:\n  secondary:\n    name: ''\n    directory: zebar\n    executable: zebar.exe\n    msi_url: https://example.com/zebar.msi\n")
        .expect("write config");

    let output = winrice()
        .arg("--config")
        .arg(&path)
        .args(["--json", "config", "show"])
        .output()
        .expect("run winrice");

    assert_eq!(output.status.code(), Some(1));
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(v["error"], true);
    assert_eq!(v["code"], "INVALID_CONFIG");
}

#[test]
fn test_unparseable_config_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "git: [not, a, map]\n").expect("write config");

    winrice()
        .arg("--config")
        .arg(&path)
        .args(["config", "show"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot parse"));
}
