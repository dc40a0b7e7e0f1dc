//! Unit tests for `WindowsEnvironment` driven by the fake command runner.

#![allow(clippy::expect_used)]

use std::path::{Path, PathBuf};

use winrice_cli::application::ports::HostEnvironment;
use winrice_cli::infra::environment::WindowsEnvironment;

use crate::mocks::{FakeHost, Reply};

fn env(runner: &FakeHost) -> WindowsEnvironment<'_, FakeHost> {
    WindowsEnvironment::new(runner, PathBuf::from("/host/temp"))
}

#[tokio::test]
async fn test_elevated_when_net_session_succeeds() {
    let runner = FakeHost::fresh();
    assert!(env(&runner).is_elevated().await);
    assert_eq!(runner.calls(), vec!["net session".to_string()]);
}

#[tokio::test]
async fn test_not_elevated_when_net_session_is_denied() {
    let runner = FakeHost::fresh();
    runner.on("net session", Reply::fail(2, "System error 5 has occurred."));
    assert!(!env(&runner).is_elevated().await);
}

#[tokio::test]
async fn test_not_elevated_when_net_cannot_run() {
    let runner = FakeHost::fresh();
    runner.on("net session", Reply::SpawnError("not found".to_string()));
    assert!(!env(&runner).is_elevated().await);
}

#[tokio::test]
async fn test_persist_appends_missing_directory() {
    let runner = FakeHost::fresh();
    runner.on("DoNotExpandEnvironmentNames", Reply::stdout("C:\\Windows;C:\\Tools\\bin\r\n"));

    env(&runner)
        .persist_user_path(Path::new("/host/tools/zebar"))
        .await
        .expect("persist");

    let calls = runner.calls();
    assert_eq!(calls.len(), 2);
    assert!(
        calls[1].contains(
            "SetValue('Path', 'C:\\Windows;C:\\Tools\\bin;/host/tools/zebar', 'ExpandString')"
        ),
        "{calls:?}"
    );
}

#[tokio::test]
async fn test_persist_skips_write_when_already_present() {
    let runner = FakeHost::fresh();
    runner.on("DoNotExpandEnvironmentNames", Reply::stdout("C:\\Windows;/host/tools/zebar/"));

    env(&runner)
        .persist_user_path(Path::new("/host/tools/zebar"))
        .await
        .expect("persist");

    assert_eq!(runner.count("SetValue"), 0);
}

#[tokio::test]
async fn test_persist_reports_read_failure() {
    let runner = FakeHost::fresh();
    runner.on("DoNotExpandEnvironmentNames", Reply::fail(1, "Access is denied."));

    let err = env(&runner)
        .persist_user_path(Path::new("/host/tools/zebar"))
        .await
        .expect_err("must fail");

    assert!(format!("{err:#}").contains("reading user Path"));
    assert!(format!("{err:#}").contains("Access is denied."));
}

#[test]
fn test_temp_dir_is_configured_path() {
    let runner = FakeHost::fresh();
    assert_eq!(env(&runner).temp_dir(), PathBuf::from("/host/temp"));
}
