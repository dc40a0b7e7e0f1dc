//! Unit tests for the provisioning pipeline run against `FakeHost`.

#![allow(clippy::expect_used)]

use std::path::PathBuf;

use winrice_cli::application::services::{launch, pipeline};
use winrice_cli::domain::{
    PipelineReport, PlanOptions, ProvisionConfig, ProvisionError, StepStatus, build_plan,
};

use crate::mocks::{
    CHOCO, FakeHost, GIT, PRIMARY_BUILD_OUTPUT, PRIMARY_EXE, RecordingReporter, Reply,
    SECONDARY_EXE, SETTINGS_DEST, THEME_SETTINGS, test_config,
};

async fn run(host: &FakeHost, cfg: &ProvisionConfig) -> anyhow::Result<PipelineReport> {
    let reporter = RecordingReporter::default();
    run_with(host, cfg, &reporter, PlanOptions::default()).await
}

async fn run_with(
    host: &FakeHost,
    cfg: &ProvisionConfig,
    reporter: &RecordingReporter,
    opts: PlanOptions,
) -> anyhow::Result<PipelineReport> {
    let steps = build_plan(cfg, opts);
    pipeline::run_pipeline(host.host(), cfg, &steps, reporter).await
}

fn provision_error(err: &anyhow::Error) -> &ProvisionError {
    err.downcast_ref::<ProvisionError>()
        .expect("error should be a ProvisionError")
}

// ── Happy paths ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_fresh_machine_applies_every_step() {
    let host = FakeHost::fresh();
    let report = run(&host, &test_config()).await.expect("run succeeds");

    assert_eq!(report.steps.len(), 12);
    assert_eq!(report.count(StepStatus::Applied), 12, "{:?}", report.steps);
    assert!(host.has(PRIMARY_EXE));
    assert!(host.has(SECONDARY_EXE));
    assert!(host.has(SETTINGS_DEST));
    assert!(!host.has(THEME_SETTINGS));
    assert_eq!(host.spawned(), vec![PRIMARY_EXE.to_string()]);
}

#[tokio::test]
async fn test_package_manager_bootstrap_runs_first() {
    let host = FakeHost::fresh();
    run(&host, &test_config()).await.expect("run succeeds");

    let calls = host.calls();
    assert!(calls[0].starts_with("powershell.exe"), "{calls:?}");
    assert!(calls[0].contains("DownloadString"));
    assert!(calls.iter().any(|c| c == &format!("{CHOCO} install git -y --no-progress")));
}

#[tokio::test]
async fn test_second_run_only_repeats_unconditional_steps() {
    let host = FakeHost::fresh();
    let cfg = test_config();
    run(&host, &cfg).await.expect("first run");
    host.on("vswhere.exe", Reply::stdout("C:\\BuildTools"));
    host.on("where.exe firefox", Reply::stdout("C:\\firefox.exe"));
    let before = host.calls().len();

    let report = run(&host, &cfg).await.expect("second run");

    assert_eq!(report.status_of("rust-default"), Some(StepStatus::Applied));
    assert_eq!(report.status_of("launch"), Some(StepStatus::Applied));
    assert_eq!(report.count(StepStatus::Present), 10);
    let again: Vec<_> = host.calls().split_off(before);
    assert!(again.iter().all(|c| !c.contains(" install ")), "{again:?}");
    assert!(again.iter().all(|c| !c.contains("msiexec")), "{again:?}");
    assert_eq!(host.spawned().len(), 2);
}

#[tokio::test]
async fn test_installed_machine_reports_present() {
    let host = FakeHost::installed();
    let report = run(&host, &test_config()).await.expect("run succeeds");

    assert_eq!(report.count(StepStatus::Present), 10);
    assert_eq!(report.count(StepStatus::Warned), 0);
    assert!(host.downloads().is_empty());
}

#[tokio::test]
async fn test_no_launch_skips_launch_step() {
    let host = FakeHost::installed();
    let reporter = RecordingReporter::default();
    let opts = PlanOptions { launch: false };
    let report = run_with(&host, &test_config(), &reporter, opts)
        .await
        .expect("run succeeds");

    assert_eq!(report.status_of("launch"), None);
    assert!(host.spawned().is_empty());
}

// ── Preconditions and fatal steps ─────────────────────────────────────────────

#[tokio::test]
async fn test_not_elevated_fails_before_any_step() {
    let host = FakeHost::fresh();
    host.set_elevated(false);

    let err = run(&host, &test_config()).await.expect_err("must fail");

    assert!(matches!(provision_error(&err), ProvisionError::NotElevated));
    assert!(host.calls().is_empty());
    assert!(host.downloads().is_empty());
}

#[tokio::test]
async fn test_bootstrap_without_marker_is_fatal() {
    let host = FakeHost::fresh();
    host.on("DownloadString", Reply::fail(1, "The remote name could not be resolved"));

    let err = run(&host, &test_config()).await.expect_err("must fail");

    assert!(matches!(
        provision_error(&err),
        ProvisionError::PackageManagerMissing(p) if p == &PathBuf::from(CHOCO)
    ));
    assert_eq!(host.calls().len(), 1, "nothing runs after the bootstrap");
}

#[tokio::test]
async fn test_bootstrap_exit_status_is_ignored_when_marker_appears() {
    let host = FakeHost::fresh();
    host.on(
        "DownloadString",
        Reply::Fail {
            code: 1,
            stderr: "WARNING: restart your shell".to_string(),
            creates: vec![CHOCO.into()],
        },
    );
    let report = run(&host, &test_config()).await.expect("run succeeds");
    assert_eq!(report.status_of("package-manager"), Some(StepStatus::Applied));
}

// ── Desktop applications ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_primary_package_failure_falls_back_to_source_once() {
    let host = FakeHost::fresh();
    host.on("komorebi-0.1.38", Reply::fail(1603, "Fatal error during installation."));
    host.on("cargo.exe build", Reply::creates(&[PRIMARY_BUILD_OUTPUT]));
    let reporter = RecordingReporter::default();

    let report = run_with(&host, &test_config(), &reporter, PlanOptions::default())
        .await
        .expect("fallback succeeds");

    assert_eq!(report.status_of("komorebi"), Some(StepStatus::Applied));
    assert!(host.has(PRIMARY_EXE));
    assert_eq!(host.count("komorebi.git"), 1);
    assert_eq!(host.count("cargo.exe build --release"), 1);
    assert!(!host.has("/host/temp/komorebi-0.1.38-x86_64.msi"), "package removed");
    assert!(
        reporter
            .warnings()
            .iter()
            .any(|w| w.contains("building from source") && w.contains("1603"))
    );
}

#[tokio::test]
async fn test_download_failure_also_falls_back() {
    let host = FakeHost::fresh();
    host.fail_downloads_of("komorebi-0.1.38");
    host.on("cargo.exe build", Reply::creates(&[PRIMARY_BUILD_OUTPUT]));

    let report = run(&host, &test_config()).await.expect("fallback succeeds");

    assert_eq!(report.status_of("komorebi"), Some(StepStatus::Applied));
    assert_eq!(host.count("msiexec"), 1, "only the secondary package ran");
}

#[tokio::test]
async fn test_checksum_mismatch_falls_back() {
    let host = FakeHost::fresh();
    host.on("cargo.exe build", Reply::creates(&[PRIMARY_BUILD_OUTPUT]));
    let mut cfg = test_config();
    cfg.apps.primary.msi_sha256 = Some("ff".repeat(32));

    let report = run(&host, &cfg).await.expect("fallback succeeds");

    assert_eq!(report.status_of("komorebi"), Some(StepStatus::Applied));
    assert_eq!(host.count("komorebi-0.1.38"), 0, "mismatched package never installed");
    assert_eq!(host.count("komorebi.git"), 1);
}

#[tokio::test]
async fn test_primary_fallback_failure_is_fatal() {
    let host = FakeHost::fresh();
    host.on("komorebi-0.1.38", Reply::fail(1603, ""));
    host.on("cargo.exe build", Reply::fail(101, "error: linker `link.exe` not found"));

    let err = run(&host, &test_config()).await.expect_err("must fail");

    match provision_error(&err) {
        ProvisionError::StepFailed { step, reason } => {
            assert_eq!(step, "komorebi");
            assert!(reason.contains("link.exe"), "{reason}");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(host.count("zebar"), 0, "secondary never attempted");
    assert!(host.spawned().is_empty());
}

#[tokio::test]
async fn test_primary_without_source_is_fatal_on_package_failure() {
    let host = FakeHost::fresh();
    host.on("komorebi-0.1.38", Reply::fail(1603, ""));
    let mut cfg = test_config();
    cfg.apps.primary.source = None;

    let err = run(&host, &cfg).await.expect_err("must fail");

    assert!(matches!(provision_error(&err), ProvisionError::StepFailed { .. }));
    assert_eq!(host.count("clone"), 0);
}

#[tokio::test]
async fn test_reboot_required_exit_code_counts_as_success() {
    let host = FakeHost::fresh();
    host.on(
        "komorebi-0.1.38",
        Reply::Fail {
            code: 3010,
            stderr: String::new(),
            creates: vec![PRIMARY_EXE.into()],
        },
    );

    let report = run(&host, &test_config()).await.expect("run succeeds");
    assert_eq!(report.status_of("komorebi"), Some(StepStatus::Applied));
    assert_eq!(host.count("komorebi.git"), 0);
}

#[tokio::test]
async fn test_secondary_failure_warns_and_continues() {
    let host = FakeHost::fresh();
    host.on("zebar-v2.7.0", Reply::fail(1603, "Fatal error during installation."));

    let report = run(&host, &test_config()).await.expect("run succeeds");

    assert_eq!(report.status_of("zebar"), Some(StepStatus::Warned));
    assert_eq!(report.status_of("theme-repository"), Some(StepStatus::Applied));
    assert_eq!(report.status_of("launch"), Some(StepStatus::Applied));
    assert_eq!(host.count("zebar.git"), 0, "secondary has no source fallback");
    assert!(!host.has("/host/temp/zebar-v2.7.0-opt1-x64.msi"), "package removed");
}

#[tokio::test]
async fn test_msiexec_targets_install_directory_and_writes_log() {
    let host = FakeHost::fresh();
    run(&host, &test_config()).await.expect("run succeeds");

    let msi = host
        .calls()
        .into_iter()
        .find(|c| c.contains("zebar-v2.7.0"))
        .expect("zebar install call");
    assert_eq!(
        msi,
        "msiexec /i /host/temp/zebar-v2.7.0-opt1-x64.msi /qn /norestart \
         INSTALLDIR=/host/tools/zebar /l*v /host/temp/zebar-install.log"
    );
}

// ── Soft prerequisites ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_missing_vswhere_warns_and_skips_build_tools() {
    let host = FakeHost::fresh();
    host.remove(crate::mocks::VSWHERE);

    let report = run(&host, &test_config()).await.expect("run succeeds");

    let step = report
        .steps
        .iter()
        .find(|s| s.name == "build-tools")
        .expect("build-tools step");
    assert_eq!(step.status, StepStatus::Warned);
    assert!(step.detail.as_deref().is_some_and(|d| d.contains("not found")));
    assert_eq!(host.count("visualstudio2022buildtools"), 0);
}

#[tokio::test]
async fn test_build_tools_install_passes_workload_parameters() {
    let host = FakeHost::fresh();
    run(&host, &test_config()).await.expect("run succeeds");
    assert_eq!(
        host.count(
            "install visualstudio2022buildtools -y --no-progress --package-parameters \
             --add Microsoft.VisualStudio.Workload.VCTools"
        ),
        1
    );
}

#[tokio::test]
async fn test_browser_lookup_spawn_error_warns() {
    let host = FakeHost::fresh();
    host.on("where.exe firefox", Reply::SpawnError("not found".to_string()));

    let report = run(&host, &test_config()).await.expect("run succeeds");

    assert_eq!(report.status_of("browser"), Some(StepStatus::Warned));
    assert_eq!(host.count("install firefox"), 0);
}

#[tokio::test]
async fn test_git_failure_is_soft() {
    let host = FakeHost::fresh();
    host.on("install git", Reply::fail(1, "package not found"));

    let report = run(&host, &test_config()).await.expect("run succeeds");
    assert_eq!(report.status_of("git"), Some(StepStatus::Warned));
    assert_eq!(report.status_of("rustup"), Some(StepStatus::Applied));
}

#[tokio::test]
async fn test_toolchain_installer_is_deleted_after_run() {
    let host = FakeHost::fresh();
    run(&host, &test_config()).await.expect("run succeeds");
    assert!(!host.has("/host/temp/rustup-init.exe"));
    assert_eq!(
        host.count("/host/cargo/bin/rustup.exe default stable-x86_64-pc-windows-msvc"),
        1
    );
}

// ── Search path effects ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_installed_tools_are_added_to_search_path() {
    let host = FakeHost::fresh();
    run(&host, &test_config()).await.expect("run succeeds");

    let expected: Vec<PathBuf> = [
        "/host/choco/bin",
        "/host/git/cmd",
        "/host/cargo/bin",
        "/host/tools/komorebi",
        "/host/tools/zebar",
    ]
    .iter()
    .map(PathBuf::from)
    .collect();
    assert_eq!(host.search_path(), expected);
    assert_eq!(host.persisted(), expected);
    assert!(PathBuf::from(GIT).starts_with(&expected[1]));
}

#[tokio::test]
async fn test_persist_failure_warns_but_step_succeeds() {
    let host = FakeHost::fresh();
    host.fail_persist();
    let reporter = RecordingReporter::default();

    let report = run_with(&host, &test_config(), &reporter, PlanOptions::default())
        .await
        .expect("run succeeds");

    assert_eq!(report.status_of("git"), Some(StepStatus::Applied));
    assert_eq!(host.search_path().len(), 5, "current process still sees the tools");
    assert!(reporter.warnings().iter().any(|w| w.contains("user Path")));
}

// ── Theme ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_settings_overwrite_existing_destination() {
    let host = FakeHost::fresh();
    host.add_file(SETTINGS_DEST);

    let report = run(&host, &test_config()).await.expect("run succeeds");

    assert_eq!(report.status_of("theme-settings"), Some(StepStatus::Applied));
    assert_eq!(
        host.moves(),
        vec![(PathBuf::from(THEME_SETTINGS), PathBuf::from(SETTINGS_DEST))]
    );
}

#[tokio::test]
async fn test_clone_without_settings_file_warns() {
    let host = FakeHost::fresh();
    host.on(
        "application-specific-configuration",
        Reply::creates(&[crate::mocks::THEME_DIR]),
    );

    let report = run(&host, &test_config()).await.expect("run succeeds");
    assert_eq!(report.status_of("theme-settings"), Some(StepStatus::Warned));
    assert_eq!(report.status_of("launch"), Some(StepStatus::Applied));
}

// ── Launch ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_launch_refuses_missing_executable() {
    let host = FakeHost::fresh();
    let err = launch::launch_primary(&host, &host, &test_config()).expect_err("must fail");
    assert!(format!("{err:#}").contains("not launching"));
    assert!(host.spawned().is_empty());
}

#[tokio::test]
async fn test_progress_messages_follow_step_names() {
    let host = FakeHost::installed();
    let reporter = RecordingReporter::default();
    run_with(&host, &test_config(), &reporter, PlanOptions::default())
        .await
        .expect("run succeeds");

    let events = reporter.events();
    assert_eq!(events[0], "success: package-manager already present");
    assert!(events.contains(&"step: launch...".to_string()));
    assert_eq!(events.last().map(String::as_str), Some("success: launch done"));
}
