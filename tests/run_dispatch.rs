//! Execution mode dispatch: option validation, `--list`, `--local`,
//! clean ordering and platform resolution failures.

mod fixtures;

use fixtures::Harness;
use runlane::mock::Call;
use runlane::run::{RunError, RunOutcome};

// === Option validation ===

#[tokio::test]
async fn test_incompatible_pairs_fail_before_any_collaborator() {
    let pairs = [
        ("--remote", "--local"),
        ("--device", "--emulator"),
        ("--debug", "--release"),
        ("--nobuild", "--clean"),
    ];

    for (a, b) in pairs {
        let harness = Harness::new().with_remote("ios").with_installed(&["android"]);
        let err = harness.run(&[a, b, "ios"]).await.unwrap_err();

        match err {
            RunError::IncompatibleOptions { first, second } => {
                assert_eq!(format!("--{}", first), a);
                assert_eq!(format!("--{}", second), b);
            }
            other => panic!("expected IncompatibleOptions, got {:?}", other),
        }
        assert!(harness.calls().is_empty(), "{} {} reached {:?}", a, b, harness.calls());
    }
}

#[tokio::test]
async fn test_only_first_conflict_reported() {
    let harness = Harness::new();
    let err = harness
        .run(&["--nobuild", "--clean", "--device", "--emulator"])
        .await
        .unwrap_err();
    assert!(matches!(err, RunError::IncompatibleOptions { ref first, .. } if first == "device"));
}

// === --list ===

#[tokio::test]
async fn test_list_only_enumerates_targets() {
    let harness = Harness::new()
        .with_remote("ios")
        .with_installed(&["android"])
        .with_toolchain(|t| t.with_targets(&["Pixel_5", "Nexus_7"]));

    let outcome = harness.run(&["--list", "--remote", "--clean", "ios"]).await.unwrap();

    match outcome {
        RunOutcome::Targets(targets) => assert_eq!(targets, vec!["Pixel_5", "Nexus_7"]),
        other => panic!("expected targets, got {:?}", other),
    }
    assert_eq!(harness.calls(), vec![Call::Targets]);
}

// === --local ===

#[tokio::test]
async fn test_local_runs_installed_platforms_through_toolchain() {
    let harness = Harness::new().with_remote("ios").with_installed(&["android"]);

    let telemetry = harness.completed(&["--local"]).await;

    assert_eq!(harness.calls(), vec![Call::ToolchainRun(None)]);
    assert_eq!(telemetry.value("localRun.platforms"), Some("installed"));
    assert_eq!(telemetry.value("options.local"), Some("true"));
    assert!(!telemetry.contains_key("platforms.actuallyBuilt.local1"));
}

#[tokio::test]
async fn test_local_clean_resolves_and_cleans_first() {
    let harness = Harness::new().with_installed(&["android", "browser"]);

    harness.completed(&["--local", "--clean"]).await;

    let calls = harness.calls();
    let clean = harness
        .journal
        .position(|c| matches!(c, Call::Clean(_)))
        .expect("clean issued");
    let run = harness
        .journal
        .position(|c| matches!(c, Call::ToolchainRun(_)))
        .expect("run issued");
    assert!(clean < run, "{:?}", calls);
    assert!(calls.contains(&Call::Clean(vec!["android".to_string(), "browser".to_string()])));
}

#[tokio::test]
async fn test_local_toolchain_failure_propagates() {
    let harness = Harness::new().with_toolchain(|t| t.failing_run("gradle exploded"));

    let err = harness.run(&["--local", "android"]).await.unwrap_err();
    assert!(matches!(err, RunError::Toolchain(_)));
    assert_eq!(err.exit_code(), 40);
}

// === Clean ordering ===

#[tokio::test]
async fn test_remote_clean_precedes_every_build() {
    let harness = Harness::new().with_remote("ios").with_remote("android");

    harness.completed(&["--remote", "--clean"]).await;

    let clean = harness
        .journal
        .position(|c| matches!(c, Call::Clean(_)))
        .expect("clean issued");
    let first_side_effect = harness
        .journal
        .position(|c| matches!(c, Call::Build(_) | Call::Run(_) | Call::Emulate { .. }))
        .expect("build issued");
    assert!(clean < first_side_effect);
    assert_eq!(harness.journal.count(|c| matches!(c, Call::Clean(_))), 1);
}

#[tokio::test]
async fn test_no_clean_without_flag() {
    let harness = Harness::new().with_remote("ios");
    harness.completed(&["--remote", "ios"]).await;
    assert_eq!(harness.journal.count(|c| matches!(c, Call::Clean(_))), 0);
}

// === Resolution ===

#[tokio::test]
async fn test_no_platforms_is_an_error() {
    let harness = Harness::new();

    let err = harness.run(&[]).await.unwrap_err();
    assert!(matches!(err, RunError::PlatformResolution(_)));
    assert_eq!(err.exit_code(), 4);
    assert!(harness.journal.count(|c| c.is_side_effect()) == 0);
}

#[tokio::test]
async fn test_remote_without_configured_platforms_is_an_error() {
    let harness = Harness::new().with_installed(&["android"]);

    let err = harness.run(&["--remote"]).await.unwrap_err();
    assert!(matches!(err, RunError::PlatformResolution(_)));
    assert!(!harness.calls().contains(&Call::InstalledPlatforms));
}

#[tokio::test]
async fn test_forced_remote_platform_without_server_is_not_known() {
    let harness = Harness::new();

    let err = harness.run(&["--remote", "ios"]).await.unwrap_err();

    assert!(matches!(err, RunError::RemotePlatformNotKnown(ref p) if p == "ios"));
    assert_eq!(err.exit_code(), 3);
    assert!(!harness.calls().iter().any(|c| matches!(c, Call::Build(_) | Call::CheckBuild(_))));
}

// === Telemetry ===

#[tokio::test]
async fn test_command_line_telemetry() {
    let harness = Harness::new().with_remote("ios");

    let telemetry = harness
        .completed(&["--remote", "--release", "--target", "iPhone-X", "ios", "--buildFlag=a"])
        .await;

    assert_eq!(telemetry.value("options.remote"), Some("true"));
    assert_eq!(telemetry.value("options.release"), Some("true"));
    assert!(telemetry.get("options.target").unwrap().is_pii);
    assert_ne!(telemetry.value("options.target"), Some("iPhone-X"));
    assert_eq!(telemetry.value("options.unknownCount"), Some("1"));
    assert_eq!(telemetry.value("platforms.requestedViaCommandLine.remote1"), Some("ios"));
    assert_eq!(telemetry.value("platforms.actuallyBuilt.remote1"), Some("ios"));
    assert_eq!(telemetry.value("platforms.actuallyBuilt.remote1.isSecure"), Some("false"));
}

#[tokio::test]
async fn test_path_like_platform_rejected_before_clean() {
    let harness = Harness::new();

    let err = harness
        .run(&["--remote", "--clean", "../../precious"])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RunError::PlatformResolution(runlane::platform::PlatformError::InvalidName(ref n))
            if n == "../../precious"
    ));
    assert_eq!(err.exit_code(), 4);
    assert!(harness.calls().is_empty(), "{:?}", harness.calls());
}
