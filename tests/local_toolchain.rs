//! `--local` against a real toolchain executable.
//!
//! The toolchain is a shell script that records its arguments, so these
//! tests see exactly what the native toolchain would be asked to do.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use runlane::mock::{CallJournal, MockBuildServer, RecordingCleaner, StaticSettingsProvider};
use runlane::run::{Collaborators, Dispatcher, RunOutcome};
use runlane::{parse_args, MemorySink, NativeToolchain};
use runlane_protocol::RemoteConnectionInfo;
use tempfile::TempDir;

const RECORDER: &str = "#!/bin/sh\nprintf '%s\\n' \"$@\" > \"$(dirname \"$0\")/args.txt\"\n";

fn install_recorder(dir: &Path) -> PathBuf {
    let script = dir.join("toolchain.sh");
    fs::write(&script, RECORDER).unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    script
}

fn recorded_args(dir: &Path) -> Vec<String> {
    fs::read_to_string(dir.join("args.txt"))
        .unwrap()
        .lines()
        .map(String::from)
        .collect()
}

async fn run_local(list: &[&str]) -> (TempDir, Vec<String>) {
    let temp = TempDir::new().unwrap();
    let script = install_recorder(temp.path());
    let journal = CallJournal::new();

    let dispatcher = Dispatcher::new(
        temp.path().to_path_buf(),
        Collaborators {
            settings: Arc::new(
                StaticSettingsProvider::default()
                    .with_remote("ios", RemoteConnectionInfo::new("mac.local", 3000)),
            ),
            toolchain: Arc::new(NativeToolchain::new(
                script.to_string_lossy().into_owned(),
                temp.path(),
            )),
            remote: Arc::new(MockBuildServer::new(journal.clone())),
            cleaner: Arc::new(RecordingCleaner::new(journal.clone())),
            output: Arc::new(MemorySink::new()),
        },
    );

    let args: Vec<String> = list.iter().map(|s| s.to_string()).collect();
    let command = parse_args(&args).unwrap();
    let outcome = dispatcher.run(&command).await.unwrap();
    let telemetry = match outcome {
        RunOutcome::Completed(telemetry) => telemetry,
        other => panic!("expected a completed run, got {:?}", other),
    };
    assert!(journal.calls().is_empty(), "{:?}", journal.calls());

    let recorded = telemetry.value("localRun.platforms").map(String::from);
    let mut args = recorded_args(temp.path());
    args.push(format!("recorded={}", recorded.unwrap_or_default()));
    (temp, args)
}

// One test: scripts written while another test forks can fail with ETXTBSY.
#[tokio::test]
async fn test_local_forwards_named_platforms_to_toolchain() {
    let (_temp, args) = run_local(&["--local", "android"]).await;
    assert_eq!(args, vec!["run", "android", "recorded=android"]);

    let (_temp, args) = run_local(&["--local", "--release"]).await;
    assert_eq!(args, vec!["run", "--release", "recorded=installed"]);
}
