//! Shared harness for run orchestration tests.
//!
//! Wires a [`Dispatcher`] to in-process doubles over a temporary project
//! directory. All doubles share one call journal.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use runlane::mock::{
    Call, CallJournal, MockBuildServer, MockToolchain, RecordingCleaner, StaticSettingsProvider,
};
use runlane::run::{Collaborators, Dispatcher, RunError, RunOutcome};
use runlane::{parse_args, MemorySink, TelemetryProperties};
use runlane_protocol::RemoteConnectionInfo;
use tempfile::TempDir;

pub struct Harness {
    pub temp: TempDir,
    pub journal: CallJournal,
    pub output: Arc<MemorySink>,
    pub server: Arc<MockBuildServer>,
    toolchain: MockToolchain,
    settings: StaticSettingsProvider,
}

impl Harness {
    pub fn new() -> Self {
        let journal = CallJournal::new();
        Self {
            temp: TempDir::new().expect("temp dir"),
            output: Arc::new(MemorySink::new()),
            server: Arc::new(MockBuildServer::new(journal.clone())),
            toolchain: MockToolchain::new(journal.clone()),
            settings: StaticSettingsProvider::default(),
            journal,
        }
    }

    /// Configure a build server for `platform`.
    pub fn with_remote(mut self, platform: &str) -> Self {
        self.settings = self
            .settings
            .with_remote(platform, RemoteConnectionInfo::new("mac.local", 3000));
        self
    }

    pub fn with_installed(mut self, platforms: &[&str]) -> Self {
        self.toolchain = self.toolchain.with_installed(platforms);
        self
    }

    pub fn with_toolchain(mut self, configure: impl FnOnce(MockToolchain) -> MockToolchain) -> Self {
        self.toolchain = configure(self.toolchain);
        self
    }

    /// Replace the build server. Call before injecting failures.
    pub fn with_server(mut self, configure: impl FnOnce(MockBuildServer) -> MockBuildServer) -> Self {
        self.server = Arc::new(configure(MockBuildServer::new(self.journal.clone())));
        self
    }

    pub fn project(&self) -> &Path {
        self.temp.path()
    }

    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(
            self.project().to_path_buf(),
            Collaborators {
                settings: Arc::new(self.settings.clone()),
                toolchain: Arc::new(self.toolchain.clone()),
                remote: self.server.clone(),
                cleaner: Arc::new(RecordingCleaner::new(self.journal.clone())),
                output: self.output.clone(),
            },
        )
    }

    pub async fn run(&self, list: &[&str]) -> Result<RunOutcome, RunError> {
        let command = parse_args(&args(list)).expect("arguments parse");
        self.dispatcher().run(&command).await
    }

    /// Run and unwrap the completed telemetry.
    pub async fn completed(&self, list: &[&str]) -> TelemetryProperties {
        match self.run(list).await {
            Ok(RunOutcome::Completed(telemetry)) => telemetry,
            Ok(other) => panic!("expected a completed run, got {:?}", other),
            Err(e) => panic!("run failed: {}", e),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.journal.calls()
    }

    pub fn lines(&self) -> Vec<String> {
        self.output.lines()
    }
}

pub fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}
