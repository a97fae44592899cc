//! In-process test doubles for the run collaborators
//!
//! Every double records what it was asked to do in a shared
//! [`CallJournal`], so tests can assert both which collaborators ran and in
//! what order.
//!
//! - [`MockToolchain`]: canned version, targets and installed platforms
//! - [`MockBuildServer`]: numbered builds, file-backed build records,
//!   optional debug proxy port, per-operation failure injection
//! - [`RecordingCleaner`]: records clean requests
//! - [`StaticSettingsProvider`]: fixed settings

mod cleaner;
mod failure;
mod server;
mod settings;
mod toolchain;

pub use cleaner::RecordingCleaner;
pub use failure::{FailureConfig, FailureInjector};
pub use server::MockBuildServer;
pub use settings::StaticSettingsProvider;
pub use toolchain::MockToolchain;

use std::sync::{Arc, Mutex};

/// One collaborator call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Targets,
    InstalledPlatforms,
    ToolchainVersion,
    ToolchainRun(Option<Vec<String>>),
    Clean(Vec<String>),
    CheckBuild(String),
    Build(String),
    Run(String),
    Emulate { platform: String, target: String },
    Debug(String),
}

impl Call {
    /// Whether the call builds, runs or cleans anything.
    pub fn is_side_effect(&self) -> bool {
        !matches!(
            self,
            Call::Targets | Call::InstalledPlatforms | Call::ToolchainVersion | Call::CheckBuild(_)
        )
    }
}

/// Ordered record of calls shared by all doubles of one test.
#[derive(Debug, Clone, Default)]
pub struct CallJournal {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl CallJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, call: Call) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn contains(&self, call: &Call) -> bool {
        self.calls().contains(call)
    }

    /// Position of the first matching call.
    pub fn position(&self, predicate: impl Fn(&Call) -> bool) -> Option<usize> {
        self.calls().iter().position(predicate)
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| predicate(c)).count()
    }
}
