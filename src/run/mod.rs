//! Run orchestration
//!
//! Turns one `run` invocation into per-platform work:
//! - Pick exactly one execution mode (targets, remote, local, fallback)
//! - Resolve platforms and clean them first when `--clean` is given
//! - Run each remote platform through its own build → run/emulate → debug sequence
//! - Run all local platforms as one toolchain batch
//! - Join all tasks fail-fast, then aggregate telemetry
//!
//! Tasks are started together and the first failure decides the result.
//! Sibling tasks already in flight are left to finish on their own.

mod dispatcher;
mod local;
mod mode;
mod sequencer;

pub use dispatcher::{Collaborators, Dispatcher, RunOutcome};
pub use local::LocalRunDelegate;
pub use mode::ExecutionMode;
pub use sequencer::{
    build_command_hint, RemoteRunOutcome, RemoteRunPlan, RemoteRunSequencer, RunKind,
    SequenceState,
};

use std::path::PathBuf;
use std::sync::Arc;

use runlane_options::{CommandData, OptionsError};

use crate::config::Settings;
use crate::output::OutputSink;
use crate::platform::{CleanError, PlatformError};
use crate::remote::{RemoteBuildClient, RemoteError};
use crate::toolchain::{Toolchain, ToolchainError};

/// Program name used when suggesting follow-up commands.
pub const PROGRAM_NAME: &str = "runlane";

/// Errors that end a run
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("--{first} and --{second} cannot be used together")]
    IncompatibleOptions { first: String, second: String },

    #[error("invalid options: {0}")]
    Options(OptionsError),

    #[error("No remote build server is configured for platform '{0}'")]
    RemotePlatformNotKnown(String),

    #[error("No remote build was found to run. Build it first with: {command}")]
    NoRemoteBuildFound { command: String },

    #[error(transparent)]
    PlatformResolution(#[from] PlatformError),

    #[error("clean failed: {0}")]
    Clean(#[from] CleanError),

    #[error("toolchain error: {0}")]
    Toolchain(#[from] ToolchainError),

    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("platform task failed: {0}")]
    Task(String),
}

impl From<OptionsError> for RunError {
    fn from(err: OptionsError) -> Self {
        match err {
            OptionsError::IncompatibleOptions { first, second } => {
                RunError::IncompatibleOptions { first, second }
            }
            other => RunError::Options(other),
        }
    }
}

impl RunError {
    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::IncompatibleOptions { .. } => 2,
            RunError::Options(_) => 2,
            RunError::RemotePlatformNotKnown(_) => 3,
            RunError::PlatformResolution(_) => 4,
            RunError::Remote(_) => 20,
            RunError::NoRemoteBuildFound { .. } => 21,
            RunError::Toolchain(_) => 40,
            RunError::Clean(_) => 1,
            RunError::Task(_) => 1,
        }
    }
}

/// Result type for run operations
pub type RunResult<T> = Result<T, RunError>;

/// Everything a platform task needs, shared read-only across tasks.
#[derive(Clone)]
pub struct RunContext {
    pub project_dir: PathBuf,
    pub command: Arc<CommandData>,
    pub settings: Arc<Settings>,
    pub toolchain: Arc<dyn Toolchain>,
    pub remote: Arc<dyn RemoteBuildClient>,
    pub output: Arc<dyn OutputSink>,
}
