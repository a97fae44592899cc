//! Runlane - run orchestration for multi-platform mobile builds
//!
//! Given a set of target platforms, decides per platform whether to run
//! through the locally installed native toolchain or through a remote build
//! server, drives each platform to completion concurrently, and aggregates
//! the outcome into one telemetry record.

pub mod cache;
pub mod config;
pub mod mock;
pub mod output;
pub mod platform;
pub mod remote;
pub mod run;
pub mod telemetry;
pub mod toolchain;

pub use cache::{BuildInfoCache, CacheError};
pub use config::{FileSettingsProvider, Settings, SettingsProvider};
pub use output::{DebugProxyLine, MemorySink, OutputSink, StdoutSink};
pub use platform::{FsPlatformCleaner, Location, Platform, PlatformCleaner};
pub use remote::{ProcessBuildClient, RemoteBuildClient, RemoteError};
pub use run::{Collaborators, Dispatcher, ExecutionMode, RunError, RunOutcome};
pub use runlane_options::{parse_args, CommandData};
pub use telemetry::{TelemetryProperties, TelemetryValue};
pub use toolchain::{NativeToolchain, Toolchain, ToolchainError};
