//! Remote build-server client
//!
//! The orchestrator drives remote platforms through [`RemoteBuildClient`];
//! the wire protocol itself lives behind it. [`ProcessBuildClient`] talks to
//! an out-of-process helper with one JSON request/response per call.

mod process;

pub use process::ProcessBuildClient;

use std::path::Path;

use async_trait::async_trait;
use runlane_protocol::{BuildInfo, BuildSettings, ClientError, RemoteConnectionInfo};

use crate::cache::CacheError;

/// Remote client errors
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The build server (or helper) reported a failure
    #[error("Remote build server error: {0}")]
    Server(#[from] ClientError),

    #[error("Failed to start remote client `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Remote client I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Remote client protocol error: {0}")]
    Protocol(String),

    #[error("Build record error: {0}")]
    Cache(#[from] CacheError),
}

/// Client for one remote build server protocol.
///
/// Every call is a suspension point; implementations must be shareable
/// across concurrently running platform tasks.
#[async_trait]
pub trait RemoteBuildClient: Send + Sync {
    /// Find the build recorded at `cache_path` and confirm the server still has it.
    ///
    /// `Ok(None)` when there is no usable record.
    async fn check_for_build_on_server(
        &self,
        settings: &BuildSettings,
        cache_path: &Path,
    ) -> Result<Option<BuildInfo>, RemoteError>;

    /// Submit a build. Always issued; the server reuses artifacts where it can.
    /// A successful build replaces the cached record.
    async fn build(&self, settings: &BuildSettings) -> Result<BuildInfo, RemoteError>;

    /// Run a finished build on a device attached to the server.
    async fn run(
        &self,
        info: &BuildInfo,
        connection: &RemoteConnectionInfo,
    ) -> Result<BuildInfo, RemoteError>;

    /// Launch a finished build in an emulator; `target` may be empty.
    async fn emulate(
        &self,
        info: &BuildInfo,
        connection: &RemoteConnectionInfo,
        target: &str,
    ) -> Result<BuildInfo, RemoteError>;

    /// Attach the debugger; the result may carry a web debug proxy port.
    async fn debug(
        &self,
        info: &BuildInfo,
        connection: &RemoteConnectionInfo,
    ) -> Result<BuildInfo, RemoteError>;
}
