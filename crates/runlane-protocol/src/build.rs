//! Remote build requests and results.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::configuration::Configuration;
use crate::connection::RemoteConnectionInfo;

/// Command name sent with every remote build request.
pub const BUILD_COMMAND: &str = "build";

/// File name of a persisted build-info record.
pub const BUILD_INFO_FILE: &str = "buildInfo.json";

/// Directory (relative to the project) holding remote build records.
const REMOTE_DIR: &str = "remote";

/// A platform name that cannot be used as a single path component.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid platform name '{0}': expected a plain identifier")]
pub struct InvalidPlatformName(pub String);

/// Check that `name` is a plain identifier usable as one directory name.
///
/// Rejects empty names, `.` and `..`, and anything containing a path
/// separator or NUL.
pub fn validate_platform_name(name: &str) -> Result<(), InvalidPlatformName> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if invalid {
        Err(InvalidPlatformName(name.to_string()))
    } else {
        Ok(())
    }
}

/// Cache location of the build record for a (platform, configuration) pair,
/// relative to the project directory: `remote/<platform>/<configuration>/buildInfo.json`.
///
/// Nothing else participates in the key.
pub fn build_info_relative_path(
    platform: &str,
    configuration: Configuration,
) -> Result<PathBuf, InvalidPlatformName> {
    validate_platform_name(platform)?;
    Ok(PathBuf::from(REMOTE_DIR)
        .join(platform)
        .join(configuration.as_str())
        .join(BUILD_INFO_FILE))
}

/// Request descriptor for one remote build of one platform.
///
/// Built fresh for each remote run and discarded afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSettings {
    /// Project source directory
    pub source_dir: PathBuf,

    /// Build server to talk to
    pub server_info: RemoteConnectionInfo,

    /// Always [`BUILD_COMMAND`]
    pub build_command: String,

    pub platform: String,

    pub configuration: Configuration,

    /// Empty, `"device"`, or an explicit target id
    pub build_target: String,

    /// UI language reported to the build server
    pub language: String,

    /// Version of the local native toolchain, so the server builds with a match
    pub toolchain_version: String,

    /// Raw `--flag` tokens forwarded to the server build
    #[serde(default)]
    pub extra_options: Vec<String>,
}

impl BuildSettings {
    /// Absolute cache path of this build's record under `source_dir`.
    pub fn build_info_path(&self) -> Result<PathBuf, InvalidPlatformName> {
        Ok(self
            .source_dir
            .join(build_info_relative_path(&self.platform, self.configuration)?))
    }
}

/// Handle to one remote build attempt and its current state.
///
/// Opaque to the orchestrator apart from the build number, the key fields
/// used to validate a cached record, and the optional debug proxy port.
/// Unknown fields written by the build server are preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    /// Server-assigned build number
    pub build_number: u64,

    /// Last status reported by the server (e.g. "Complete", "Running")
    #[serde(default)]
    pub status: String,

    pub platform: String,

    pub configuration: Configuration,

    #[serde(default)]
    pub build_target: String,

    #[serde(default = "default_build_command")]
    pub build_command: String,

    /// Port of the web debug proxy, present once a debugger is attached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_debug_proxy_port: Option<u16>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_build_command() -> String {
    BUILD_COMMAND.to_string()
}

impl BuildInfo {
    pub fn new(build_number: u64, platform: impl Into<String>, configuration: Configuration) -> Self {
        Self {
            build_number,
            status: String::new(),
            platform: platform.into(),
            configuration,
            build_target: String::new(),
            build_command: default_build_command(),
            web_debug_proxy_port: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_build_target(mut self, target: impl Into<String>) -> Self {
        self.build_target = target.into();
        self
    }

    /// Whether this record belongs to the given (platform, configuration) key.
    pub fn matches(&self, platform: &str, configuration: Configuration) -> bool {
        self.platform == platform && self.configuration == configuration
    }
}
