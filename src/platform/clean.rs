//! Platform cleaning before a run.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use runlane_options::CommandData;
use runlane_protocol::validate_platform_name;
use tracing::{debug, info};

use super::{Location, Platform};

/// Errors raised while cleaning platform outputs
#[derive(Debug, thiserror::Error)]
#[error("Failed to clean {platform} ({path}): {source}")]
pub struct CleanError {
    pub platform: String,
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Removes previous build outputs for a set of platforms.
#[async_trait]
pub trait PlatformCleaner: Send + Sync {
    async fn clean_platforms(
        &self,
        platforms: &[Platform],
        command: &CommandData,
    ) -> Result<(), CleanError>;
}

/// Cleans build outputs inside a project directory.
///
/// Remote platforms lose their `remote/<platform>` build records; local
/// platforms lose `platforms/<platform>/build`.
#[derive(Debug, Clone)]
pub struct FsPlatformCleaner {
    project_dir: PathBuf,
}

impl FsPlatformCleaner {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
        }
    }

    /// Directory removed when cleaning a platform.
    pub fn clean_target(&self, platform: &Platform) -> PathBuf {
        match platform.location {
            Location::Remote => self.project_dir.join("remote").join(&platform.name),
            Location::Local => self
                .project_dir
                .join("platforms")
                .join(&platform.name)
                .join("build"),
        }
    }

    async fn remove_dir(platform: &Platform, path: &Path) -> Result<(), CleanError> {
        match tokio::fs::remove_dir_all(path).await {
            Ok(()) => {
                info!(platform = %platform.name, path = %path.display(), "cleaned");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(platform = %platform.name, path = %path.display(), "nothing to clean");
                Ok(())
            }
            Err(source) => Err(CleanError {
                platform: platform.name.clone(),
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

#[async_trait]
impl PlatformCleaner for FsPlatformCleaner {
    async fn clean_platforms(
        &self,
        platforms: &[Platform],
        _command: &CommandData,
    ) -> Result<(), CleanError> {
        for platform in platforms {
            let target = self.clean_target(platform);
            if let Err(err) = validate_platform_name(&platform.name) {
                return Err(CleanError {
                    platform: platform.name.clone(),
                    path: target,
                    source: std::io::Error::new(std::io::ErrorKind::InvalidInput, err),
                });
            }
            Self::remove_dir(platform, &target).await?;
        }
        Ok(())
    }
}
