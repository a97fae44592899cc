//! Build-info cache
//!
//! One JSON record per (platform, configuration) under the project:
//! `remote/<platform>/<configuration>/buildInfo.json`.
//!
//! - Absence is a normal outcome, not an error
//! - A record whose platform/configuration disagree with its key is treated as absent
//! - Records are replaced wholesale (write-then-rename), never edited in place
//! - Nothing here deletes or invalidates records

use std::io;
use std::path::{Path, PathBuf};

use runlane_protocol::{build_info_relative_path, BuildInfo, Configuration, InvalidPlatformName};
use tracing::{debug, warn};

/// Build-info cache errors
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Failed to access build record {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Corrupt build record {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    InvalidKey(#[from] InvalidPlatformName),
}

/// Build records for one project directory.
#[derive(Debug, Clone)]
pub struct BuildInfoCache {
    root: PathBuf,
}

impl BuildInfoCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Record path for a (platform, configuration) pair.
    pub fn path_for(
        &self,
        platform: &str,
        configuration: Configuration,
    ) -> Result<PathBuf, InvalidPlatformName> {
        Ok(self.root.join(build_info_relative_path(platform, configuration)?))
    }

    /// Read the record at an explicit path. Missing file gives `None`.
    pub async fn read(path: &Path) -> Result<Option<BuildInfo>, CacheError> {
        let json = match tokio::fs::read_to_string(path).await {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CacheError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_json::from_str(&json)
            .map(Some)
            .map_err(|source| CacheError::Corrupt {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Read the record at `path`, dropping it when it belongs to another key.
    pub async fn read_checked(
        path: &Path,
        platform: &str,
        configuration: Configuration,
    ) -> Result<Option<BuildInfo>, CacheError> {
        match Self::read(path).await? {
            Some(info) if info.matches(platform, configuration) => {
                debug!(platform, %configuration, build = info.build_number, "build record found");
                Ok(Some(info))
            }
            Some(info) => {
                warn!(
                    path = %path.display(),
                    expected_platform = platform,
                    expected_configuration = %configuration,
                    found_platform = %info.platform,
                    found_configuration = %info.configuration,
                    "ignoring build record for a different platform/configuration"
                );
                Ok(None)
            }
            None => {
                debug!(platform, %configuration, "no build record");
                Ok(None)
            }
        }
    }

    /// Look up the last known remote build for a (platform, configuration) pair.
    pub async fn lookup(
        &self,
        platform: &str,
        configuration: Configuration,
    ) -> Result<Option<BuildInfo>, CacheError> {
        let path = self.path_for(platform, configuration)?;
        Self::read_checked(&path, platform, configuration).await
    }

    /// Replace the record for the build's own (platform, configuration) key.
    pub async fn store(&self, info: &BuildInfo) -> Result<PathBuf, CacheError> {
        let path = self.path_for(&info.platform, info.configuration)?;
        Self::write(&path, info).await?;
        Ok(path)
    }

    /// Write a record atomically (write-then-rename).
    pub async fn write(path: &Path, info: &BuildInfo) -> Result<(), CacheError> {
        let io_err = |source| CacheError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(info).map_err(|source| CacheError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;

        let temp_path = path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, json).await.map_err(io_err)?;
        tokio::fs::rename(&temp_path, path).await.map_err(io_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_path_for_layout() {
        let cache = BuildInfoCache::new("/proj");
        assert_eq!(
            cache.path_for("ios", Configuration::Release).unwrap(),
            PathBuf::from("/proj/remote/ios/release/buildInfo.json")
        );
    }

    #[tokio::test]
    async fn test_traversing_platform_never_touches_disk() {
        let dir = TempDir::new().unwrap();
        let cache = BuildInfoCache::new(dir.path().join("proj"));

        assert!(cache.path_for("../outside", Configuration::Debug).is_err());
        let result = cache.store(&BuildInfo::new(1, "../outside", Configuration::Debug)).await;
        assert!(matches!(result, Err(CacheError::InvalidKey(_))));
        assert!(!dir.path().join("outside").exists());
        assert!(matches!(
            cache.lookup("..", Configuration::Debug).await,
            Err(CacheError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn test_lookup_missing_is_none() {
        let dir = TempDir::new().unwrap();
        let cache = BuildInfoCache::new(dir.path());
        assert!(cache.lookup("ios", Configuration::Debug).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_then_lookup() {
        let dir = TempDir::new().unwrap();
        let cache = BuildInfoCache::new(dir.path());
        let info = BuildInfo::new(12, "ios", Configuration::Release).with_status("Complete");

        let path = cache.store(&info).await.unwrap();
        assert_eq!(path, dir.path().join("remote/ios/release/buildInfo.json"));
        assert!(!path.with_extension("json.tmp").exists());

        let found = cache.lookup("ios", Configuration::Release).await.unwrap();
        assert_eq!(found, Some(info));
        assert!(cache.lookup("ios", Configuration::Debug).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_overwrites_wholesale() {
        let dir = TempDir::new().unwrap();
        let cache = BuildInfoCache::new(dir.path());
        let mut first = BuildInfo::new(1, "ios", Configuration::Debug);
        first.web_debug_proxy_port = Some(9000);
        cache.store(&first).await.unwrap();
        cache.store(&BuildInfo::new(2, "ios", Configuration::Debug)).await.unwrap();

        let found = cache.lookup("ios", Configuration::Debug).await.unwrap().unwrap();
        assert_eq!(found.build_number, 2);
        assert_eq!(found.web_debug_proxy_port, None);
    }

    #[tokio::test]
    async fn test_mismatched_record_is_absent() {
        let dir = TempDir::new().unwrap();
        let cache = BuildInfoCache::new(dir.path());
        // A release build copied into the debug slot
        let info = BuildInfo::new(5, "ios", Configuration::Release);
        BuildInfoCache::write(&cache.path_for("ios", Configuration::Debug).unwrap(), &info)
            .await
            .unwrap();

        assert!(cache.lookup("ios", Configuration::Debug).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_record_is_error() {
        let dir = TempDir::new().unwrap();
        let cache = BuildInfoCache::new(dir.path());
        let path = cache.path_for("android", Configuration::Debug).unwrap();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();

        let result = cache.lookup("android", Configuration::Debug).await;
        assert!(matches!(result, Err(CacheError::Corrupt { .. })));
    }
}
