//! Persisted settings: UI language and per-platform remote build servers.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use runlane_protocol::RemoteConnectionInfo;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::merge::merge_layers;

/// Language reported to build servers when none is configured.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Settings file name inside each settings directory.
pub const SETTINGS_FILE: &str = "settings.toml";

/// Effective settings for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub language: Option<String>,

    /// Remote build server per platform name
    #[serde(default, alias = "remotePlatforms")]
    pub remote_platforms: BTreeMap<String, RemoteConnectionInfo>,
}

impl Settings {
    /// Configured language, or [`DEFAULT_LANGUAGE`].
    pub fn language(&self) -> &str {
        self.language.as_deref().unwrap_or(DEFAULT_LANGUAGE)
    }

    /// Build server for the platform. Platform names match case-insensitively;
    /// an exact key wins over one differing only in case.
    pub fn remote_connection(&self, platform: &str) -> Option<&RemoteConnectionInfo> {
        self.remote_platforms.get(platform).or_else(|| {
            self.remote_platforms
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(platform))
                .map(|(_, connection)| connection)
        })
    }

    /// Whether a remote build server is configured for the platform.
    pub fn is_remote(&self, platform: &str) -> bool {
        self.remote_connection(platform).is_some()
    }

    /// Lower-cased names of all platforms with a remote build server, sorted.
    pub fn remote_platform_names(&self) -> Vec<String> {
        self.remote_platforms
            .keys()
            .map(|name| name.to_ascii_lowercase())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Errors that can occur when loading settings
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid settings: {0}")]
    Invalid(#[from] serde_json::Error),

    #[error("No settings found (looked in: {})", display_paths(.0))]
    NotFound(Vec<PathBuf>),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Source of persisted settings.
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    /// Load settings, failing when none exist.
    async fn load(&self) -> Result<Settings, ConfigError>;

    /// Load settings, falling back to the empty structure on any failure.
    async fn load_or_empty(&self) -> Settings {
        match self.load().await {
            Ok(settings) => settings,
            Err(ConfigError::NotFound(paths)) => {
                debug!(searched = %display_paths(&paths), "no settings found, using empty settings");
                Settings::default()
            }
            Err(e) => {
                warn!(error = %e, "ignoring unreadable settings");
                Settings::default()
            }
        }
    }
}

/// Layered TOML settings on disk.
///
/// The user layer (`$RUNLANE_HOME/settings.toml`, else
/// `~/.config/runlane/settings.toml`) is overlaid by the project layer
/// (`<project>/.runlane/settings.toml`).
#[derive(Debug, Clone)]
pub struct FileSettingsProvider {
    user_path: Option<PathBuf>,
    project_path: Option<PathBuf>,
}

impl FileSettingsProvider {
    /// Provider using the default user layer and the project's layer.
    pub fn new(project_dir: &Path) -> Self {
        Self {
            user_path: Self::default_user_path(),
            project_path: Some(project_dir.join(".runlane").join(SETTINGS_FILE)),
        }
    }

    /// Replace the user layer with an explicit file.
    pub fn with_user_path(mut self, path: PathBuf) -> Self {
        self.user_path = Some(path);
        self
    }

    /// Default user settings path, if a home directory is known.
    pub fn default_user_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("RUNLANE_HOME") {
            return Some(PathBuf::from(home).join(SETTINGS_FILE));
        }
        std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(".config/runlane").join(SETTINGS_FILE))
    }

    fn layer_paths(&self) -> Vec<PathBuf> {
        self.user_path
            .iter()
            .chain(self.project_path.iter())
            .cloned()
            .collect()
    }

    async fn read_layer(path: &Path) -> Result<Option<serde_json::Value>, ConfigError> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let value: toml::Value = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Some(serde_json::to_value(value)?))
    }
}

#[async_trait]
impl SettingsProvider for FileSettingsProvider {
    async fn load(&self) -> Result<Settings, ConfigError> {
        let paths = self.layer_paths();
        let mut layers = Vec::new();
        for path in &paths {
            if let Some(layer) = Self::read_layer(path).await? {
                debug!(path = %path.display(), "loaded settings layer");
                layers.push(layer);
            }
        }

        if layers.is_empty() {
            return Err(ConfigError::NotFound(paths));
        }

        Ok(serde_json::from_value(merge_layers(layers))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const USER: &str = r#"
language = "fr"

[remote_platforms.ios]
host = "mac.local"
port = 3000
secure = true
cert_name = "dev-cert"
"#;

    fn provider(dir: &TempDir) -> FileSettingsProvider {
        FileSettingsProvider::new(dir.path()).with_user_path(dir.path().join("user.toml"))
    }

    #[tokio::test]
    async fn test_load_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let result = provider(&dir).load().await;
        assert!(matches!(result, Err(ConfigError::NotFound(ref paths)) if paths.len() == 2));
    }

    #[tokio::test]
    async fn test_load_or_empty_on_missing() {
        let dir = TempDir::new().unwrap();
        let settings = provider(&dir).load_or_empty().await;
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.language(), DEFAULT_LANGUAGE);
    }

    #[tokio::test]
    async fn test_load_user_layer() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("user.toml"), USER).unwrap();

        let settings = provider(&dir).load().await.unwrap();
        assert_eq!(settings.language(), "fr");
        let ios = settings.remote_connection("ios").unwrap();
        assert_eq!(ios.port, 3000);
        assert_eq!(ios.cert_name.as_deref(), Some("dev-cert"));
        assert!(settings.is_remote("ios"));
        assert!(!settings.is_remote("android"));
    }

    #[tokio::test]
    async fn test_project_layer_overrides_user_layer() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("user.toml"), USER).unwrap();
        fs::create_dir_all(dir.path().join(".runlane")).unwrap();
        fs::write(
            dir.path().join(".runlane/settings.toml"),
            "[remote_platforms.ios]\nport = 3100\n\n[remote_platforms.windows]\nhost = \"win\"\nport = 8080\n",
        )
        .unwrap();

        let settings = provider(&dir).load().await.unwrap();
        assert_eq!(settings.language(), "fr");
        assert_eq!(settings.remote_connection("ios").unwrap().host, "mac.local");
        assert_eq!(settings.remote_connection("ios").unwrap().port, 3100);
        assert_eq!(settings.remote_platform_names(), vec!["ios", "windows"]);
    }

    #[tokio::test]
    async fn test_camel_case_remote_platforms_alias() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("user.toml"),
            "[remotePlatforms.ios]\nhost = \"mac\"\nport = 1\n",
        )
        .unwrap();
        let settings = provider(&dir).load().await.unwrap();
        assert!(settings.is_remote("ios"));
    }

    #[tokio::test]
    async fn test_parse_error_is_reported_but_load_or_empty_recovers() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("user.toml"), "remote_platforms = [").unwrap();

        let p = provider(&dir);
        assert!(matches!(p.load().await, Err(ConfigError::Parse { .. })));
        assert_eq!(p.load_or_empty().await, Settings::default());
    }

    #[tokio::test]
    async fn test_platform_keys_match_case_insensitively() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("user.toml"),
            "[remote_platforms.iOS]\nhost = \"mac\"\nport = 1\n\n[remote_platforms.ios]\nhost = \"exact\"\nport = 2\n\n[remote_platforms.Windows]\nhost = \"win\"\nport = 3\n",
        )
        .unwrap();

        let settings = provider(&dir).load().await.unwrap();
        assert!(settings.is_remote("windows"));
        assert!(settings.is_remote("WINDOWS"));
        assert_eq!(settings.remote_connection("windows").unwrap().host, "win");
        assert_eq!(settings.remote_connection("ios").unwrap().host, "exact");
        assert_eq!(settings.remote_connection("iOS").unwrap().host, "mac");
        assert_eq!(settings.remote_platform_names(), vec!["ios", "windows"]);
    }
}
