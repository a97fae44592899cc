//! Fixed settings provider.

use async_trait::async_trait;
use runlane_protocol::RemoteConnectionInfo;

use crate::config::{ConfigError, Settings, SettingsProvider};

/// Serves the same settings on every load.
#[derive(Debug, Clone, Default)]
pub struct StaticSettingsProvider {
    settings: Settings,
}

impl StaticSettingsProvider {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Add a build server for `platform`.
    pub fn with_remote(mut self, platform: &str, connection: RemoteConnectionInfo) -> Self {
        self.settings
            .remote_platforms
            .insert(platform.to_string(), connection);
        self
    }
}

#[async_trait]
impl SettingsProvider for StaticSettingsProvider {
    async fn load(&self) -> Result<Settings, ConfigError> {
        Ok(self.settings.clone())
    }
}
