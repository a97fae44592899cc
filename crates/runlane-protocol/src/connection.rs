//! Remote build-server connection descriptor.

use serde::{Deserialize, Serialize};

/// Endpoint and auth information for one platform's remote build server.
///
/// Loaded from persisted settings, keyed by platform name. The orchestrator
/// only reads it and hands it to the remote client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteConnectionInfo {
    /// Build server hostname or IP address
    pub host: String,

    /// Build server port
    pub port: u16,

    /// Whether the server is reached over TLS with a client certificate
    #[serde(default)]
    pub secure: bool,

    /// Name of the client certificate used for secure connections
    #[serde(default, alias = "cert_name", skip_serializing_if = "Option::is_none")]
    pub cert_name: Option<String>,

    /// Path prefix the build service is mounted under
    #[serde(default, alias = "mount_point", skip_serializing_if = "Option::is_none")]
    pub mount_point: Option<String>,
}

impl RemoteConnectionInfo {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            secure: false,
            cert_name: None,
            mount_point: None,
        }
    }

    /// Base URL of the build service, e.g. `https://mac.local:3000/cordova`.
    pub fn base_url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        let mut url = format!("{}://{}:{}", scheme, self.host, self.port);
        if let Some(mount) = self.mount_point.as_deref().map(|m| m.trim_matches('/')) {
            if !mount.is_empty() {
                url.push('/');
                url.push_str(mount);
            }
        }
        url
    }
}
