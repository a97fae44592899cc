//! Mock remote build server.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use runlane_protocol::{BuildInfo, BuildSettings, ClientOp, RemoteConnectionInfo};

use super::{Call, CallJournal, FailureConfig, FailureInjector};
use crate::cache::{BuildInfoCache, CacheError};
use crate::remote::{RemoteBuildClient, RemoteError};

/// In-process build server.
///
/// Builds are numbered from 1 and recorded in the project's build-info
/// cache, like the helper-backed client does.
#[derive(Debug)]
pub struct MockBuildServer {
    journal: CallJournal,
    next_build: AtomicU64,
    proxy_port: Option<u16>,
    failures: Mutex<FailureInjector>,
}

impl MockBuildServer {
    pub fn new(journal: CallJournal) -> Self {
        Self {
            journal,
            next_build: AtomicU64::new(1),
            proxy_port: None,
            failures: Mutex::new(FailureInjector::new()),
        }
    }

    /// Port reported by every `debug` call.
    pub fn with_proxy_port(mut self, port: u16) -> Self {
        self.proxy_port = Some(port);
        self
    }

    pub fn with_first_build_number(self, number: u64) -> Self {
        self.next_build.store(number, Ordering::SeqCst);
        self
    }

    /// Inject a failure or delay; `platform: None` applies to all platforms.
    pub fn inject(&self, op: ClientOp, platform: Option<&str>, config: FailureConfig) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.inject(op, platform, config);
        }
    }

    async fn gate(&self, op: ClientOp, platform: &str) -> Result<(), RemoteError> {
        let config = self
            .failures
            .lock()
            .ok()
            .and_then(|mut failures| failures.check(op, platform));

        if let Some(config) = config {
            if let Some(delay) = config.delay {
                tokio::time::sleep(delay).await;
            }
            if let Some(error) = config.error {
                return Err(RemoteError::Server(error));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteBuildClient for MockBuildServer {
    async fn check_for_build_on_server(
        &self,
        settings: &BuildSettings,
        cache_path: &Path,
    ) -> Result<Option<BuildInfo>, RemoteError> {
        self.journal.record(Call::CheckBuild(settings.platform.clone()));
        self.gate(ClientOp::CheckBuild, &settings.platform).await?;
        Ok(BuildInfoCache::read_checked(cache_path, &settings.platform, settings.configuration).await?)
    }

    async fn build(&self, settings: &BuildSettings) -> Result<BuildInfo, RemoteError> {
        self.journal.record(Call::Build(settings.platform.clone()));
        self.gate(ClientOp::Build, &settings.platform).await?;
        let cache_path = settings.build_info_path().map_err(CacheError::from)?;

        let number = self.next_build.fetch_add(1, Ordering::SeqCst);
        let info = BuildInfo::new(number, settings.platform.clone(), settings.configuration)
            .with_status("Complete")
            .with_build_target(settings.build_target.clone());
        BuildInfoCache::write(&cache_path, &info).await?;
        Ok(info)
    }

    async fn run(
        &self,
        info: &BuildInfo,
        _connection: &RemoteConnectionInfo,
    ) -> Result<BuildInfo, RemoteError> {
        self.journal.record(Call::Run(info.platform.clone()));
        self.gate(ClientOp::Run, &info.platform).await?;
        Ok(info.clone().with_status("Running"))
    }

    async fn emulate(
        &self,
        info: &BuildInfo,
        _connection: &RemoteConnectionInfo,
        target: &str,
    ) -> Result<BuildInfo, RemoteError> {
        self.journal.record(Call::Emulate {
            platform: info.platform.clone(),
            target: target.to_string(),
        });
        self.gate(ClientOp::Emulate, &info.platform).await?;
        Ok(info.clone().with_status("Emulating"))
    }

    async fn debug(
        &self,
        info: &BuildInfo,
        _connection: &RemoteConnectionInfo,
    ) -> Result<BuildInfo, RemoteError> {
        self.journal.record(Call::Debug(info.platform.clone()));
        self.gate(ClientOp::Debug, &info.platform).await?;
        let mut debugged = info.clone();
        debugged.web_debug_proxy_port = self.proxy_port;
        Ok(debugged)
    }
}
