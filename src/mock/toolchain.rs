//! Mock native toolchain.

use std::time::Duration;

use async_trait::async_trait;
use runlane_options::CommandData;

use super::{Call, CallJournal};
use crate::toolchain::{Toolchain, ToolchainError};

#[derive(Debug, Clone)]
pub struct MockToolchain {
    journal: CallJournal,
    version: String,
    targets: Vec<String>,
    installed: Vec<String>,
    run_failure: Option<String>,
    run_delay: Option<Duration>,
}

impl MockToolchain {
    pub fn new(journal: CallJournal) -> Self {
        Self {
            journal,
            version: "12.0.0".to_string(),
            targets: Vec::new(),
            installed: Vec::new(),
            run_failure: None,
            run_delay: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_targets(mut self, targets: &[&str]) -> Self {
        self.targets = targets.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_installed(mut self, platforms: &[&str]) -> Self {
        self.installed = platforms.iter().map(|p| p.to_string()).collect();
        self
    }

    /// Make every `run` fail with `stderr`.
    pub fn failing_run(mut self, stderr: impl Into<String>) -> Self {
        self.run_failure = Some(stderr.into());
        self
    }

    pub fn with_run_delay(mut self, delay: Duration) -> Self {
        self.run_delay = Some(delay);
        self
    }
}

#[async_trait]
impl Toolchain for MockToolchain {
    async fn run(
        &self,
        _command: &CommandData,
        platforms: Option<&[String]>,
    ) -> Result<(), ToolchainError> {
        self.journal.record(Call::ToolchainRun(platforms.map(<[String]>::to_vec)));
        if let Some(delay) = self.run_delay {
            tokio::time::sleep(delay).await;
        }
        match &self.run_failure {
            Some(stderr) => Err(ToolchainError::Failed {
                command: "mock run".to_string(),
                status: "exit status: 1".to_string(),
                stderr: stderr.clone(),
            }),
            None => Ok(()),
        }
    }

    async fn targets(&self, _command: &CommandData) -> Result<Vec<String>, ToolchainError> {
        self.journal.record(Call::Targets);
        Ok(self.targets.clone())
    }

    async fn version(&self) -> Result<String, ToolchainError> {
        self.journal.record(Call::ToolchainVersion);
        Ok(self.version.clone())
    }

    async fn installed_platforms(&self) -> Result<Vec<String>, ToolchainError> {
        self.journal.record(Call::InstalledPlatforms);
        Ok(self.installed.clone())
    }
}
