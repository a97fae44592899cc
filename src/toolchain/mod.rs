//! Native build toolchain
//!
//! The local counterpart of the remote build server. Runs, lists targets,
//! reports its version, and discovers platforms installed in the project.
//! The orchestrator only talks to it through [`Toolchain`].

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use runlane_options::CommandData;
use tokio::process::Command;
use tracing::{debug, info};

/// Default native toolchain executable.
pub const DEFAULT_PROGRAM: &str = "cordova";

/// Toolchain errors
#[derive(Debug, thiserror::Error)]
pub enum ToolchainError {
    /// Toolchain could not be started
    #[error("Failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Toolchain ran but reported failure
    #[error("`{command}` exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },

    /// Project platform directory could not be read
    #[error("Failed to list installed platforms in {path}: {source}")]
    Platforms {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Native build toolchain collaborator.
#[async_trait]
pub trait Toolchain: Send + Sync {
    /// Build and run locally.
    ///
    /// `None` lets the toolchain infer the installed platforms itself.
    async fn run(
        &self,
        command: &CommandData,
        platforms: Option<&[String]>,
    ) -> Result<(), ToolchainError>;

    /// Enumerate available run targets (devices and emulators).
    async fn targets(&self, command: &CommandData) -> Result<Vec<String>, ToolchainError>;

    /// Installed toolchain version, forwarded to remote builds.
    async fn version(&self) -> Result<String, ToolchainError>;

    /// Platforms installed in the project, sorted.
    async fn installed_platforms(&self) -> Result<Vec<String>, ToolchainError>;
}

/// Toolchain driven through its command-line executable.
#[derive(Debug, Clone)]
pub struct NativeToolchain {
    program: String,
    project_dir: PathBuf,
}

impl NativeToolchain {
    pub fn new(program: impl Into<String>, project_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            project_dir: project_dir.into(),
        }
    }

    /// Arguments for `run`, translated from the run options.
    ///
    /// Without a platform list the command's own platform arguments are
    /// forwarded, leaving the toolchain to pick installed platforms only
    /// when none were named.
    pub fn run_args(command: &CommandData, platforms: Option<&[String]>) -> Vec<String> {
        let mut args = vec!["run".to_string()];
        match platforms {
            Some(platforms) => args.extend(platforms.iter().cloned()),
            None => args.extend(command.platform_args().into_iter().map(String::from)),
        }

        for flag in ["debug", "release", "device", "emulator", "nobuild"] {
            if command.flag(flag) {
                args.push(format!("--{flag}"));
            }
        }
        if let Some(target) = command.value("target") {
            args.push(format!("--target={target}"));
        }

        args.extend(command.passthrough_options());
        args
    }

    /// Arguments for target enumeration, restricted to explicit platforms.
    pub fn targets_args(command: &CommandData) -> Vec<String> {
        let mut args = vec!["run".to_string()];
        args.extend(command.platform_args().into_iter().map(String::from));
        args.push("--list".to_string());
        for flag in ["device", "emulator"] {
            if command.flag(flag) {
                args.push(format!("--{flag}"));
            }
        }
        args
    }

    fn describe(&self, args: &[String]) -> String {
        std::iter::once(self.program.as_str())
            .chain(args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run the toolchain, inheriting stdout/stderr so build output streams through.
    async fn spawn_inherit(&self, args: &[String]) -> Result<(), ToolchainError> {
        debug!(command = %self.describe(args), "invoking toolchain");
        let status = Command::new(&self.program)
            .args(args)
            .current_dir(&self.project_dir)
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|source| ToolchainError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(ToolchainError::Failed {
                command: self.describe(args),
                status: status.to_string(),
                stderr: String::new(),
            });
        }
        Ok(())
    }

    /// Run the toolchain and capture its stdout.
    async fn spawn_capture(&self, args: &[String]) -> Result<String, ToolchainError> {
        debug!(command = %self.describe(args), "invoking toolchain");
        let output = Command::new(&self.program)
            .args(args)
            .current_dir(&self.project_dir)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| ToolchainError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ToolchainError::Failed {
                command: self.describe(args),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Non-empty, trimmed lines of toolchain output.
pub fn parse_target_lines(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

#[async_trait]
impl Toolchain for NativeToolchain {
    async fn run(
        &self,
        command: &CommandData,
        platforms: Option<&[String]>,
    ) -> Result<(), ToolchainError> {
        let args = Self::run_args(command, platforms);
        self.spawn_inherit(&args).await?;
        info!(platforms = ?platforms, "local run finished");
        Ok(())
    }

    async fn targets(&self, command: &CommandData) -> Result<Vec<String>, ToolchainError> {
        let stdout = self.spawn_capture(&Self::targets_args(command)).await?;
        Ok(parse_target_lines(&stdout))
    }

    async fn version(&self) -> Result<String, ToolchainError> {
        let stdout = self.spawn_capture(&["--version".to_string()]).await?;
        Ok(stdout.trim().to_string())
    }

    async fn installed_platforms(&self) -> Result<Vec<String>, ToolchainError> {
        let dir = self.project_dir.join("platforms");
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(ToolchainError::Platforms { path: dir, source }),
        };

        let mut platforms = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(source) => return Err(ToolchainError::Platforms { path: dir, source }),
            };
            let is_dir = entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false);
            if is_dir {
                platforms.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        platforms.sort();
        Ok(platforms)
    }
}
