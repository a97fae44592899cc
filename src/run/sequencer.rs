//! Remote run sequence for one platform.
//!
//! `ResolveBuild → Execute → (Debug) → Done`. Transitions are plain
//! functions over [`SequenceState`]; the async driver only performs the
//! collaborator call for the current state and feeds the result back in.
//! Any failing call ends the sequence for this platform without retry.

use tracing::{debug, info};

use runlane_options::CommandData;
use runlane_protocol::{BuildInfo, BuildSettings, Configuration, RemoteConnectionInfo, BUILD_COMMAND};

use super::{RunContext, RunError, RunResult, PROGRAM_NAME};
use crate::output::DebugProxyLine;
use crate::platform::PlatformError;
use crate::telemetry::{TelemetryProperties, TelemetryValue};

/// How a finished build is launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    Device,
    Emulator,
}

impl RunKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunKind::Device => "device",
            RunKind::Emulator => "emulator",
        }
    }
}

/// Decisions for one remote platform, fixed before any call is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRunPlan {
    pub platform: String,
    pub configuration: Configuration,
    /// Empty, `"device"`, or the explicit `--target`
    pub build_target: String,
    /// Target handed to the emulator; empty lets the server choose
    pub emulator_target: String,
    pub run_kind: RunKind,
    /// Reuse the cached build instead of submitting one (`--nobuild`)
    pub reuse_build: bool,
    /// Attach the debugger after launching (`--debuginfo`)
    pub attach_debugger: bool,
}

impl RemoteRunPlan {
    pub fn from_command(platform: impl Into<String>, command: &CommandData) -> Self {
        let build_target = match command.value("target") {
            Some(target) => target.to_string(),
            None if command.flag("device") => "device".to_string(),
            None => String::new(),
        };
        // Emulate unless a device run was asked for, same as local runs
        let run_kind = if command.flag("device") {
            RunKind::Device
        } else {
            RunKind::Emulator
        };

        Self {
            platform: platform.into(),
            configuration: Configuration::from_release_flag(command.flag("release")),
            build_target,
            emulator_target: command.value("target").unwrap_or_default().to_string(),
            run_kind,
            reuse_build: command.flag("nobuild"),
            attach_debugger: command.flag("debuginfo"),
        }
    }

    /// Next state once a build is available.
    pub fn after_resolve(&self, info: BuildInfo) -> SequenceState {
        SequenceState::Execute(info)
    }

    /// Next state once the build was launched.
    pub fn after_execute(&self, info: BuildInfo) -> SequenceState {
        if self.attach_debugger {
            SequenceState::Debug(info)
        } else {
            SequenceState::Done(info)
        }
    }

    /// Next state once the debugger is attached.
    pub fn after_debug(&self, info: BuildInfo) -> SequenceState {
        SequenceState::Done(info)
    }

    pub fn build_settings(
        &self,
        context: &RunContext,
        connection: &RemoteConnectionInfo,
        toolchain_version: String,
    ) -> BuildSettings {
        BuildSettings {
            source_dir: context.project_dir.clone(),
            server_info: connection.clone(),
            build_command: BUILD_COMMAND.to_string(),
            platform: self.platform.clone(),
            configuration: self.configuration,
            build_target: self.build_target.clone(),
            language: context.settings.language().to_string(),
            toolchain_version,
            extra_options: context.command.passthrough_options(),
        }
    }
}

/// Where one platform's sequence currently stands.
#[derive(Debug, Clone, PartialEq)]
pub enum SequenceState {
    ResolveBuild,
    Execute(BuildInfo),
    Debug(BuildInfo),
    Done(BuildInfo),
}

impl SequenceState {
    pub fn name(&self) -> &'static str {
        match self {
            SequenceState::ResolveBuild => "resolve_build",
            SequenceState::Execute(_) => "execute",
            SequenceState::Debug(_) => "debug",
            SequenceState::Done(_) => "done",
        }
    }
}

/// The `build` invocation that would produce the build `--nobuild` looked for.
///
/// Echoes `--remote`, `--release` and the original unparsed arguments.
pub fn build_command_hint(command: &CommandData) -> String {
    let mut parts = vec![PROGRAM_NAME.to_string(), BUILD_COMMAND.to_string()];
    if command.flag("remote") {
        parts.push("--remote".to_string());
    }
    if command.flag("release") {
        parts.push("--release".to_string());
    }
    parts.extend(command.remainder.iter().cloned());
    parts.join(" ")
}

/// Result of one finished remote sequence.
#[derive(Debug, Clone)]
pub struct RemoteRunOutcome {
    pub platform: String,
    pub build_info: BuildInfo,
    pub telemetry: TelemetryProperties,
}

/// Drives one remote platform through its sequence.
pub struct RemoteRunSequencer {
    context: RunContext,
    plan: RemoteRunPlan,
}

impl RemoteRunSequencer {
    pub fn new(context: RunContext, platform: impl Into<String>) -> Self {
        let plan = RemoteRunPlan::from_command(platform, &context.command);
        Self { context, plan }
    }

    pub fn plan(&self) -> &RemoteRunPlan {
        &self.plan
    }

    pub async fn run(self) -> RunResult<RemoteRunOutcome> {
        let platform = self.plan.platform.clone();
        let connection = self
            .context
            .settings
            .remote_connection(&platform)
            .cloned()
            .ok_or_else(|| RunError::RemotePlatformNotKnown(platform.clone()))?;

        let mut state = SequenceState::ResolveBuild;
        loop {
            debug!(platform = %platform, state = state.name(), "remote run step");
            state = match state {
                SequenceState::ResolveBuild => {
                    let info = self.resolve_build(&connection).await?;
                    self.plan.after_resolve(info)
                }
                SequenceState::Execute(info) => {
                    let info = self.execute(&info, &connection).await?;
                    self.plan.after_execute(info)
                }
                SequenceState::Debug(info) => {
                    let info = self.attach_debugger(&info, &connection).await?;
                    self.plan.after_debug(info)
                }
                SequenceState::Done(info) => return Ok(self.finish(info)),
            };
        }
    }

    async fn resolve_build(&self, connection: &RemoteConnectionInfo) -> RunResult<BuildInfo> {
        let version = self.context.toolchain.version().await?;
        let settings = self.plan.build_settings(&self.context, connection, version);

        if !self.plan.reuse_build {
            info!(
                platform = %self.plan.platform,
                configuration = %self.plan.configuration,
                server = %connection.base_url(),
                "submitting remote build"
            );
            return Ok(self.context.remote.build(&settings).await?);
        }

        let cache_path = settings.build_info_path().map_err(PlatformError::from)?;
        match self
            .context
            .remote
            .check_for_build_on_server(&settings, &cache_path)
            .await?
        {
            Some(info) => {
                info!(
                    platform = %self.plan.platform,
                    build_number = info.build_number,
                    "reusing remote build"
                );
                Ok(info)
            }
            None => Err(RunError::NoRemoteBuildFound {
                command: build_command_hint(&self.context.command),
            }),
        }
    }

    async fn execute(
        &self,
        info: &BuildInfo,
        connection: &RemoteConnectionInfo,
    ) -> RunResult<BuildInfo> {
        let remote = &self.context.remote;
        let (launched, message) = match self.plan.run_kind {
            RunKind::Device => (
                remote.run(info, connection).await?,
                format!("Successfully ran {} on the remote device", self.plan.platform),
            ),
            RunKind::Emulator => (
                remote
                    .emulate(info, connection, &self.plan.emulator_target)
                    .await?,
                format!("Successfully launched {} in the remote emulator", self.plan.platform),
            ),
        };
        info!(platform = %self.plan.platform, mode = self.plan.run_kind.as_str(), "remote run succeeded");
        self.context.output.line(&message);
        Ok(launched)
    }

    async fn attach_debugger(
        &self,
        info: &BuildInfo,
        connection: &RemoteConnectionInfo,
    ) -> RunResult<BuildInfo> {
        let debugged = self.context.remote.debug(info, connection).await?;
        match debugged.web_debug_proxy_port {
            Some(port) => {
                info!(platform = %self.plan.platform, port, "debugger attached");
                let line = DebugProxyLine {
                    web_debug_proxy_port: port,
                };
                self.context.output.line(&line.render());
            }
            None => debug!(platform = %self.plan.platform, "debugger attached without proxy port"),
        }
        Ok(debugged)
    }

    fn finish(self, info: BuildInfo) -> RemoteRunOutcome {
        let prefix = format!("remoteRun.{}", self.plan.platform);
        let target = if self.context.command.value("target").is_some() {
            TelemetryValue::pii(&self.plan.build_target)
        } else {
            TelemetryValue::plain(self.plan.build_target.clone())
        };
        let telemetry = TelemetryProperties::new()
            .with(format!("{prefix}.configuration"), self.plan.configuration.as_str())
            .with_value(format!("{prefix}.buildTarget"), target)
            .with(format!("{prefix}.mode"), self.plan.run_kind.as_str())
            .with(format!("{prefix}.reusedBuild"), self.plan.reuse_build.to_string())
            .with(format!("{prefix}.debuggerAttached"), self.plan.attach_debugger.to_string())
            .with(format!("{prefix}.buildNumber"), info.build_number.to_string());

        RemoteRunOutcome {
            platform: self.plan.platform,
            build_info: info,
            telemetry,
        }
    }
}
