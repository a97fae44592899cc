//! Execution mode dispatch and concurrent platform join.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::try_join_all;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use runlane_options::CommandData;

use super::{
    ExecutionMode, LocalRunDelegate, RemoteRunSequencer, RunContext, RunError, RunResult,
};
use crate::config::SettingsProvider;
use crate::output::OutputSink;
use crate::platform::{
    needs_installed_platforms, partition, resolve_platforms, Location, Platform, PlatformCleaner,
};
use crate::remote::RemoteBuildClient;
use crate::telemetry::{aggregate, store_platforms, TelemetryProperties, ACTUALLY_BUILT};
use crate::toolchain::Toolchain;

/// What a finished invocation produced.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// `--list`: the available run targets
    Targets(Vec<String>),
    /// Every platform task finished; aggregated telemetry
    Completed(TelemetryProperties),
}

/// External collaborators the dispatcher drives.
#[derive(Clone)]
pub struct Collaborators {
    pub settings: Arc<dyn SettingsProvider>,
    pub toolchain: Arc<dyn Toolchain>,
    pub remote: Arc<dyn RemoteBuildClient>,
    pub cleaner: Arc<dyn PlatformCleaner>,
    pub output: Arc<dyn OutputSink>,
}

type PlatformTask = JoinHandle<RunResult<TelemetryProperties>>;

/// Entry point of a `run` invocation.
pub struct Dispatcher {
    project_dir: PathBuf,
    collaborators: Collaborators,
}

impl Dispatcher {
    pub fn new(project_dir: impl Into<PathBuf>, collaborators: Collaborators) -> Self {
        Self {
            project_dir: project_dir.into(),
            collaborators,
        }
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Validate options, pick the execution mode and run it to completion.
    pub async fn run(&self, command: &CommandData) -> RunResult<RunOutcome> {
        runlane_options::validate(command)?;

        let mode = ExecutionMode::select(command);
        info!(mode = %mode, "dispatching run");

        let telemetry = match mode {
            ExecutionMode::Targets => {
                let targets = self.collaborators.toolchain.targets(command).await?;
                return Ok(RunOutcome::Targets(targets));
            }
            ExecutionMode::Remote => self.run_remote(&self.context(command).await).await?,
            ExecutionMode::Local => self.run_local(&self.context(command).await).await?,
            ExecutionMode::Fallback => self.run_fallback(&self.context(command).await).await?,
        };
        debug!(properties = telemetry.len(), "run telemetry aggregated");
        Ok(RunOutcome::Completed(telemetry))
    }

    async fn context(&self, command: &CommandData) -> RunContext {
        let settings = self.collaborators.settings.load_or_empty().await;
        RunContext {
            project_dir: self.project_dir.clone(),
            command: Arc::new(command.clone()),
            settings: Arc::new(settings),
            toolchain: Arc::clone(&self.collaborators.toolchain),
            remote: Arc::clone(&self.collaborators.remote),
            output: Arc::clone(&self.collaborators.output),
        }
    }

    async fn resolve(&self, context: &RunContext) -> RunResult<Vec<Platform>> {
        let installed = if needs_installed_platforms(&context.command) {
            context.toolchain.installed_platforms().await?
        } else {
            Vec::new()
        };
        let platforms = resolve_platforms(&context.command, &context.settings, &installed)?;
        debug!(count = platforms.len(), "resolved platforms");
        Ok(platforms)
    }

    /// Clean before anything is built; resolves platforms when none are given.
    async fn clean_if_requested(
        &self,
        context: &RunContext,
        resolved: Option<&[Platform]>,
    ) -> RunResult<()> {
        if !context.command.flag("clean") {
            return Ok(());
        }
        let fresh;
        let platforms = match resolved {
            Some(platforms) => platforms,
            None => {
                fresh = self.resolve(context).await?;
                &fresh
            }
        };
        info!(count = platforms.len(), "cleaning platforms");
        self.collaborators
            .cleaner
            .clean_platforms(platforms, &context.command)
            .await?;
        Ok(())
    }

    async fn run_remote(&self, context: &RunContext) -> RunResult<TelemetryProperties> {
        debug_assert!(!context.command.flag("local"));
        let platforms = self.resolve(context).await?;
        let seed = store_platforms(ACTUALLY_BUILT, &platforms, &context.settings);
        self.clean_if_requested(context, Some(&platforms)).await?;

        let tasks = platforms
            .iter()
            .map(|platform| {
                assert_eq!(
                    platform.location,
                    Location::Remote,
                    "--remote resolved a local platform: {}",
                    platform.name
                );
                spawn_remote(context.clone(), platform.name.clone())
            })
            .collect();

        let outcomes = join_fail_fast(tasks).await?;
        Ok(aggregate(seed.merge(outcomes.into_iter().collect()), &context.command, &context.settings))
    }

    async fn run_local(&self, context: &RunContext) -> RunResult<TelemetryProperties> {
        debug_assert!(!context.command.flag("remote"));
        self.clean_if_requested(context, None).await?;
        let outcome = LocalRunDelegate::new(context.clone()).run(None).await?;
        Ok(aggregate(outcome, &context.command, &context.settings))
    }

    async fn run_fallback(&self, context: &RunContext) -> RunResult<TelemetryProperties> {
        let platforms = self.resolve(context).await?;
        let seed = store_platforms(ACTUALLY_BUILT, &platforms, &context.settings);
        self.clean_if_requested(context, Some(&platforms)).await?;

        let (local, remote) = partition(&platforms);
        info!(local = local.len(), remote = remote.len(), "running mixed platforms");

        let mut tasks = Vec::with_capacity(remote.len() + 1);
        if !local.is_empty() {
            tasks.push(spawn_local(context.clone(), local));
        }
        tasks.extend(remote.into_iter().map(|name| spawn_remote(context.clone(), name)));

        let outcomes = join_fail_fast(tasks).await?;
        Ok(aggregate(seed.merge(outcomes.into_iter().collect()), &context.command, &context.settings))
    }
}

fn spawn_remote(context: RunContext, platform: String) -> PlatformTask {
    tokio::spawn(async move {
        let outcome = RemoteRunSequencer::new(context, platform).run().await?;
        Ok(outcome.telemetry)
    })
}

fn spawn_local(context: RunContext, platforms: Vec<String>) -> PlatformTask {
    tokio::spawn(async move { LocalRunDelegate::new(context).run(Some(platforms)).await })
}

/// Wait for every task, or return the first error observed.
///
/// Remaining tasks are detached, not aborted.
async fn join_fail_fast(tasks: Vec<PlatformTask>) -> RunResult<Vec<TelemetryProperties>> {
    try_join_all(tasks.into_iter().map(|task| async move {
        match task.await {
            Ok(result) => result,
            Err(err) => Err(RunError::Task(err.to_string())),
        }
    }))
    .await
}
