//! Runlane CLI
//!
//! Entry point for the `runlane` command-line tool.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use runlane::run::{Collaborators, Dispatcher, RunError, RunOutcome};
use runlane::toolchain::DEFAULT_PROGRAM;
use runlane::{
    parse_args, BuildInfoCache, FileSettingsProvider, FsPlatformCleaner, NativeToolchain,
    OutputSink, ProcessBuildClient, StdoutSink,
};
use runlane_protocol::Configuration;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

/// Helper executable that speaks the remote build client protocol.
const DEFAULT_REMOTE_CLIENT: &str = "runlane-remote";

#[derive(Parser)]
#[command(name = "runlane")]
#[command(about = "Run a mobile app locally or on remote build servers", version)]
struct Cli {
    /// Log at debug level (overrides RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build (or reuse) and run the app for one or more platforms
    Run {
        /// User settings file (default: $RUNLANE_HOME/settings.toml)
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Project directory (default: current directory)
        #[arg(long)]
        project: Option<PathBuf>,

        /// Native toolchain executable
        #[arg(long, default_value = DEFAULT_PROGRAM)]
        toolchain: String,

        /// Remote build client helper executable
        #[arg(long, default_value = DEFAULT_REMOTE_CLIENT)]
        remote_client: String,

        /// Platforms and run options, e.g. `ios --remote --device`
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Print where the remote build record for a platform is kept
    CachePath {
        platform: String,

        /// Release configuration instead of debug
        #[arg(long)]
        release: bool,

        /// Project directory (default: current directory)
        #[arg(long)]
        project: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let code = match cli.command {
        Commands::Run {
            settings,
            project,
            toolchain,
            remote_client,
            args,
        } => run(settings, project, toolchain, remote_client, args).await,
        Commands::CachePath {
            platform,
            release,
            project,
        } => cache_path(&platform, release, project),
    };
    process::exit(code);
}

/// Logs go to stderr; stdout carries only user-facing lines.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn project_dir(project: Option<PathBuf>) -> Result<PathBuf, std::io::Error> {
    match project {
        Some(dir) => Ok(dir),
        None => std::env::current_dir(),
    }
}

async fn run(
    settings_path: Option<PathBuf>,
    project: Option<PathBuf>,
    toolchain: String,
    remote_client: String,
    args: Vec<String>,
) -> i32 {
    let project_dir = match project_dir(project) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Error: cannot determine project directory: {}", e);
            return 1;
        }
    };

    let command = match parse_args(&args) {
        Ok(command) => command,
        Err(e) => return report(RunError::from(e)),
    };

    let mut settings = FileSettingsProvider::new(&project_dir);
    if let Some(path) = settings_path {
        settings = settings.with_user_path(path);
    }

    let output: Arc<dyn OutputSink> = Arc::new(StdoutSink);
    let dispatcher = Dispatcher::new(
        project_dir.clone(),
        Collaborators {
            settings: Arc::new(settings),
            toolchain: Arc::new(NativeToolchain::new(toolchain, project_dir.clone())),
            remote: Arc::new(ProcessBuildClient::new(remote_client)),
            cleaner: Arc::new(FsPlatformCleaner::new(project_dir.clone())),
            output: Arc::clone(&output),
        },
    );

    match dispatcher.run(&command).await {
        Ok(RunOutcome::Targets(targets)) => {
            for target in &targets {
                output.line(target);
            }
            0
        }
        Ok(RunOutcome::Completed(telemetry)) => {
            match serde_json::to_string(&telemetry) {
                Ok(json) => debug!(telemetry = %json, "run completed"),
                Err(e) => debug!(error = %e, "run completed, telemetry not serializable"),
            }
            0
        }
        Err(e) => report(e),
    }
}

fn report(err: RunError) -> i32 {
    error!(error = %err, "run failed");
    eprintln!("Error: {}", err);
    err.exit_code()
}

fn cache_path(platform: &str, release: bool, project: Option<PathBuf>) -> i32 {
    let project_dir = match project_dir(project) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Error: cannot determine project directory: {}", e);
            return 1;
        }
    };
    let cache = BuildInfoCache::new(project_dir);
    match cache.path_for(&platform.to_lowercase(), Configuration::from_release_flag(release)) {
        Ok(path) => {
            println!("{}", path.display());
            0
        }
        Err(e) => report(RunError::PlatformResolution(e.into())),
    }
}
