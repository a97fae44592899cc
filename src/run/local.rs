//! Local run delegate.

use tracing::info;

use super::{RunContext, RunResult};
use crate::platform::explicit_platforms;
use crate::telemetry::TelemetryProperties;

/// Value recorded when the toolchain picks the installed platforms itself.
const INSTALLED: &str = "installed";

/// Hands local platforms to the native toolchain as one batch.
///
/// Both the `--local` branch and the fallback branch go through here.
pub struct LocalRunDelegate {
    context: RunContext,
}

impl LocalRunDelegate {
    pub fn new(context: RunContext) -> Self {
        Self { context }
    }

    /// Run `platforms`, or when `None` the command's explicit platforms,
    /// falling back to whatever is installed.
    pub async fn run(&self, platforms: Option<Vec<String>>) -> RunResult<TelemetryProperties> {
        let recorded = match &platforms {
            Some(names) => names.join(","),
            None => {
                let explicit = explicit_platforms(&self.context.command);
                if explicit.is_empty() {
                    INSTALLED.to_string()
                } else {
                    explicit.join(",")
                }
            }
        };
        info!(platforms = %recorded, "running local platforms");

        self.context
            .toolchain
            .run(&self.context.command, platforms.as_deref())
            .await?;

        Ok(TelemetryProperties::new().with("localRun.platforms", recorded))
    }
}
