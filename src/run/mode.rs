//! Execution mode selection.

use std::fmt;

use runlane_options::CommandData;

/// Top-level strategy for one invocation, chosen by first match:
/// `--list`, then `--remote`, then `--local`, otherwise fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Enumerate run targets; builds and runs nothing
    Targets,
    /// Every resolved platform runs on its remote build server
    Remote,
    /// The toolchain runs whatever is installed locally
    Local,
    /// Mixed: local platforms as one batch, each remote platform on its own
    Fallback,
}

impl ExecutionMode {
    pub fn select(command: &CommandData) -> Self {
        if command.flag("list") {
            ExecutionMode::Targets
        } else if command.flag("remote") {
            ExecutionMode::Remote
        } else if command.flag("local") {
            ExecutionMode::Local
        } else {
            ExecutionMode::Fallback
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::Targets => "targets",
            ExecutionMode::Remote => "remote",
            ExecutionMode::Local => "local",
            ExecutionMode::Fallback => "fallback",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
