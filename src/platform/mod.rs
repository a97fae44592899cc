//! Platform resolution
//!
//! Decides which platforms a run acts on and where each one runs:
//! - Explicit platform arguments win, in the order given
//! - Otherwise installed platforms and/or configured remote platforms
//! - `--remote` / `--local` force the location; otherwise a platform is
//!   remote exactly when settings name a build server for it

mod clean;

pub use clean::{CleanError, FsPlatformCleaner, PlatformCleaner};

use std::fmt;

use runlane_options::CommandData;
use runlane_protocol::{validate_platform_name, InvalidPlatformName};
use serde::{Deserialize, Serialize};

use crate::config::Settings;

/// Where a platform is built and run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Local,
    Remote,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Local => f.write_str("local"),
            Location::Remote => f.write_str("remote"),
        }
    }
}

/// A platform to act on and its location, fixed for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    pub name: String,
    pub location: Location,
}

impl Platform {
    pub fn new(name: impl Into<String>, location: Location) -> Self {
        Self {
            name: name.into(),
            location,
        }
    }

    pub fn local(name: impl Into<String>) -> Self {
        Self::new(name, Location::Local)
    }

    pub fn remote(name: impl Into<String>) -> Self {
        Self::new(name, Location::Remote)
    }

    pub fn is_remote(&self) -> bool {
        self.location == Location::Remote
    }
}

/// Platform resolution errors
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("No platforms to run: add a platform to the project, configure a remote platform, or name one explicitly")]
    NoPlatforms,

    #[error("Invalid platform name '{0}': platform names cannot contain path separators or be '.' or '..'")]
    InvalidName(String),
}

impl From<InvalidPlatformName> for PlatformError {
    fn from(err: InvalidPlatformName) -> Self {
        PlatformError::InvalidName(err.0)
    }
}

/// Whether resolving platforms for this command needs the installed platform list.
///
/// Explicit platform arguments, or `--remote` (which only considers
/// configured build servers), make the lookup unnecessary.
pub fn needs_installed_platforms(command: &CommandData) -> bool {
    command.platform_args().is_empty() && !command.flag("remote")
}

/// Location a platform runs at for this command.
pub fn classify(name: &str, command: &CommandData, settings: &Settings) -> Location {
    if command.flag("remote") {
        Location::Remote
    } else if command.flag("local") {
        Location::Local
    } else if settings.is_remote(name) {
        Location::Remote
    } else {
        Location::Local
    }
}

/// Platforms named explicitly on the command line, lower-cased and de-duplicated.
pub fn explicit_platforms(command: &CommandData) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for arg in command.platform_args() {
        let name = arg.to_ascii_lowercase();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// Resolve the ordered platform set for a command.
///
/// `installed` is the project's installed platform list; it is only
/// consulted when no platform was named explicitly.
pub fn resolve_platforms(
    command: &CommandData,
    settings: &Settings,
    installed: &[String],
) -> Result<Vec<Platform>, PlatformError> {
    let mut names = explicit_platforms(command);

    if names.is_empty() {
        if command.flag("remote") {
            names = settings.remote_platform_names();
        } else if command.flag("local") {
            names = installed.to_vec();
        } else {
            names = installed.to_vec();
            for remote in settings.remote_platform_names() {
                if !names.contains(&remote) {
                    names.push(remote);
                }
            }
        }
    }

    if names.is_empty() {
        return Err(PlatformError::NoPlatforms);
    }
    for name in &names {
        validate_platform_name(name)?;
    }

    Ok(names
        .into_iter()
        .map(|name| {
            let location = classify(&name, command, settings);
            Platform::new(name, location)
        })
        .collect())
}

/// Split platforms into (local names, remote names), preserving order.
pub fn partition(platforms: &[Platform]) -> (Vec<String>, Vec<String>) {
    let mut local = Vec::new();
    let mut remote = Vec::new();
    for platform in platforms {
        match platform.location {
            Location::Local => local.push(platform.name.clone()),
            Location::Remote => remote.push(platform.name.clone()),
        }
    }
    (local, remote)
}
