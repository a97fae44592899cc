//! Settings loading
//!
//! Implements the layered settings lookup:
//! 1. User settings (`$RUNLANE_HOME/settings.toml` or `~/.config/runlane/settings.toml`)
//! 2. Project settings (`.runlane/settings.toml`)
//!
//! Settings are loaded once per invocation and passed down read-only.

mod merge;
mod settings;

pub use merge::{deep_merge, merge_layers};
pub use settings::{
    ConfigError, FileSettingsProvider, Settings, SettingsProvider, DEFAULT_LANGUAGE, SETTINGS_FILE,
};
