//! Build configuration (debug or release).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Build variant requested for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Configuration {
    #[default]
    Debug,
    Release,
}

impl Configuration {
    /// Select the configuration from the `--release` flag. Debug is the default.
    pub fn from_release_flag(release: bool) -> Self {
        if release {
            Configuration::Release
        } else {
            Configuration::Debug
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Configuration::Debug => "debug",
            Configuration::Release => "release",
        }
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown configuration '{0}' (expected 'debug' or 'release')")]
pub struct ParseConfigurationError(pub String);

impl FromStr for Configuration {
    type Err = ParseConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Configuration::Debug),
            "release" => Ok(Configuration::Release),
            _ => Err(ParseConfigurationError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_flag_selects_release() {
        assert_eq!(Configuration::from_release_flag(true), Configuration::Release);
        assert_eq!(Configuration::from_release_flag(false), Configuration::Debug);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Release".parse::<Configuration>().unwrap(), Configuration::Release);
        assert!("profile".parse::<Configuration>().is_err());
    }

    #[test]
    fn test_serializes_lowercase() {
        let json = serde_json::to_string(&Configuration::Release).unwrap();
        assert_eq!(json, "\"release\"");
    }
}
