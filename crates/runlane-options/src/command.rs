//! Parsed, immutable command data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Value of a parsed known option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Str(String),
}

/// One invocation's options and leftover arguments.
///
/// Created once from raw argv and never mutated afterwards; every component
/// receives it by shared reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandData {
    /// Known options that appeared on the command line
    pub options: BTreeMap<String, OptionValue>,

    /// Everything that was not a known option, in original order
    pub remainder: Vec<String>,
}

impl CommandData {
    pub fn new(options: BTreeMap<String, OptionValue>, remainder: Vec<String>) -> Self {
        Self { options, remainder }
    }

    /// Whether a boolean option is set to true.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.options.get(name), Some(OptionValue::Bool(true)))
    }

    /// Value of a string option, if given and non-empty.
    pub fn value(&self, name: &str) -> Option<&str> {
        match self.options.get(name) {
            Some(OptionValue::Str(v)) if !v.is_empty() => Some(v.as_str()),
            _ => None,
        }
    }

    /// Positional arguments naming platforms (`ios`, `android`, ...).
    pub fn platform_args(&self) -> Vec<&str> {
        self.remainder
            .iter()
            .filter(|arg| !arg.starts_with('-'))
            .map(String::as_str)
            .collect()
    }

    /// Unrecognized `--flag` tokens, forwarded verbatim to builds.
    pub fn passthrough_options(&self) -> Vec<String> {
        self.remainder
            .iter()
            .filter(|arg| arg.starts_with("--"))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CommandData {
        let mut options = BTreeMap::new();
        options.insert("remote".to_string(), OptionValue::Bool(true));
        options.insert("device".to_string(), OptionValue::Bool(false));
        options.insert("target".to_string(), OptionValue::Str("Nexus_5".to_string()));
        CommandData::new(
            options,
            vec![
                "ios".to_string(),
                "--buildFlag=-UseModernBuildSystem=0".to_string(),
                "android".to_string(),
                "-x".to_string(),
            ],
        )
    }

    #[test]
    fn test_flag_only_true_when_set() {
        let command = sample();
        assert!(command.flag("remote"));
        assert!(!command.flag("device"));
        assert!(!command.flag("local"));
        assert!(!command.flag("target"));
    }

    #[test]
    fn test_value_lookup() {
        let command = sample();
        assert_eq!(command.value("target"), Some("Nexus_5"));
        assert_eq!(command.value("remote"), None);
    }

    #[test]
    fn test_remainder_partitions() {
        let command = sample();
        assert_eq!(command.platform_args(), vec!["ios", "android"]);
        assert_eq!(
            command.passthrough_options(),
            vec!["--buildFlag=-UseModernBuildSystem=0".to_string()]
        );
    }
}
