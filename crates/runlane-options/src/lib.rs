//! Option handling for `runlane run`.
//!
//! Parses the raw run arguments against the known-option table into an
//! immutable [`CommandData`], and rejects mutually exclusive flag
//! combinations before anything is executed.

mod command;
mod error;
mod parser;

pub use command::{CommandData, OptionValue};
pub use error::OptionsError;
pub use parser::parse_args;

/// Kind of value a known option carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// Boolean switch (`--name`, `--no-name`)
    Flag,
    /// Takes a string value (`--name value`, `--name=value`)
    Value,
}

/// Options recognized by `runlane run`, in declaration order.
pub const KNOWN_OPTIONS: &[(&str, OptionKind)] = &[
    ("local", OptionKind::Flag),
    ("remote", OptionKind::Flag),
    ("clean", OptionKind::Flag),
    ("debuginfo", OptionKind::Flag),
    ("nobuild", OptionKind::Flag),
    ("list", OptionKind::Flag),
    ("device", OptionKind::Flag),
    ("emulator", OptionKind::Flag),
    ("target", OptionKind::Value),
    ("debug", OptionKind::Flag),
    ("release", OptionKind::Flag),
];

/// Flag pairs that may not be combined, in the order they are checked.
pub const INCOMPATIBLE_PAIRS: &[(&str, &str)] = &[
    ("remote", "local"),
    ("device", "emulator"),
    ("debug", "release"),
    ("nobuild", "clean"),
];

/// Look up the kind of a known option.
pub fn option_kind(name: &str) -> Option<OptionKind> {
    KNOWN_OPTIONS
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, kind)| *kind)
}

/// Reject mutually exclusive flags.
///
/// Pairs are checked in [`INCOMPATIBLE_PAIRS`] order and only the first
/// conflict is reported.
pub fn validate(command: &CommandData) -> Result<(), OptionsError> {
    for (first, second) in INCOMPATIBLE_PAIRS {
        if command.flag(first) && command.flag(second) {
            return Err(OptionsError::IncompatibleOptions {
                first: (*first).to_string(),
                second: (*second).to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn conflict(list: &[&str]) -> Option<(String, String)> {
        let command = parse_args(&args(list)).unwrap();
        match validate(&command) {
            Err(OptionsError::IncompatibleOptions { first, second }) => Some((first, second)),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(()) => None,
        }
    }

    #[test]
    fn test_each_pair_is_rejected() {
        for (first, second) in INCOMPATIBLE_PAIRS {
            let a = format!("--{first}");
            let b = format!("--{second}");
            assert_eq!(
                conflict(&[a.as_str(), b.as_str()]),
                Some((first.to_string(), second.to_string())),
                "pair {first}/{second}"
            );
        }
    }

    #[test]
    fn test_pair_order_is_independent_of_argv_order() {
        assert_eq!(
            conflict(&["--local", "--remote"]),
            Some(("remote".to_string(), "local".to_string()))
        );
    }

    #[test]
    fn test_first_conflict_wins() {
        assert_eq!(
            conflict(&["--clean", "--nobuild", "--release", "--debug"]),
            Some(("debug".to_string(), "release".to_string()))
        );
    }

    #[test]
    fn test_compatible_flags_pass() {
        assert_eq!(conflict(&["--remote", "--device", "--release", "--debuginfo", "ios"]), None);
        assert_eq!(conflict(&[]), None);
    }

    #[test]
    fn test_option_kind_lookup() {
        assert_eq!(option_kind("target"), Some(OptionKind::Value));
        assert_eq!(option_kind("nobuild"), Some(OptionKind::Flag));
        assert_eq!(option_kind("livereload"), None);
    }
}
