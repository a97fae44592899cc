//! Option errors.

/// Errors raised while parsing or validating run options.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptionsError {
    #[error("--{first} and --{second} cannot be used together")]
    IncompatibleOptions { first: String, second: String },

    #[error("option --{0} requires a value")]
    MissingValue(String),

    #[error("option --{0} does not take a value")]
    UnexpectedValue(String),
}
