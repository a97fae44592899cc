//! Run argv parser.
//!
//! Splits raw arguments into known options and an ordered remainder.

use std::collections::BTreeMap;

use crate::command::{CommandData, OptionValue};
use crate::error::OptionsError;
use crate::{option_kind, OptionKind};

/// Parse run arguments into [`CommandData`].
///
/// # Arguments
/// * `args` - The arguments following `run` (not including the command itself).
///
/// Known flags accept `--name`, `--no-name` and `--name=true|false`; value
/// options accept `--name value` and `--name=value`. Anything else, and every
/// token after a bare `--`, is kept in the remainder in its original order.
pub fn parse_args(args: &[String]) -> Result<CommandData, OptionsError> {
    let mut options = BTreeMap::new();
    let mut remainder = Vec::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        if arg == "--" {
            remainder.extend(args[i + 1..].iter().cloned());
            break;
        }

        let Some(body) = arg.strip_prefix("--") else {
            remainder.push(arg.clone());
            i += 1;
            continue;
        };

        let (name, inline_value) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (body, None),
        };

        match option_kind(name) {
            Some(OptionKind::Flag) => {
                let value = match inline_value {
                    None => true,
                    Some("true") => true,
                    Some("false") => false,
                    Some(_) => return Err(OptionsError::UnexpectedValue(name.to_string())),
                };
                options.insert(name.to_string(), OptionValue::Bool(value));
            }
            Some(OptionKind::Value) => {
                let value = match inline_value {
                    Some(v) => v.to_string(),
                    None => {
                        i += 1;
                        args.get(i)
                            .cloned()
                            .ok_or_else(|| OptionsError::MissingValue(name.to_string()))?
                    }
                };
                if value.is_empty() {
                    return Err(OptionsError::MissingValue(name.to_string()));
                }
                options.insert(name.to_string(), OptionValue::Str(value));
            }
            None => {
                // Negated known flag, otherwise an unknown option for the remainder
                match name.strip_prefix("no-").and_then(|n| option_kind(n).map(|k| (n, k))) {
                    Some((negated, OptionKind::Flag)) if inline_value.is_none() => {
                        options.insert(negated.to_string(), OptionValue::Bool(false));
                    }
                    _ => remainder.push(arg.clone()),
                }
            }
        }

        i += 1;
    }

    Ok(CommandData::new(options, remainder))
}
