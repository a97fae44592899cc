//! Run telemetry properties
//!
//! Properties are immutable values merged at join points: platform
//! classification first, then per-task outcomes, then the command-line
//! derived properties. Nothing is shared between concurrent tasks.
//! Emission is left to the caller.

use std::collections::BTreeMap;

use runlane_options::{CommandData, OptionKind, KNOWN_OPTIONS};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::config::Settings;
use crate::platform::{classify, explicit_platforms, Location, Platform};

/// Modifier for the platforms an invocation actually acted on.
pub const ACTUALLY_BUILT: &str = "actuallyBuilt";

/// Modifier for the platforms named on the command line.
pub const REQUESTED_VIA_COMMAND_LINE: &str = "requestedViaCommandLine";

/// One property value. PII values are stored as a SHA-256 hex digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TelemetryValue {
    pub value: String,
    pub is_pii: bool,
}

impl TelemetryValue {
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            is_pii: false,
        }
    }

    /// Value that may identify the user; only its digest is kept.
    pub fn pii(value: &str) -> Self {
        Self {
            value: hex::encode(Sha256::digest(value.as_bytes())),
            is_pii: true,
        }
    }
}

/// Ordered property set for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TelemetryProperties {
    properties: BTreeMap<String, TelemetryValue>,
}

impl TelemetryProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a non-PII property.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), TelemetryValue::plain(value));
        self
    }

    pub fn with_value(mut self, key: impl Into<String>, value: TelemetryValue) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// Combine two property sets; `other` wins on conflicting keys.
    pub fn merge(mut self, other: TelemetryProperties) -> Self {
        self.properties.extend(other.properties);
        self
    }

    pub fn get(&self, key: &str) -> Option<&TelemetryValue> {
        self.properties.get(key)
    }

    /// Plain string value of a property.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(|v| v.value.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TelemetryValue)> {
        self.properties.iter()
    }
}

impl FromIterator<TelemetryProperties> for TelemetryProperties {
    fn from_iter<I: IntoIterator<Item = TelemetryProperties>>(iter: I) -> Self {
        iter.into_iter().fold(TelemetryProperties::new(), TelemetryProperties::merge)
    }
}

/// Record platform names and locations under `platforms.<modifier>.*`.
///
/// Local and remote platforms are numbered separately from 1. Remote
/// entries also record whether their build server is secure.
pub fn store_platforms(modifier: &str, platforms: &[Platform], settings: &Settings) -> TelemetryProperties {
    let base = format!("platforms.{modifier}");
    let mut properties = TelemetryProperties::new();
    let mut local_index = 0;
    let mut remote_index = 0;

    for platform in platforms {
        match platform.location {
            Location::Local => {
                local_index += 1;
                properties = properties.with(format!("{base}.local{local_index}"), &platform.name);
            }
            Location::Remote => {
                remote_index += 1;
                let key = format!("{base}.remote{remote_index}");
                let secure = settings
                    .remote_connection(&platform.name)
                    .map(|conn| conn.secure)
                    .unwrap_or(false);
                properties = properties
                    .with(key.clone(), &platform.name)
                    .with(format!("{key}.isSecure"), secure.to_string());
            }
        }
    }
    properties
}

/// Properties derived from the command line alone.
pub fn command_line_properties(command: &CommandData, settings: &Settings) -> TelemetryProperties {
    let mut properties = TelemetryProperties::new();

    for (name, kind) in KNOWN_OPTIONS {
        match kind {
            OptionKind::Flag if command.flag(name) => {
                properties = properties.with(format!("options.{name}"), "true");
            }
            OptionKind::Value => {
                if let Some(value) = command.value(name) {
                    properties = properties.with_value(format!("options.{name}"), TelemetryValue::pii(value));
                }
            }
            OptionKind::Flag => {}
        }
    }

    let unknown = command.passthrough_options().len();
    if unknown > 0 {
        properties = properties.with("options.unknownCount", unknown.to_string());
    }

    let requested: Vec<Platform> = explicit_platforms(command)
        .into_iter()
        .map(|name| {
            let location = classify(&name, command, settings);
            Platform::new(name, location)
        })
        .collect();

    properties.merge(store_platforms(REQUESTED_VIA_COMMAND_LINE, &requested, settings))
}

/// Final property set for an invocation: the seed plus command-line facts.
pub fn aggregate(seed: TelemetryProperties, command: &CommandData, settings: &Settings) -> TelemetryProperties {
    seed.merge(command_line_properties(command, settings))
}
