//! Failure injection for the mock build server.

use std::collections::HashMap;
use std::time::Duration;

use runlane_protocol::{ClientError, ClientOp, ErrorCode};

/// Failure configuration for an operation
#[derive(Debug, Clone)]
pub struct FailureConfig {
    /// Error to return (if any)
    pub error: Option<ClientError>,
    /// Delay to add before responding
    pub delay: Option<Duration>,
    /// Number of times to fail before succeeding (None = always fail)
    pub fail_count: Option<u32>,
}

impl FailureConfig {
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            error: Some(ClientError::new(code, message)),
            delay: None,
            fail_count: None,
        }
    }

    /// Respond normally, but only after `duration`
    pub fn delay(duration: Duration) -> Self {
        Self {
            error: None,
            delay: Some(duration),
            fail_count: None,
        }
    }

    pub fn with_delay(mut self, duration: Duration) -> Self {
        self.delay = Some(duration);
        self
    }

    /// Set the number of times to fail before succeeding
    pub fn with_fail_count(mut self, count: u32) -> Self {
        self.fail_count = Some(count);
        self
    }
}

/// Per-(operation, platform) failure injection.
///
/// A `None` platform applies to every platform without its own entry.
#[derive(Debug, Default)]
pub struct FailureInjector {
    configs: HashMap<(ClientOp, Option<String>), FailureConfig>,
    call_counts: HashMap<(ClientOp, Option<String>), u32>,
}

impl FailureInjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inject(&mut self, op: ClientOp, platform: Option<&str>, config: FailureConfig) {
        let key = (op, platform.map(str::to_string));
        self.call_counts.insert(key.clone(), 0);
        self.configs.insert(key, config);
    }

    pub fn clear(&mut self) {
        self.configs.clear();
        self.call_counts.clear();
    }

    fn key_for(&self, op: ClientOp, platform: &str) -> Option<(ClientOp, Option<String>)> {
        let specific = (op, Some(platform.to_string()));
        if self.configs.contains_key(&specific) {
            return Some(specific);
        }
        let any = (op, None);
        self.configs.contains_key(&any).then_some(any)
    }

    /// Config for this call, counting it against `fail_count`.
    ///
    /// Returns `None` once the failure budget is used up.
    pub fn check(&mut self, op: ClientOp, platform: &str) -> Option<FailureConfig> {
        let key = self.key_for(op, platform)?;
        let config = self.configs.get(&key)?.clone();
        let count = self.call_counts.entry(key).or_insert(0);
        *count += 1;

        if let Some(limit) = config.fail_count {
            if *count > limit {
                return None;
            }
        }
        Some(config)
    }
}
