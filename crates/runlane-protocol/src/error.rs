//! Error payloads reported by the remote client helper.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable error codes returned in helper error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Malformed request or invalid field values.
    InvalidRequest,
    /// Protocol version not spoken by the helper.
    UnsupportedProtocol,
    /// The build server could not be reached.
    ServerUnreachable,
    /// The server no longer knows the referenced build.
    BuildNotFound,
    /// The server build finished with errors.
    BuildFailed,
    /// Deploying or launching the app failed.
    RunFailed,
    /// No emulator/simulator matches the requested target.
    TargetNotFound,
    /// Attaching the debugger failed.
    DebugFailed,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::UnsupportedProtocol => "UNSUPPORTED_PROTOCOL",
            Self::ServerUnreachable => "SERVER_UNREACHABLE",
            Self::BuildNotFound => "BUILD_NOT_FOUND",
            Self::BuildFailed => "BUILD_FAILED",
            Self::RunFailed => "RUN_FAILED",
            Self::TargetNotFound => "TARGET_NOT_FOUND",
            Self::DebugFailed => "DEBUG_FAILED",
        };
        f.write_str(s)
    }
}

/// Error response payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientError {
    pub code: ErrorCode,
    /// Human-readable, single-line message.
    pub message: String,
    /// Optional machine-readable details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ClientError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(code: ErrorCode, message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn build_failed(platform: &str, build_number: u64) -> Self {
        Self::with_data(
            ErrorCode::BuildFailed,
            format!("remote build {} for '{}' failed", build_number, platform),
            serde_json::json!({ "platform": platform, "build_number": build_number }),
        )
    }

    pub fn build_not_found(build_number: u64) -> Self {
        Self::with_data(
            ErrorCode::BuildNotFound,
            format!("build {} is not known to the server", build_number),
            serde_json::json!({ "build_number": build_number }),
        )
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ClientError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_serialization() {
        let err = ClientError::build_failed("ios", 12);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "BUILD_FAILED");
        assert_eq!(json["data"]["build_number"], 12);
        assert_eq!(err.to_string(), "BUILD_FAILED: remote build 12 for 'ios' failed");
    }
}
