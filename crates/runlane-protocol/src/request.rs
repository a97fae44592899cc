//! Client helper request types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operation requested from the remote build client helper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientOp {
    /// Confirm that a cached build still exists on the server
    CheckBuild,
    /// Submit an (incremental) build
    Build,
    /// Run a finished build on a device attached to the server
    Run,
    /// Launch a finished build in an emulator/simulator
    Emulate,
    /// Attach the web debug proxy to a running build
    Debug,
}

impl ClientOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientOp::CheckBuild => "check_build",
            ClientOp::Build => "build",
            ClientOp::Run => "run",
            ClientOp::Emulate => "emulate",
            ClientOp::Debug => "debug",
        }
    }
}

impl fmt::Display for ClientOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request envelope.
///
/// The helper receives exactly one JSON request line on stdin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRequest {
    pub protocol_version: i32,
    pub op: ClientOp,
    /// Caller-chosen request ID for correlation.
    pub request_id: String,
    /// Operation-specific payload.
    pub payload: serde_json::Value,
}

impl ClientRequest {
    pub fn new(op: ClientOp, request_id: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            protocol_version: crate::PROTOCOL_VERSION,
            op,
            request_id: request_id.into(),
            payload,
        }
    }
}
