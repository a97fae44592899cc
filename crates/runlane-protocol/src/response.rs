//! Client helper response types.

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Response envelope.
///
/// The helper emits a single JSON response on stdout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientResponse {
    pub protocol_version: i32,
    /// Request ID echoed from the request.
    pub request_id: String,
    pub ok: bool,
    /// Success payload (present when ok=true).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    /// Error details (present when ok=false).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ClientError>,
}

impl ClientResponse {
    pub fn success(request_id: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            protocol_version: crate::PROTOCOL_VERSION,
            request_id: request_id.into(),
            ok: true,
            payload: Some(payload),
            error: None,
        }
    }

    pub fn error(request_id: impl Into<String>, error: ClientError) -> Self {
        Self {
            protocol_version: crate::PROTOCOL_VERSION,
            request_id: request_id.into(),
            ok: false,
            payload: None,
            error: Some(error),
        }
    }
}
