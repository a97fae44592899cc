//! Runlane Protocol Types
//!
//! Defines the data model shared between the run orchestrator and the remote
//! build-server client: build configurations, connection descriptors, build
//! requests, build results, and the JSON envelope used to talk to an
//! out-of-process client helper.

pub mod build;
pub mod configuration;
pub mod connection;
pub mod error;
pub mod request;
pub mod response;

pub use build::{
    build_info_relative_path, validate_platform_name, BuildInfo, BuildSettings, InvalidPlatformName,
    BUILD_COMMAND, BUILD_INFO_FILE,
};
pub use configuration::{Configuration, ParseConfigurationError};
pub use connection::RemoteConnectionInfo;
pub use error::{ClientError, ErrorCode};
pub use request::{ClientOp, ClientRequest};
pub use response::ClientResponse;

/// Envelope protocol version spoken by this implementation.
pub const PROTOCOL_VERSION: i32 = 1;
