//! Remote client over a helper process.
//!
//! Each call spawns the helper, writes a single JSON request line on stdin,
//! and reads a single JSON response from stdout.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use runlane_protocol::{
    BuildInfo, BuildSettings, ClientOp, ClientRequest, ClientResponse, ErrorCode,
    RemoteConnectionInfo,
};
use serde_json::{json, Value};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use super::{RemoteBuildClient, RemoteError};
use crate::cache::{BuildInfoCache, CacheError};

/// Remote build client backed by an external helper executable.
#[derive(Debug, Clone)]
pub struct ProcessBuildClient {
    program: String,
}

impl ProcessBuildClient {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn next_request_id() -> String {
        format!("req-{}", uuid::Uuid::new_v4().simple())
    }

    /// Send one request and return the success payload.
    async fn execute(&self, op: ClientOp, payload: Value) -> Result<Value, RemoteError> {
        let request = ClientRequest::new(op, Self::next_request_id(), payload);
        let request_json = serde_json::to_string(&request)
            .map_err(|e| RemoteError::Protocol(format!("Cannot encode request: {}", e)))?;
        debug!(op = %op, request_id = %request.request_id, "remote client request");

        let mut child = Command::new(&self.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RemoteError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(request_json.as_bytes()).await?;
            stdin.write_all(b"\n").await?;
            stdin.shutdown().await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RemoteError::Protocol(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let response: ClientResponse = serde_json::from_slice(&output.stdout)
            .map_err(|e| RemoteError::Protocol(format!("Invalid response JSON: {}", e)))?;
        Self::into_payload(&request, response)
    }

    fn into_payload(request: &ClientRequest, response: ClientResponse) -> Result<Value, RemoteError> {
        if response.request_id != request.request_id {
            return Err(RemoteError::Protocol(format!(
                "Response {} does not answer request {}",
                response.request_id, request.request_id
            )));
        }

        if !response.ok {
            return match response.error {
                Some(error) => Err(RemoteError::Server(error)),
                None => Err(RemoteError::Protocol(format!(
                    "{} failed with no error details",
                    request.op
                ))),
            };
        }

        response
            .payload
            .ok_or_else(|| RemoteError::Protocol(format!("{} response missing payload", request.op)))
    }

    fn build_info(op: ClientOp, payload: Value) -> Result<BuildInfo, RemoteError> {
        serde_json::from_value(payload)
            .map_err(|e| RemoteError::Protocol(format!("Invalid build info in {} response: {}", op, e)))
    }

    async fn build_op(
        &self,
        op: ClientOp,
        info: &BuildInfo,
        connection: &RemoteConnectionInfo,
        target: Option<&str>,
    ) -> Result<BuildInfo, RemoteError> {
        let mut payload = json!({
            "buildInfo": info,
            "server": connection,
            "baseUrl": connection.base_url(),
        });
        if let Some(target) = target {
            payload["target"] = json!(target);
        }
        let response = self.execute(op, payload).await?;
        Self::build_info(op, response)
    }
}

#[async_trait]
impl RemoteBuildClient for ProcessBuildClient {
    async fn check_for_build_on_server(
        &self,
        settings: &BuildSettings,
        cache_path: &Path,
    ) -> Result<Option<BuildInfo>, RemoteError> {
        let Some(cached) =
            BuildInfoCache::read_checked(cache_path, &settings.platform, settings.configuration)
                .await?
        else {
            return Ok(None);
        };

        let payload = json!({
            "buildInfo": cached,
            "server": settings.server_info,
            "baseUrl": settings.server_info.base_url(),
        });
        match self.execute(ClientOp::CheckBuild, payload).await {
            Ok(response) => Ok(Some(Self::build_info(ClientOp::CheckBuild, response)?)),
            Err(RemoteError::Server(error)) if error.code == ErrorCode::BuildNotFound => {
                debug!(build = cached.build_number, "cached build no longer on server");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn build(&self, settings: &BuildSettings) -> Result<BuildInfo, RemoteError> {
        let cache_path = settings.build_info_path().map_err(CacheError::from)?;
        let payload = json!({
            "settings": settings,
            "baseUrl": settings.server_info.base_url(),
        });
        let response = self.execute(ClientOp::Build, payload).await?;
        let info = Self::build_info(ClientOp::Build, response)?;
        BuildInfoCache::write(&cache_path, &info).await?;
        Ok(info)
    }

    async fn run(
        &self,
        info: &BuildInfo,
        connection: &RemoteConnectionInfo,
    ) -> Result<BuildInfo, RemoteError> {
        self.build_op(ClientOp::Run, info, connection, None).await
    }

    async fn emulate(
        &self,
        info: &BuildInfo,
        connection: &RemoteConnectionInfo,
        target: &str,
    ) -> Result<BuildInfo, RemoteError> {
        self.build_op(ClientOp::Emulate, info, connection, Some(target)).await
    }

    async fn debug(
        &self,
        info: &BuildInfo,
        connection: &RemoteConnectionInfo,
    ) -> Result<BuildInfo, RemoteError> {
        self.build_op(ClientOp::Debug, info, connection, None).await
    }
}
