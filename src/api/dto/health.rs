//! DTOs for heartbeat and version endpoints.

use serde::Serialize;

/// Heartbeat response with component status.
#[derive(Debug, Serialize)]
pub struct HeartbeatResponse {
    pub status: String,
    pub checks: HeartbeatChecks,
}

/// Health status for each component.
#[derive(Debug, Serialize)]
pub struct HeartbeatChecks {
    pub static_root: CheckStatus,
}

/// Individual component health status.
#[derive(Debug, Serialize)]
pub struct CheckStatus {
    pub status: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Build and deployment information.
#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub name: String,
    pub version: String,
    pub configuration: String,
}
