//! Handlers for load balancer, heartbeat and version endpoints.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HeartbeatChecks, HeartbeatResponse, VersionResponse};
use crate::state::AppState;

/// Liveness probe for load balancers.
///
/// # Endpoint
///
/// `GET /__lbheartbeat__`
///
/// Always answers `200 OK` with an empty body.
pub async fn lbheartbeat_handler() -> StatusCode {
    StatusCode::OK
}

/// Returns service health with component checks.
///
/// # Endpoint
///
/// `GET /__heartbeat__/`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Response
///
/// ```json
/// {
///   "status": "ok",
///   "checks": {
///     "static_root": { "status": "ok", "message": "static" }
///   }
/// }
/// ```
pub async fn heartbeat_handler(
    State(state): State<AppState>,
) -> Result<Json<HeartbeatResponse>, (StatusCode, Json<HeartbeatResponse>)> {
    let static_check = check_static_root(&state).await;

    let healthy = static_check.status == "ok";

    let response = HeartbeatResponse {
        status: if healthy { "ok" } else { "degraded" }.to_string(),
        checks: HeartbeatChecks {
            static_root: static_check,
        },
    };

    if healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Checks that the static file directory exists.
async fn check_static_root(state: &AppState) -> CheckStatus {
    let root = &state.config.static_root;
    match tokio::fs::metadata(root).await {
        Ok(meta) if meta.is_dir() => CheckStatus {
            status: "ok".to_string(),
            message: Some(root.display().to_string()),
        },
        Ok(_) => CheckStatus {
            status: "error".to_string(),
            message: Some(format!("{} is not a directory", root.display())),
        },
        Err(e) => CheckStatus {
            status: "error".to_string(),
            message: Some(format!("{}: {}", root.display(), e)),
        },
    }
}

/// Reports the build version and the deployment's configuration name.
///
/// # Endpoint
///
/// `GET /__version__/`
pub async fn version_handler(State(state): State<AppState>) -> Json<VersionResponse> {
    Json(VersionResponse {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        configuration: state.config.configuration_name.clone(),
    })
}
