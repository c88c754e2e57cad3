//! Health check handlers.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Key that never exists; probing it exercises the backend without side effects.
const HEALTH_CHECK_KEY: &str = "health-check/ping.png";

#[derive(Serialize)]
pub(super) struct ReadinessResponse {
    pub status: &'static str,
    pub storage: String,
    pub storage_backend: String,
}

/// Liveness: the process is running.
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Readiness: the storage backend answers within the timeout.
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let storage_status =
        match tokio::time::timeout(CHECK_TIMEOUT, state.storage.exists(HEALTH_CHECK_KEY)).await {
            Ok(Ok(_)) => "ready".to_string(),
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Storage readiness check failed");
                format!("not_ready: {}", e)
            }
            Err(_) => {
                tracing::error!("Storage readiness check timed out");
                "timeout".to_string()
            }
        };

    let ready = storage_status == "ready";
    let body = ReadinessResponse {
        status: if ready { "ready" } else { "not_ready" },
        storage: storage_status,
        storage_backend: state.storage.backend_type().to_string(),
    };

    let status_code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(body))
}
