//! Health check endpoints
//!
//! - /health - Basic health check
//! - /health/ready - Readiness probe; fails only when the document store is unreachable
//! - /health/live - Liveness probe

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<HealthChecks>,
}

#[derive(Serialize)]
pub struct HealthChecks {
    pub store: CheckStatus,
    /// Informational; denied health access still serves nutrition data
    pub health_data: CheckStatus,
}

#[derive(Serialize)]
pub struct CheckStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CheckStatus {
    fn new(status: &str, message: Option<String>) -> Self {
        Self {
            status: status.to_string(),
            message,
        }
    }
}

fn response(status: &str, checks: Option<HealthChecks>) -> HealthResponse {
    HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks,
    }
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(response("healthy", None))
}

/// Readiness probe; 503 while the store cannot be reached
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let store = state.store();
    let store_check = match store.ping().await {
        Ok(()) => CheckStatus::new("healthy", Some(format!("{} store", store.kind()))),
        Err(e) => CheckStatus::new("unhealthy", Some(e.to_string())),
    };

    let health_data = if state.health.is_available() {
        CheckStatus::new("healthy", None)
    } else {
        CheckStatus::new("denied", Some("health data access was refused".to_string()))
    };

    let ready = store_check.status == "healthy";
    let body = response(
        if ready { "ready" } else { "not_ready" },
        Some(HealthChecks {
            store: store_check,
            health_data,
        }),
    );

    if ready {
        Ok(Json(body))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(body)))
    }
}

pub async fn liveness_check() -> Json<HealthResponse> {
    Json(response("alive", None))
}
