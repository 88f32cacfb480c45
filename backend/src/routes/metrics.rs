//! Health metric API routes

use crate::repositories::ProfileRepository;
use crate::state::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use gains_tracker_shared::derive_targets;
use gains_tracker_shared::types::{HourlyHeartRateResponse, MetricsResponse};
use tracing::warn;

/// Create metric routes
pub fn metric_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_metrics))
        .route("/refresh", post(refresh_metrics))
        .route("/heart-rate/hourly", get(get_hourly_heart_rate))
}

/// Daily burn target of the stored profile; `None` when there is no
/// profile or it cannot be read
async fn burn_target(state: &AppState) -> Option<i64> {
    match ProfileRepository::find(state.store(), state.user_id()).await {
        Ok(profile) => profile.map(|p| derive_targets(&p).target_calories_burned),
        Err(e) => {
            warn!(error = %e, "Could not load profile, using fallback burn target");
            None
        }
    }
}

/// GET /api/v1/metrics - Latest snapshots with goals
async fn get_metrics(State(state): State<AppState>) -> Json<MetricsResponse> {
    let target = burn_target(&state).await;
    Json(state.health.report(target).await)
}

/// POST /api/v1/metrics/refresh - Recompute every snapshot now
async fn refresh_metrics(State(state): State<AppState>) -> Json<MetricsResponse> {
    state.health.refresh_all().await;
    let target = burn_target(&state).await;
    Json(state.health.report(target).await)
}

/// GET /api/v1/metrics/heart-rate/hourly - Trailing 24 h of hourly averages
async fn get_hourly_heart_rate(State(state): State<AppState>) -> Json<HourlyHeartRateResponse> {
    Json(state.health.hourly().await)
}
