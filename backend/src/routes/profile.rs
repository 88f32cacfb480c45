//! User profile API routes

use crate::error::ApiResult;
use crate::services::ProfileService;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use gains_tracker_shared::types::{
    CreateProfileRequest, MealGoalsResponse, ProfileResponse, UpdateProfileRequest,
};
use gains_tracker_shared::DerivedTargets;
use validator::Validate;

/// Create profile routes
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_profile).post(create_profile).put(update_profile))
        .route("/targets", get(get_targets))
        .route("/meal-goals", get(get_meal_goals))
}

/// GET /api/v1/profile - Profile with derived targets
async fn get_profile(State(state): State<AppState>) -> ApiResult<Json<ProfileResponse>> {
    let response = ProfileService::get_response(state.store(), state.user_id()).await?;
    Ok(Json(response))
}

/// POST /api/v1/profile - Onboarding
async fn create_profile(
    State(state): State<AppState>,
    Json(req): Json<CreateProfileRequest>,
) -> ApiResult<(StatusCode, Json<ProfileResponse>)> {
    req.validate()?;
    let response = ProfileService::create(state.store(), state.user_id(), req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// PUT /api/v1/profile - Explicit field updates
async fn update_profile(
    State(state): State<AppState>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    req.validate()?;
    let response = ProfileService::update(state.store(), state.user_id(), req).await?;
    Ok(Json(response))
}

/// GET /api/v1/profile/targets
async fn get_targets(State(state): State<AppState>) -> ApiResult<Json<DerivedTargets>> {
    let targets = ProfileService::targets(state.store(), state.user_id()).await?;
    Ok(Json(targets))
}

/// GET /api/v1/profile/meal-goals
async fn get_meal_goals(State(state): State<AppState>) -> ApiResult<Json<MealGoalsResponse>> {
    let goals = ProfileService::meal_goals(state.store(), state.user_id()).await?;
    Ok(Json(goals))
}
