//! Workout API routes

use crate::error::ApiResult;
use crate::services::{CatalogService, ProfileService, RecommendationService};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use gains_tracker_shared::types::{
    ExerciseSearchResponse, RecommendationsQuery, RecommendationsResponse, SaveRoutineRequest,
    SearchQuery, WorkoutsQuery, WorkoutsResponse,
};
use gains_tracker_shared::WorkoutRoutine;
use validator::Validate;

/// Create workout routes
pub fn workout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_routines).post(save_routine))
        .route("/recommendations", get(get_recommendations))
        .route("/exercises/search", get(search_exercises))
}

/// GET /api/v1/workouts/recommendations?body_parts=Chest,Biceps
///
/// Without explicit body parts a random sample is used.
async fn get_recommendations(
    State(state): State<AppState>,
    Query(query): Query<RecommendationsQuery>,
) -> ApiResult<Json<RecommendationsResponse>> {
    let profile = ProfileService::get(state.store(), state.user_id()).await?;
    let slots = state
        .recommender
        .recommend(&profile, query.body_part_list())
        .await;
    Ok(Json(RecommendationsResponse { slots }))
}

/// GET /api/v1/workouts?category=&q= - Saved routines
async fn list_routines(
    State(state): State<AppState>,
    Query(query): Query<WorkoutsQuery>,
) -> Json<WorkoutsResponse> {
    Json(
        RecommendationService::list_routines(
            state.store(),
            state.user_id(),
            query.category.as_deref(),
            query.q.as_deref(),
        )
        .await,
    )
}

/// POST /api/v1/workouts - Save a recommendation slot as a routine
async fn save_routine(
    State(state): State<AppState>,
    Json(req): Json<SaveRoutineRequest>,
) -> ApiResult<(StatusCode, Json<WorkoutRoutine>)> {
    req.validate()?;
    let routine = RecommendationService::save_routine(
        state.store(),
        state.user_id(),
        req.body_part.trim(),
        &req.titles,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(routine)))
}

/// GET /api/v1/workouts/exercises/search?q= - Exercise descriptions by title
async fn search_exercises(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<ExerciseSearchResponse> {
    Json(CatalogService::search_exercises(state.store(), &query.q).await)
}
