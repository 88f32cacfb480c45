//! Food catalog API routes

use crate::error::ApiResult;
use crate::services::CatalogService;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use gains_tracker_shared::types::{
    FoodSearchResponse, PortionQuery, PortionResponse, SearchQuery,
};

/// Create food routes
pub fn food_routes() -> Router<AppState> {
    Router::new()
        .route("/search", get(search_foods))
        .route("/:name/portion", get(get_portion))
}

/// GET /api/v1/foods/search?q= - Prefix search on food names
async fn search_foods(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<FoodSearchResponse> {
    Json(CatalogService::search_foods(state.store(), &query.q).await)
}

/// GET /api/v1/foods/:name/portion?quantity=&unit= - Nutrients of a portion
async fn get_portion(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<PortionQuery>,
) -> ApiResult<Json<PortionResponse>> {
    let response =
        CatalogService::portion(state.store(), &name, &query.quantity, query.unit).await?;
    Ok(Json(response))
}
