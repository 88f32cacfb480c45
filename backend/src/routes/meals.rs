//! Meal logging API routes

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use gains_tracker_shared::types::{
    DailySummaryResponse, LogMealRequest, LogMealResponse, RefreshResponse,
};
use gains_tracker_shared::validation::{validate_nutrient, ValidationError};
use gains_tracker_shared::MealRecord;
use rust_decimal::Decimal;
use validator::Validate;

/// Create meal routes
pub fn meal_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(log_meal))
        .route("/refresh", post(refresh_meals))
        .route("/daily/:date", get(get_daily_summary))
}

/// POST /api/v1/meals - Log a meal
///
/// The meal is always accepted locally; `persisted` reports whether the
/// store took it.
async fn log_meal(
    State(state): State<AppState>,
    Json(req): Json<LogMealRequest>,
) -> ApiResult<(StatusCode, Json<LogMealResponse>)> {
    req.validate()?;
    for (field, value) in [
        ("calories", req.calories),
        ("carb", req.carb),
        ("protein", req.protein),
        ("fat", req.fat),
    ] {
        validate_nutrient(value).map_err(|msg| ValidationError::new(field, &msg))?;
    }

    let mut meal = MealRecord::new(
        req.meal_type,
        req.name.trim(),
        req.calories,
        req.carb,
        req.protein,
        req.fat,
        req.timestamp.unwrap_or_else(Utc::now),
    );
    meal.notes = req.notes.unwrap_or_default();
    meal.quantity = req.quantity.unwrap_or(Decimal::ZERO);

    let outcome = state.meals.add_meal(meal).await;
    let status = if outcome.persisted {
        StatusCode::CREATED
    } else {
        StatusCode::ACCEPTED
    };

    Ok((
        status,
        Json(LogMealResponse {
            meal: outcome.meal,
            persisted: outcome.persisted,
            advisory: outcome.advisory,
        }),
    ))
}

/// POST /api/v1/meals/refresh - Rebuild the meal read model from the store
async fn refresh_meals(State(state): State<AppState>) -> Json<RefreshResponse> {
    let refreshed = state.meals.refresh().await.is_ok();
    Json(RefreshResponse {
        refreshed,
        advisory: state.meals.advisory().await,
    })
}

/// GET /api/v1/meals/daily/:date - Totals and goal progress for one local day
async fn get_daily_summary(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> ApiResult<Json<DailySummaryResponse>> {
    let date = if date == "today" {
        Utc::now().with_timezone(&state.meals.offset()).date_naive()
    } else {
        NaiveDate::parse_from_str(&date, "%Y-%m-%d")
            .map_err(|_| ApiError::BadRequest(format!("Invalid date '{}', expected YYYY-MM-DD", date)))?
    };

    Ok(Json(DailySummaryResponse {
        date,
        summary: state.meals.day_summary(date).await,
        advisory: state.meals.advisory().await,
    }))
}
