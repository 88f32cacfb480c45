//! API request and response types

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

use crate::health_metrics::DerivedTargets;
use crate::meals::DaySummary;
use crate::models::{
    ActivityLevel, DietaryPreference, EquipmentAccess, ExerciseDescription, FitnessGoal, FoodItem,
    Gender, MealRecord, MealType, UserProfile, WorkoutRoutine,
};
use crate::recommendation::SlotRecommendation;
use crate::snapshots::{HourlyHeartRate, MetricSnapshot};
use crate::units::{FoodUnit, Portion};

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

// ============================================================================
// Profile
// ============================================================================

/// Onboarding request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub full_name: String,
    #[validate(range(min = 1, max = 120))]
    pub age: i32,
    pub gender: Gender,
    #[validate(range(min = 50.0, max = 300.0))]
    pub height_cm: f64,
    #[validate(range(min = 20.0, max = 500.0))]
    pub weight_kg: f64,
    pub fitness_goal: FitnessGoal,
    pub dietary_preference: DietaryPreference,
    pub activity_level: ActivityLevel,
    pub equipment_access: EquipmentAccess,
    #[validate(range(min = 1, max = 10))]
    pub meals_per_day: u32,
}

/// Explicit field updates; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub full_name: Option<String>,
    #[validate(range(min = 1, max = 120))]
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    #[validate(range(min = 50.0, max = 300.0))]
    pub height_cm: Option<f64>,
    #[validate(range(min = 20.0, max = 500.0))]
    pub weight_kg: Option<f64>,
    pub fitness_goal: Option<FitnessGoal>,
    pub dietary_preference: Option<DietaryPreference>,
    pub activity_level: Option<ActivityLevel>,
    pub equipment_access: Option<EquipmentAccess>,
    #[validate(range(min = 1, max = 10))]
    pub meals_per_day: Option<u32>,
    pub meal_targets: Option<BTreeMap<MealType, i64>>,
    #[validate(range(min = 0, max = 20000))]
    pub manual_target_calories: Option<i64>,
    /// Remove the per-slot overrides
    #[serde(default)]
    pub clear_meal_targets: bool,
    /// Remove the manual calorie target
    #[serde(default)]
    pub clear_manual_target: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub profile: UserProfile,
    pub initials: String,
    pub targets: DerivedTargets,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealGoalsResponse {
    pub target_calories: i64,
    pub goals: BTreeMap<MealType, i64>,
    /// True when the goals come from stored per-slot overrides
    pub overridden: bool,
}

// ============================================================================
// Meals
// ============================================================================

/// Log meal request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LogMealRequest {
    #[serde(alias = "type")]
    pub meal_type: MealType,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub calories: Decimal,
    #[serde(default)]
    pub carb: Decimal,
    #[serde(default)]
    pub protein: Decimal,
    #[serde(default)]
    pub fat: Decimal,
    /// Defaults to now
    pub timestamp: Option<DateTime<Utc>>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    pub quantity: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogMealResponse {
    pub meal: MealRecord,
    pub persisted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub refreshed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySummaryResponse {
    pub date: NaiveDate,
    pub summary: DaySummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<String>,
}

// ============================================================================
// Catalog
// ============================================================================

/// Prefix search query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodSearchResponse {
    pub results: Vec<FoodItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseSearchResponse {
    pub results: Vec<ExerciseDescription>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<String>,
}

/// Portion scaling query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortionQuery {
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub unit: FoodUnit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortionResponse {
    pub food: String,
    pub quantity: String,
    pub unit: FoodUnit,
    pub portion: Portion,
    /// True when the quantity was not understood and base values are shown
    pub reverted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<String>,
}

// ============================================================================
// Health Metrics
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsResponse {
    pub available: bool,
    pub steps_today: Option<MetricSnapshot>,
    pub steps_today_at: Option<DateTime<Utc>>,
    pub weekly_steps: Option<MetricSnapshot>,
    pub weekly_calories: Option<MetricSnapshot>,
    pub weekly_distance: Option<MetricSnapshot>,
    pub last_heart_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourlyHeartRateResponse {
    pub anchor: Option<DateTime<Utc>>,
    pub buckets: Vec<HourlyHeartRate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<String>,
}

// ============================================================================
// Workouts
// ============================================================================

/// Recommendation query; body parts are comma-separated
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendationsQuery {
    pub body_parts: Option<String>,
}

impl RecommendationsQuery {
    pub fn body_part_list(&self) -> Option<Vec<String>> {
        let parts: Vec<String> = self
            .body_parts
            .as_deref()?
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        (!parts.is_empty()).then_some(parts)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationsResponse {
    pub slots: Vec<SlotRecommendation>,
}

/// Save a recommended slot as a routine
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SaveRoutineRequest {
    #[validate(length(min = 1, max = 100))]
    pub body_part: String,
    #[validate(length(min = 1, max = 20))]
    pub titles: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkoutsQuery {
    pub category: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutsResponse {
    pub routines: Vec<WorkoutRoutine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<String>,
}
