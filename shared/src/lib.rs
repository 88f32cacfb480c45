//! Gains Tracker Shared Library
//!
//! This crate contains the pure domain of the tracker: profile models, the
//! target calculator, meal goal allocation, day-bucketed meal aggregation,
//! health snapshot math and the recommendation feature mapping. Nothing in
//! here performs I/O; the backend and WASM crates build on top of it.

pub mod errors;
pub mod goals;
pub mod health_metrics;
pub mod meals;
pub mod models;
pub mod recommendation;
pub mod snapshots;
pub mod types;
pub mod units;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use goals::{allocate_meal_goals, goal_fraction, split_evenly, MealSlotProgress};
pub use health_metrics::*;
pub use meals::{DayBuckets, DaySummary, NutrientField, NutrientTotals};
pub use snapshots::{HealthMetric, HealthSample, HourlyHeartRate, MetricKind, MetricSnapshot};
pub use units::{DistanceUnit, FoodUnit};

// Export models
pub use models::{
    ActivityLevel, DietaryPreference, EquipmentAccess, Exercise, ExerciseDescription,
    FitnessGoal, FoodItem, Gender, MealRecord, MealType, SetDetail, UserProfile, WorkoutRoutine,
};
