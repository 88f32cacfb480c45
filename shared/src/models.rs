//! Data models for the Gains Tracker
//!
//! Profile enumerations are stored as free-form strings by the onboarding
//! forms ("Lose weight", "Moderately active", ...). They deserialize
//! leniently: known spellings map to a variant, anything else is kept
//! verbatim in an `Other` variant so the derived metrics can fall back to
//! their documented defaults instead of failing.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Lowercase and fold separators so "Lightly active", "lightly-active" and
/// "lightly_active" compare equal
fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase().replace(&['-', ' '][..], "_")
}

// ============================================================================
// Profile Enumerations
// ============================================================================

/// Gender used by the BMR formula
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Gender {
    Male,
    Female,
    Other(String),
}

impl Gender {
    pub fn as_str(&self) -> &str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other(raw) => raw,
        }
    }
}

impl From<String> for Gender {
    fn from(raw: String) -> Self {
        match normalize(&raw).as_str() {
            "male" | "m" => Gender::Male,
            "female" | "f" => Gender::Female,
            _ => Gender::Other(raw),
        }
    }
}

impl From<Gender> for String {
    fn from(value: Gender) -> Self {
        value.as_str().to_string()
    }
}

/// Fitness goal chosen at onboarding
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FitnessGoal {
    LoseWeight,
    BuildMuscle,
    ImproveEndurance,
    GeneralFitness,
    Other(String),
}

impl FitnessGoal {
    pub fn as_str(&self) -> &str {
        match self {
            FitnessGoal::LoseWeight => "lose_weight",
            FitnessGoal::BuildMuscle => "build_muscle",
            FitnessGoal::ImproveEndurance => "improve_endurance",
            FitnessGoal::GeneralFitness => "general_fitness",
            FitnessGoal::Other(raw) => raw,
        }
    }
}

impl From<String> for FitnessGoal {
    fn from(raw: String) -> Self {
        match normalize(&raw).as_str() {
            "lose_weight" => FitnessGoal::LoseWeight,
            "build_muscle" => FitnessGoal::BuildMuscle,
            "improve_endurance" => FitnessGoal::ImproveEndurance,
            "general_fitness" => FitnessGoal::GeneralFitness,
            _ => FitnessGoal::Other(raw),
        }
    }
}

impl From<FitnessGoal> for String {
    fn from(value: FitnessGoal) -> Self {
        value.as_str().to_string()
    }
}

/// Activity level for the TDEE multiplier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityLevel {
    /// Little or no exercise
    Sedentary,
    /// Light exercise 1-3 days/week
    LightlyActive,
    /// Moderate exercise 3-5 days/week
    ModeratelyActive,
    /// Hard exercise 6-7 days/week
    VeryActive,
    Other(String),
}

impl ActivityLevel {
    pub fn as_str(&self) -> &str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::LightlyActive => "lightly_active",
            ActivityLevel::ModeratelyActive => "moderately_active",
            ActivityLevel::VeryActive => "very_active",
            ActivityLevel::Other(raw) => raw,
        }
    }

    /// Get the activity multiplier for TDEE calculation
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::LightlyActive => 1.375,
            ActivityLevel::ModeratelyActive => 1.55,
            ActivityLevel::VeryActive => 1.725,
            ActivityLevel::Other(_) => 1.0,
        }
    }
}

impl From<String> for ActivityLevel {
    fn from(raw: String) -> Self {
        match normalize(&raw).as_str() {
            "sedentary" => ActivityLevel::Sedentary,
            "lightly_active" => ActivityLevel::LightlyActive,
            "moderately_active" => ActivityLevel::ModeratelyActive,
            "very_active" => ActivityLevel::VeryActive,
            _ => ActivityLevel::Other(raw),
        }
    }
}

impl From<ActivityLevel> for String {
    fn from(value: ActivityLevel) -> Self {
        value.as_str().to_string()
    }
}

/// Equipment the user can train with
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EquipmentAccess {
    None,
    Weights,
    Machines,
    WeightsAndMachines,
    Other(String),
}

impl EquipmentAccess {
    pub fn as_str(&self) -> &str {
        match self {
            EquipmentAccess::None => "none",
            EquipmentAccess::Weights => "weights",
            EquipmentAccess::Machines => "machines",
            EquipmentAccess::WeightsAndMachines => "weights_and_machines",
            EquipmentAccess::Other(raw) => raw,
        }
    }
}

impl From<String> for EquipmentAccess {
    fn from(raw: String) -> Self {
        match normalize(&raw).as_str() {
            "none" => EquipmentAccess::None,
            "weights" => EquipmentAccess::Weights,
            "machines" => EquipmentAccess::Machines,
            "weights_and_machines" | "both" => EquipmentAccess::WeightsAndMachines,
            _ => EquipmentAccess::Other(raw),
        }
    }
}

impl From<EquipmentAccess> for String {
    fn from(value: EquipmentAccess) -> Self {
        value.as_str().to_string()
    }
}

/// Dietary preference (informational, not used by any formula)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DietaryPreference {
    None,
    Vegetarian,
    Vegan,
    GlutenFree,
    Keto,
    Paleo,
    Other(String),
}

impl DietaryPreference {
    pub fn as_str(&self) -> &str {
        match self {
            DietaryPreference::None => "none",
            DietaryPreference::Vegetarian => "vegetarian",
            DietaryPreference::Vegan => "vegan",
            DietaryPreference::GlutenFree => "gluten_free",
            DietaryPreference::Keto => "keto",
            DietaryPreference::Paleo => "paleo",
            DietaryPreference::Other(raw) => raw,
        }
    }
}

impl From<String> for DietaryPreference {
    fn from(raw: String) -> Self {
        match normalize(&raw).as_str() {
            "none" => DietaryPreference::None,
            "vegetarian" => DietaryPreference::Vegetarian,
            "vegan" => DietaryPreference::Vegan,
            "gluten_free" => DietaryPreference::GlutenFree,
            "keto" => DietaryPreference::Keto,
            "paleo" => DietaryPreference::Paleo,
            _ => DietaryPreference::Other(raw),
        }
    }
}

impl From<DietaryPreference> for String {
    fn from(value: DietaryPreference) -> Self {
        value.as_str().to_string()
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

display_as_str!(Gender, FitnessGoal, ActivityLevel, EquipmentAccess, DietaryPreference);

// ============================================================================
// Meal Types
// ============================================================================

/// Meal slot. Declaration order is the canonical slot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    #[serde(alias = "Breakfast")]
    Breakfast,
    #[serde(alias = "Lunch")]
    Lunch,
    #[serde(alias = "Dinner")]
    Dinner,
    #[serde(alias = "Snack")]
    Snack,
    #[serde(alias = "Pre-Workout", alias = "pre-workout")]
    PreWorkout,
    #[serde(alias = "Post-Workout", alias = "post-workout")]
    PostWorkout,
}

impl MealType {
    pub const ALL: [MealType; 6] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
        MealType::PreWorkout,
        MealType::PostWorkout,
    ];

    /// Slots that share the daily calorie target when no override exists
    pub const CANONICAL_SLOTS: [MealType; 3] =
        [MealType::Breakfast, MealType::Lunch, MealType::Dinner];

    pub fn label(&self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
            MealType::Snack => "Snack",
            MealType::PreWorkout => "Pre-Workout",
            MealType::PostWorkout => "Post-Workout",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// User Profile
// ============================================================================

/// User profile captured at onboarding
///
/// Every derived target is a pure function of this struct; see
/// [`crate::health_metrics::derive_targets`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(alias = "fullname")]
    pub full_name: String,
    /// Age in years
    pub age: i32,
    pub gender: Gender,
    /// Height in centimeters
    #[serde(alias = "height")]
    pub height_cm: f64,
    /// Weight in kilograms
    #[serde(alias = "weight")]
    pub weight_kg: f64,
    #[serde(alias = "fitnessGoal")]
    pub fitness_goal: FitnessGoal,
    #[serde(alias = "dietaryPreference")]
    pub dietary_preference: DietaryPreference,
    #[serde(alias = "activityLevel")]
    pub activity_level: ActivityLevel,
    #[serde(alias = "equipmentAccess")]
    pub equipment_access: EquipmentAccess,
    #[serde(alias = "mealsPerDay")]
    pub meals_per_day: u32,
    /// Per-slot calorie overrides; replaces the even split when present
    #[serde(default, alias = "mealTargets", skip_serializing_if = "Option::is_none")]
    pub meal_targets: Option<BTreeMap<MealType, i64>>,
    /// Manual calorie target; bypasses the formulas when present
    #[serde(
        default,
        alias = "manualTargetCalories",
        skip_serializing_if = "Option::is_none"
    )]
    pub manual_target_calories: Option<i64>,
}

impl UserProfile {
    /// Initials of the first and last name parts, "NA" when the name is blank
    pub fn initials(&self) -> String {
        let parts: Vec<&str> = self.full_name.split_whitespace().collect();
        let first = parts.first().and_then(|p| p.chars().next());
        let last = parts.get(1..).and_then(|rest| rest.last()).and_then(|p| p.chars().next());

        match (first, last) {
            (Some(f), Some(l)) => format!("{}{}", f.to_uppercase(), l.to_uppercase()),
            (Some(f), None) => f.to_uppercase().to_string(),
            _ => "NA".to_string(),
        }
    }
}

// ============================================================================
// Meals and Foods
// ============================================================================

/// A logged meal. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealRecord {
    pub id: String,
    #[serde(alias = "type")]
    pub meal_type: MealType,
    pub name: String,
    pub calories: Decimal,
    pub carb: Decimal,
    pub protein: Decimal,
    pub fat: Decimal,
    #[serde(alias = "date")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub quantity: Decimal,
}

impl MealRecord {
    /// Create a record with a fresh identifier
    pub fn new(
        meal_type: MealType,
        name: impl Into<String>,
        calories: Decimal,
        carb: Decimal,
        protein: Decimal,
        fat: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            meal_type,
            name: name.into(),
            calories,
            carb,
            protein,
            fat,
            timestamp,
            notes: String::new(),
            quantity: Decimal::ZERO,
        }
    }
}

/// Food catalog entry; nutrient values are per 100 g
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub name: String,
    pub calories: Decimal,
    pub carb: Decimal,
    pub protein: Decimal,
    pub fat: Decimal,
}

// ============================================================================
// Workouts
// ============================================================================

/// One set of an exercise: reps done last time and reps planned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SetDetail {
    pub prev: u32,
    #[serde(alias = "rep")]
    pub reps: u32,
}

/// Exercise inside a routine, sets keyed by set number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub sets: BTreeMap<u32, SetDetail>,
}

impl Exercise {
    /// Exercise with the single default set (60 previous, 8 reps)
    pub fn with_default_sets(name: impl Into<String>) -> Self {
        let mut sets = BTreeMap::new();
        sets.insert(1, SetDetail { prev: 60, reps: 8 });
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            sets,
        }
    }
}

/// Saved workout routine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutRoutine {
    pub id: String,
    pub title: String,
    pub category: String,
    pub exercises: Vec<Exercise>,
    pub time: DateTime<Utc>,
    /// Duration in seconds
    #[serde(default)]
    pub duration: u32,
}

/// Exercise description from the `workout_info` catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseDescription {
    #[serde(alias = "Title")]
    pub title: String,
    #[serde(alias = "Desc")]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn profile_json(gender: &str, goal: &str, activity: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "u1",
            "fullname": "Charles Leclerc",
            "age": 27,
            "gender": gender,
            "height": 50,
            "weight": 100,
            "fitnessGoal": goal,
            "dietaryPreference": "None",
            "activityLevel": activity,
            "equipmentAccess": "None",
            "mealsPerDay": 2
        })
    }

    #[test]
    fn test_profile_accepts_onboarding_spellings() {
        let profile: UserProfile =
            serde_json::from_value(profile_json("Male", "Lose weight", "Moderately active"))
                .unwrap();

        assert_eq!(profile.gender, Gender::Male);
        assert_eq!(profile.fitness_goal, FitnessGoal::LoseWeight);
        assert_eq!(profile.activity_level, ActivityLevel::ModeratelyActive);
        assert_eq!(profile.equipment_access, EquipmentAccess::None);
        assert_eq!(profile.height_cm, 50.0);
        assert!(profile.meal_targets.is_none());
        assert!(profile.manual_target_calories.is_none());
    }

    #[test]
    fn test_unrecognized_values_are_kept_verbatim() {
        let profile: UserProfile =
            serde_json::from_value(profile_json("Nonbinary", "Strength", "Couch")).unwrap();

        assert_eq!(profile.gender, Gender::Other("Nonbinary".to_string()));
        assert_eq!(profile.fitness_goal, FitnessGoal::Other("Strength".to_string()));
        assert_eq!(profile.activity_level.multiplier(), 1.0);

        let back = serde_json::to_value(&profile).unwrap();
        assert_eq!(back["fitness_goal"], "Strength");
    }

    #[rstest]
    #[case("Weights and Machines", EquipmentAccess::WeightsAndMachines)]
    #[case("both", EquipmentAccess::WeightsAndMachines)]
    #[case("Machines", EquipmentAccess::Machines)]
    #[case("weights", EquipmentAccess::Weights)]
    fn test_equipment_spellings(#[case] raw: &str, #[case] expected: EquipmentAccess) {
        assert_eq!(EquipmentAccess::from(raw.to_string()), expected);
    }

    #[test]
    fn test_meal_type_aliases() {
        let t: MealType = serde_json::from_str("\"Pre-Workout\"").unwrap();
        assert_eq!(t, MealType::PreWorkout);
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"pre_workout\"");
        assert!(MealType::Breakfast < MealType::Dinner);
    }

    #[test]
    fn test_meal_targets_map_keys() {
        let mut targets = BTreeMap::new();
        targets.insert(MealType::Breakfast, 500);
        targets.insert(MealType::Snack, 200);
        let json = serde_json::to_string(&targets).unwrap();
        let back: BTreeMap<MealType, i64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, targets);
    }

    #[rstest]
    #[case("Charles Leclerc", "CL")]
    #[case("ada", "A")]
    #[case("  ", "NA")]
    #[case("Jean Claude Van Damme", "JD")]
    fn test_initials(#[case] name: &str, #[case] expected: &str) {
        let mut profile: UserProfile =
            serde_json::from_value(profile_json("Male", "Lose weight", "Sedentary")).unwrap();
        profile.full_name = name.to_string();
        assert_eq!(profile.initials(), expected);
    }

    #[test]
    fn test_default_exercise_set() {
        let exercise = Exercise::with_default_sets("Barbell Bench");
        assert_eq!(exercise.sets.len(), 1);
        assert_eq!(exercise.sets[&1], SetDetail { prev: 60, reps: 8 });
    }
}
