//! Input validation functions
//!
//! This module provides validation utilities for user input.
//! Request DTOs use the `validator` crate derive; the functions here cover
//! whole profiles and values that arrive outside a DTO.

use rust_decimal::Decimal;

use crate::models::UserProfile;

/// Validate weight value (in kg)
pub fn validate_weight(weight_kg: f64) -> Result<(), String> {
    if weight_kg.is_nan() || weight_kg.is_infinite() {
        return Err("Weight must be a valid number".to_string());
    }
    if weight_kg < 20.0 {
        return Err("Weight must be at least 20 kg".to_string());
    }
    if weight_kg > 500.0 {
        return Err("Weight must be at most 500 kg".to_string());
    }
    Ok(())
}

/// Validate height value (in cm)
/// Valid range: 50-300 cm
pub fn validate_height_cm(height_cm: f64) -> Result<(), String> {
    if height_cm.is_nan() || height_cm.is_infinite() {
        return Err("Height must be a valid number".to_string());
    }
    if height_cm < 50.0 {
        return Err("Height must be at least 50 cm".to_string());
    }
    if height_cm > 300.0 {
        return Err("Height must be at most 300 cm".to_string());
    }
    Ok(())
}

/// Validate age in years
pub fn validate_age(age: i32) -> Result<(), String> {
    if age < 1 {
        return Err("Age must be at least 1 year".to_string());
    }
    if age > 120 {
        return Err("Age cannot exceed 120 years".to_string());
    }
    Ok(())
}

/// Validate meals per day (the onboarding stepper allows 1 to 10)
pub fn validate_meals_per_day(meals: u32) -> Result<(), String> {
    if !(1..=10).contains(&meals) {
        return Err("Meals per day must be between 1 and 10".to_string());
    }
    Ok(())
}

/// Validate a nutrient amount (kcal or grams)
pub fn validate_nutrient(value: Decimal) -> Result<(), String> {
    if value < Decimal::ZERO {
        return Err("Value cannot be negative".to_string());
    }
    if value > Decimal::from(50_000) {
        return Err("Value unreasonably high".to_string());
    }
    Ok(())
}

/// Validate a stored profile before it is written back
pub fn validate_profile(profile: &UserProfile) -> Result<(), ValidationError> {
    validate_age(profile.age).map_err(|m| ValidationError::new("age", &m))?;
    validate_height_cm(profile.height_cm).map_err(|m| ValidationError::new("height_cm", &m))?;
    validate_weight(profile.weight_kg).map_err(|m| ValidationError::new("weight_kg", &m))?;
    validate_meals_per_day(profile.meals_per_day)
        .map_err(|m| ValidationError::new("meals_per_day", &m))?;
    if let Some(targets) = &profile.meal_targets {
        if targets.values().any(|&kcal| kcal < 0) {
            return Err(ValidationError::new(
                "meal_targets",
                "Meal targets cannot be negative",
            ));
        }
    }
    Ok(())
}

// ============================================================================
// User-Friendly Field Labels
// ============================================================================

/// Map technical field names to user-friendly display labels
pub fn get_field_display_label(field_name: &str) -> &str {
    match field_name {
        "full_name" => "Full Name",
        "age" => "Age",
        "weight" | "weight_kg" => "Weight",
        "height" | "height_cm" => "Height",
        "gender" => "Gender",
        "fitness_goal" => "Fitness Goal",
        "dietary_preference" => "Dietary Preference",
        "activity_level" => "Activity Level",
        "equipment_access" => "Equipment Access",
        "meals_per_day" => "Meals per Day",
        "meal_targets" => "Meal Targets",
        "manual_target_calories" => "Calorie Target",
        "calories" => "Calories",
        "carb" => "Carbs",
        "protein" => "Protein",
        "fat" => "Fat",
        _ => field_name,
    }
}

/// Validation error with field context
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub display_label: String,
}

impl ValidationError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
            display_label: get_field_display_label(field).to_string(),
        }
    }

    /// Format as user-friendly error message
    pub fn user_message(&self) -> String {
        format!("{}: {}", self.display_label, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ActivityLevel, DietaryPreference, EquipmentAccess, FitnessGoal, Gender,
    };
    use proptest::prelude::*;

    fn profile() -> UserProfile {
        UserProfile {
            id: "u1".to_string(),
            full_name: "Test User".to_string(),
            age: 27,
            gender: Gender::Male,
            height_cm: 50.0,
            weight_kg: 100.0,
            fitness_goal: FitnessGoal::BuildMuscle,
            dietary_preference: DietaryPreference::None,
            activity_level: ActivityLevel::Sedentary,
            equipment_access: EquipmentAccess::Weights,
            meals_per_day: 3,
            meal_targets: None,
            manual_target_calories: None,
        }
    }

    #[test]
    fn test_validate_weight() {
        assert!(validate_weight(70.0).is_ok());
        assert!(validate_weight(20.0).is_ok());
        assert!(validate_weight(500.0).is_ok());
        assert!(validate_weight(10.0).is_err());
        assert!(validate_weight(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_height_cm() {
        assert!(validate_height_cm(170.0).is_ok());
        assert!(validate_height_cm(50.0).is_ok());
        assert!(validate_height_cm(49.9).is_err());
        assert!(validate_height_cm(f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_meals_per_day() {
        assert!(validate_meals_per_day(1).is_ok());
        assert!(validate_meals_per_day(10).is_ok());
        assert!(validate_meals_per_day(0).is_err());
        assert!(validate_meals_per_day(11).is_err());
    }

    #[test]
    fn test_validate_nutrient() {
        assert!(validate_nutrient(Decimal::new(125, 1)).is_ok());
        assert!(validate_nutrient(Decimal::from(-1)).is_err());
    }

    #[test]
    fn test_validate_profile_reports_field() {
        assert!(validate_profile(&profile()).is_ok());

        let mut bad = profile();
        bad.meals_per_day = 0;
        let err = validate_profile(&bad).unwrap_err();
        assert_eq!(err.field, "meals_per_day");
        assert_eq!(
            err.user_message(),
            "Meals per Day: Meals per day must be between 1 and 10"
        );
    }

    #[test]
    fn test_field_labels() {
        assert_eq!(get_field_display_label("height_cm"), "Height");
        assert_eq!(get_field_display_label("unknown_field"), "unknown_field");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: every age in range validates
        #[test]
        fn prop_valid_ages(age in 1i32..=120) {
            prop_assert!(validate_age(age).is_ok());
        }

        /// Property: negative nutrients never validate
        #[test]
        fn prop_negative_nutrients_rejected(v in 1i64..100_000) {
            prop_assert!(validate_nutrient(Decimal::from(-v)).is_err());
        }
    }
}
