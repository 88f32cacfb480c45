//! Profile metrics calculations module
//!
//! Turns a [`UserProfile`] into energy and macro targets.
//!
//! # Design Principles
//!
//! 1. **Pure Functions**: All calculations are pure, no side effects
//! 2. **Recompute on Read**: Targets are never cached or stored
//! 3. **Integer kcal**: Every result is ceiling-rounded to whole kcal/grams
//! 4. **Lenient Inputs**: Unrecognized profile values map to documented defaults

use serde::{Deserialize, Serialize};

use crate::models::{ActivityLevel, FitnessGoal, Gender, UserProfile};

// ============================================================================
// BMR and TDEE Calculations
// ============================================================================

/// Calculate Basal Metabolic Rate using the revised Harris-Benedict equation
///
/// Men: BMR = 88.362 + 13.397 × weight(kg) + 4.799 × height(cm) - 5.677 × age(y)
/// Women: BMR = 447.593 + 9.247 × weight(kg) + 3.098 × height(cm) - 4.330 × age(y)
///
/// Other genders yield 0. Results are not clamped, so extreme inputs can
/// produce a negative BMR.
pub fn compute_bmr(profile: &UserProfile) -> i64 {
    let w = profile.weight_kg;
    let h = profile.height_cm;
    let age = profile.age as f64;

    let bmr = match profile.gender {
        Gender::Male => 88.362 + 13.397 * w + 4.799 * h - 5.677 * age,
        Gender::Female => 447.593 + 9.247 * w + 3.098 * h - 4.330 * age,
        Gender::Other(_) => 0.0,
    };

    bmr.ceil() as i64
}

/// Calculate Total Daily Energy Expenditure
///
/// TDEE = BMR × activity multiplier, ceiling-rounded
pub fn compute_tdee(bmr: i64, activity: &ActivityLevel) -> i64 {
    (bmr as f64 * activity.multiplier()).ceil() as i64
}

// ============================================================================
// Calorie Targets
// ============================================================================

/// Daily calorie intake target
///
/// A manual override is returned unchanged.
pub fn compute_target_calories(
    tdee: i64,
    goal: &FitnessGoal,
    manual_override: Option<i64>,
) -> i64 {
    if let Some(target) = manual_override {
        return target;
    }

    match goal {
        FitnessGoal::LoseWeight => (tdee as f64 * 0.85).ceil() as i64,
        FitnessGoal::BuildMuscle => tdee + 500,
        FitnessGoal::ImproveEndurance => tdee + 200,
        FitnessGoal::GeneralFitness | FitnessGoal::Other(_) => tdee,
    }
}

/// Daily active calorie burn target
pub fn compute_target_cal_burn(goal: &FitnessGoal) -> i64 {
    match goal {
        FitnessGoal::LoseWeight => 500,
        FitnessGoal::BuildMuscle => 300,
        FitnessGoal::ImproveEndurance => 800,
        FitnessGoal::GeneralFitness => 400,
        FitnessGoal::Other(_) => 0,
    }
}

// ============================================================================
// Macro Targets
// ============================================================================

/// Macronutrient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Macro {
    Protein,
    Fat,
    Carbs,
}

impl Macro {
    /// Energy density in kcal per gram
    pub fn kcal_per_gram(&self) -> f64 {
        match self {
            Macro::Protein | Macro::Carbs => 4.0,
            Macro::Fat => 9.0,
        }
    }

    /// Share of the calorie target assigned to this macro for a goal
    pub fn ratio(&self, goal: &FitnessGoal) -> f64 {
        match (self, goal) {
            (_, FitnessGoal::Other(_)) => 0.0,
            (Macro::Protein, FitnessGoal::LoseWeight | FitnessGoal::BuildMuscle) => 0.3,
            (Macro::Protein, FitnessGoal::ImproveEndurance) => 0.2,
            (Macro::Protein, FitnessGoal::GeneralFitness) => 0.25,
            (Macro::Fat, FitnessGoal::LoseWeight | FitnessGoal::GeneralFitness) => 0.3,
            (Macro::Fat, FitnessGoal::BuildMuscle | FitnessGoal::ImproveEndurance) => 0.2,
            (Macro::Carbs, FitnessGoal::LoseWeight) => 0.4,
            (Macro::Carbs, FitnessGoal::BuildMuscle) => 0.5,
            (Macro::Carbs, FitnessGoal::ImproveEndurance) => 0.6,
            (Macro::Carbs, FitnessGoal::GeneralFitness) => 0.45,
        }
    }
}

/// Grams of a macro for a calorie target, ceiling-rounded
pub fn compute_macro_grams(target_calories: i64, goal: &FitnessGoal, nutrient: Macro) -> i64 {
    let kcal = target_calories as f64 * nutrient.ratio(goal);
    (kcal / nutrient.kcal_per_gram()).ceil() as i64
}

// ============================================================================
// Derived Targets
// ============================================================================

/// Everything derived from a profile. Computed on every read, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedTargets {
    pub bmr: i64,
    pub tdee: i64,
    pub target_calories: i64,
    pub protein_grams: i64,
    pub fat_grams: i64,
    pub carb_grams: i64,
    pub target_calories_burned: i64,
}

/// Compute the full set of targets for a profile
pub fn derive_targets(profile: &UserProfile) -> DerivedTargets {
    let bmr = compute_bmr(profile);
    let tdee = compute_tdee(bmr, &profile.activity_level);
    let goal = &profile.fitness_goal;
    let target_calories = compute_target_calories(tdee, goal, profile.manual_target_calories);

    DerivedTargets {
        bmr,
        tdee,
        target_calories,
        protein_grams: compute_macro_grams(target_calories, goal, Macro::Protein),
        fat_grams: compute_macro_grams(target_calories, goal, Macro::Fat),
        carb_grams: compute_macro_grams(target_calories, goal, Macro::Carbs),
        target_calories_burned: compute_target_cal_burn(goal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DietaryPreference, EquipmentAccess};
    use proptest::prelude::*;
    use rstest::rstest;

    fn profile(gender: Gender, weight: f64, height: f64, age: i32) -> UserProfile {
        UserProfile {
            id: "u1".to_string(),
            full_name: "Test User".to_string(),
            age,
            gender,
            height_cm: height,
            weight_kg: weight,
            fitness_goal: FitnessGoal::LoseWeight,
            dietary_preference: DietaryPreference::None,
            activity_level: ActivityLevel::Sedentary,
            equipment_access: EquipmentAccess::None,
            meals_per_day: 3,
            meal_targets: None,
            manual_target_calories: None,
        }
    }

    // =========================================================================
    // BMR / TDEE Tests
    // =========================================================================

    #[test]
    fn test_bmr_male_reference() {
        // 88.362 + 1339.7 + 239.95 - 153.279 = 1514.733
        let p = profile(Gender::Male, 100.0, 50.0, 27);
        assert_eq!(compute_bmr(&p), 1515);
    }

    #[test]
    fn test_bmr_other_gender_is_zero() {
        let p = profile(Gender::Other("x".to_string()), 100.0, 180.0, 30);
        assert_eq!(compute_bmr(&p), 0);
        assert_eq!(compute_tdee(0, &ActivityLevel::VeryActive), 0);
    }

    #[test]
    fn test_bmr_not_clamped() {
        let p = profile(Gender::Male, 0.0, 0.0, 120);
        assert!(compute_bmr(&p) < 0);
    }

    #[rstest]
    #[case(ActivityLevel::Sedentary, 1200)]
    #[case(ActivityLevel::LightlyActive, 1375)]
    #[case(ActivityLevel::ModeratelyActive, 1550)]
    #[case(ActivityLevel::VeryActive, 1725)]
    #[case(ActivityLevel::Other("couch".to_string()), 1000)]
    fn test_tdee_multipliers(#[case] level: ActivityLevel, #[case] expected: i64) {
        assert_eq!(compute_tdee(1000, &level), expected);
    }

    // =========================================================================
    // Calorie Target Tests
    // =========================================================================

    #[rstest]
    #[case(FitnessGoal::LoseWeight, 1700)]
    #[case(FitnessGoal::BuildMuscle, 2500)]
    #[case(FitnessGoal::ImproveEndurance, 2200)]
    #[case(FitnessGoal::GeneralFitness, 2000)]
    #[case(FitnessGoal::Other("?".to_string()), 2000)]
    fn test_target_calories_by_goal(#[case] goal: FitnessGoal, #[case] expected: i64) {
        assert_eq!(compute_target_calories(2000, &goal, None), expected);
    }

    #[test]
    fn test_manual_override_wins() {
        assert_eq!(
            compute_target_calories(2000, &FitnessGoal::BuildMuscle, Some(1800)),
            1800
        );
    }

    #[rstest]
    #[case(FitnessGoal::LoseWeight, 500)]
    #[case(FitnessGoal::BuildMuscle, 300)]
    #[case(FitnessGoal::ImproveEndurance, 800)]
    #[case(FitnessGoal::GeneralFitness, 400)]
    #[case(FitnessGoal::Other("?".to_string()), 0)]
    fn test_target_cal_burn(#[case] goal: FitnessGoal, #[case] expected: i64) {
        assert_eq!(compute_target_cal_burn(&goal), expected);
    }

    // =========================================================================
    // Macro Tests
    // =========================================================================

    #[test]
    fn test_protein_rounds_up() {
        // 2001 × 0.3 / 4 = 150.075
        assert_eq!(compute_macro_grams(2001, &FitnessGoal::LoseWeight, Macro::Protein), 151);
    }

    #[rstest]
    #[case(FitnessGoal::BuildMuscle, Macro::Fat, 45)]
    #[case(FitnessGoal::ImproveEndurance, Macro::Carbs, 300)]
    #[case(FitnessGoal::GeneralFitness, Macro::Protein, 125)]
    #[case(FitnessGoal::GeneralFitness, Macro::Carbs, 225)]
    #[case(FitnessGoal::Other("?".to_string()), Macro::Carbs, 0)]
    fn test_macro_table(#[case] goal: FitnessGoal, #[case] nutrient: Macro, #[case] expected: i64) {
        assert_eq!(compute_macro_grams(2000, &goal, nutrient), expected);
    }

    #[test]
    fn test_derive_targets_respects_override() {
        let mut p = profile(Gender::Male, 100.0, 50.0, 27);
        p.manual_target_calories = Some(1800);
        let targets = derive_targets(&p);

        assert_eq!(targets.bmr, 1515);
        assert_eq!(targets.target_calories, 1800);
        assert_eq!(targets.protein_grams, 135);
        assert_eq!(targets.fat_grams, 60);
        assert_eq!(targets.carb_grams, 180);
        assert_eq!(targets.target_calories_burned, 500);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: Male BMR > Female BMR for typical adult stats
        #[test]
        fn prop_male_bmr_higher(
            weight in 60.0f64..120.0,
            height in 150.0f64..200.0,
            age in 18i32..60
        ) {
            let male = compute_bmr(&profile(Gender::Male, weight, height, age));
            let female = compute_bmr(&profile(Gender::Female, weight, height, age));
            prop_assert!(male > female);
        }

        /// Property: TDEE never falls below BMR for recognized levels
        #[test]
        fn prop_tdee_at_least_bmr(bmr in 0i64..5000) {
            prop_assert!(compute_tdee(bmr, &ActivityLevel::Sedentary) >= bmr);
        }

        /// Property: the override is returned exactly, whatever the goal
        #[test]
        fn prop_override_identity(tdee in 0i64..6000, target in -1000i64..6000) {
            prop_assert_eq!(
                compute_target_calories(tdee, &FitnessGoal::ImproveEndurance, Some(target)),
                target
            );
        }
    }
}
