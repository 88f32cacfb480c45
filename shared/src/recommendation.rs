//! Workout recommendation mapping
//!
//! Maps qualitative profile attributes onto the classifier's feature
//! vocabulary, ranks its output and turns a ranked slot into a routine.
//! The classifier call itself lives in the backend.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::{EquipmentAccess, Exercise, FitnessGoal, WorkoutRoutine};

/// Placeholder title shown for a failed slot
pub const PLACEHOLDER: &str = "—";

/// Number of titles returned per slot
pub const TOP_K: usize = 3;

/// Body parts known to the classifier
pub const BODY_PARTS: [&str; 17] = [
    "Abdominals",
    "Adductors",
    "Abductors",
    "Biceps",
    "Calves",
    "Chest",
    "Forearms",
    "Glutes",
    "Hamstrings",
    "Lats",
    "Lower Back",
    "Middle Back",
    "Traps",
    "Neck",
    "Quadriceps",
    "Shoulders",
    "Triceps",
];

/// Free-weight equipment labels
pub const FREE_WEIGHTS: [&str; 7] = [
    "Barbell",
    "Dumbbell",
    "E-Z Curl Bar",
    "Exercise Ball",
    "Foam Roll",
    "Kettlebells",
    "Medicine Ball",
];

/// Default exercise titles, indexed by classifier output position.
///
/// This is the label order of the bundled workout model. A deployment whose
/// model emits a different order supplies its own table in configuration.
pub const EXERCISE_TITLES: [&str; 32] = [
    "Barbell Bench Press",
    "Dumbbell Bench Press",
    "Incline Dumbbell Press",
    "Cable Crossover",
    "Push-Up",
    "Barbell Deadlift",
    "Romanian Deadlift",
    "Barbell Back Squat",
    "Goblet Squat",
    "Walking Lunge",
    "Leg Press",
    "Leg Extension",
    "Lying Leg Curl",
    "Standing Calf Raise",
    "Seated Calf Raise",
    "Hip Thrust",
    "Cable Hip Abduction",
    "Cable Hip Adduction",
    "Pull-Up",
    "Lat Pulldown",
    "Seated Cable Row",
    "Bent Over Barbell Row",
    "Barbell Shrug",
    "Overhead Press",
    "Lateral Raise",
    "Barbell Curl",
    "E-Z Bar Curl",
    "Triceps Pushdown",
    "Wrist Curl",
    "Plank",
    "Kettlebell Swing",
    "Box Jump",
];

/// Classifier exercise type for a fitness goal
pub fn exercise_type_for(goal: &FitnessGoal) -> &'static str {
    match goal {
        FitnessGoal::BuildMuscle => "Strength",
        FitnessGoal::LoseWeight => "Cardio",
        FitnessGoal::GeneralFitness => "Plyometrics",
        FitnessGoal::ImproveEndurance => "Cardio",
        FitnessGoal::Other(_) => "Strength",
    }
}

/// Classifier equipment label for the user's equipment access
///
/// Weight access draws a random free-weight label on every call.
pub fn equipment_label_for<R: Rng + ?Sized>(access: &EquipmentAccess, rng: &mut R) -> String {
    match access {
        EquipmentAccess::None => "None".to_string(),
        EquipmentAccess::Weights => FREE_WEIGHTS.choose(rng).unwrap_or(&"Barbell").to_string(),
        EquipmentAccess::Machines => "Cable".to_string(),
        EquipmentAccess::WeightsAndMachines => {
            let index = rng.gen_range(0..=FREE_WEIGHTS.len());
            FREE_WEIGHTS.get(index).copied().unwrap_or("Machine").to_string()
        }
        EquipmentAccess::Other(_) => "Dumbbell".to_string(),
    }
}

/// Random sample of distinct body parts
pub fn sample_body_parts<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<String> {
    BODY_PARTS
        .choose_multiple(rng, count)
        .map(|part| part.to_string())
        .collect()
}

/// Classifier input for one slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseFeatures {
    #[serde(rename = "type")]
    pub exercise_type: String,
    pub body_part: String,
    pub equipment: String,
    pub level: String,
    pub rating: f64,
}

/// Indices of the `k` largest probabilities, highest first
pub fn top_k_indices(probabilities: &[f64], k: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..probabilities.len()).collect();
    indices.sort_by(|&a, &b| probabilities[b].total_cmp(&probabilities[a]));
    indices.truncate(k);
    indices
}

/// Map ranked classifier output to titles from `titles`
///
/// An index outside the title table means the model and lookup disagree,
/// which is a classifier failure for the slot.
pub fn rank_titles<S: AsRef<str>>(
    probabilities: &[f64],
    titles: &[S],
) -> Result<Vec<String>, CoreError> {
    if probabilities.len() < TOP_K {
        return Err(CoreError::ClassifierFailure(format!(
            "expected at least {} probabilities, got {}",
            TOP_K,
            probabilities.len()
        )));
    }

    top_k_indices(probabilities, TOP_K)
        .into_iter()
        .map(|i| {
            titles
                .get(i)
                .map(|title| title.as_ref().to_string())
                .ok_or_else(|| CoreError::ClassifierFailure(format!("index {} out of range", i)))
        })
        .collect()
}

/// Outcome of one recommendation slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SlotRecommendation {
    Ranked {
        body_part: String,
        titles: Vec<String>,
    },
    Failed {
        body_part: String,
        titles: Vec<String>,
        reason: String,
    },
}

impl SlotRecommendation {
    pub fn failed(body_part: impl Into<String>, reason: impl Into<String>) -> Self {
        SlotRecommendation::Failed {
            body_part: body_part.into(),
            titles: vec![PLACEHOLDER.to_string(); TOP_K],
            reason: reason.into(),
        }
    }

    pub fn body_part(&self) -> &str {
        match self {
            SlotRecommendation::Ranked { body_part, .. }
            | SlotRecommendation::Failed { body_part, .. } => body_part,
        }
    }

    pub fn titles(&self) -> &[String] {
        match self {
            SlotRecommendation::Ranked { titles, .. }
            | SlotRecommendation::Failed { titles, .. } => titles,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SlotRecommendation::Failed { .. })
    }
}

// ============================================================================
// Routines
// ============================================================================

/// Build a routine from a slot's titles, one default-set exercise each
pub fn routine_from_slot(body_part: &str, titles: &[String], at: DateTime<Utc>) -> WorkoutRoutine {
    WorkoutRoutine {
        id: Uuid::new_v4().to_string(),
        title: format!("{} Routine", body_part),
        category: body_part.to_string(),
        exercises: titles
            .iter()
            .filter(|t| t.as_str() != PLACEHOLDER)
            .map(Exercise::with_default_sets)
            .collect(),
        time: at,
        duration: 0,
    }
}

/// Filter saved routines by category and a free-text query
///
/// The query matches the title, the category or any exercise name,
/// case-insensitively.
pub fn filter_routines<'a>(
    routines: &'a [WorkoutRoutine],
    category: Option<&str>,
    query: Option<&str>,
) -> Vec<&'a WorkoutRoutine> {
    let query = query.map(str::to_lowercase).filter(|q| !q.is_empty());

    routines
        .iter()
        .filter(|r| match category {
            Some(c) if c != "All" => r.category == c,
            _ => true,
        })
        .filter(|r| match &query {
            Some(q) => {
                r.title.to_lowercase().contains(q)
                    || r.category.to_lowercase().contains(q)
                    || r.exercises.iter().any(|e| e.name.to_lowercase().contains(q))
            }
            None => true,
        })
        .collect()
}
