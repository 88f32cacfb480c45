//! Recommendation service - workout suggestions from the classifier
//!
//! Each body-part slot runs one classifier call. A slot that fails shows
//! placeholders and never affects the other slots.

use std::sync::Arc;

use chrono::Utc;
use gains_tracker_shared::recommendation::{
    equipment_label_for, exercise_type_for, filter_routines, rank_titles, routine_from_slot,
    sample_body_parts, ExerciseFeatures, SlotRecommendation, EXERCISE_TITLES, PLACEHOLDER,
};
use gains_tracker_shared::types::WorkoutsResponse;
use gains_tracker_shared::{UserProfile, WorkoutRoutine};
use tracing::{info, warn};

use crate::config::RecommenderConfig;
use crate::error::ApiError;
use crate::providers::Classifier;
use crate::repositories::{DocumentStore, WorkoutRepository};

pub const ROUTINES_UNAVAILABLE_ADVISORY: &str = "Saved workouts are unavailable right now";

pub struct RecommendationService {
    classifier: Arc<dyn Classifier>,
    config: RecommenderConfig,
    titles: Vec<String>,
}

impl RecommendationService {
    pub fn new(classifier: Arc<dyn Classifier>, config: RecommenderConfig) -> Self {
        let titles = if config.exercise_titles.is_empty() {
            EXERCISE_TITLES.iter().map(|t| t.to_string()).collect()
        } else {
            info!(count = config.exercise_titles.len(), "Using configured exercise titles");
            config.exercise_titles.clone()
        };
        Self {
            classifier,
            config,
            titles,
        }
    }

    /// Feature vector of one slot
    pub fn features_for(&self, profile: &UserProfile, body_part: &str) -> ExerciseFeatures {
        let mut rng = rand::thread_rng();
        ExerciseFeatures {
            exercise_type: exercise_type_for(&profile.fitness_goal).to_string(),
            body_part: body_part.to_string(),
            equipment: equipment_label_for(&profile.equipment_access, &mut rng),
            level: self.config.level.clone(),
            rating: self.config.rating,
        }
    }

    /// Recommend exercises for the given body parts, or a random sample
    pub async fn recommend(
        &self,
        profile: &UserProfile,
        body_parts: Option<Vec<String>>,
    ) -> Vec<SlotRecommendation> {
        // Random draws stay out of the await points below
        let slots: Vec<ExerciseFeatures> = {
            let parts = body_parts.unwrap_or_else(|| {
                sample_body_parts(self.config.slot_count, &mut rand::thread_rng())
            });
            parts
                .iter()
                .map(|part| self.features_for(profile, part))
                .collect()
        };

        let mut results = Vec::with_capacity(slots.len());
        for features in &slots {
            results.push(self.recommend_slot(features).await);
        }

        let failed = results.iter().filter(|r| r.is_failed()).count();
        info!(slots = results.len(), failed, "Recommendations computed");
        results
    }

    async fn recommend_slot(&self, features: &ExerciseFeatures) -> SlotRecommendation {
        let outcome = match self.classifier.predict(features).await {
            Ok(probabilities) => {
                rank_titles(&probabilities, &self.titles).map_err(|e| e.to_string())
            }
            Err(e) => Err(e.to_string()),
        };

        match outcome {
            Ok(titles) => SlotRecommendation::Ranked {
                body_part: features.body_part.clone(),
                titles,
            },
            Err(reason) => {
                warn!(body_part = %features.body_part, %reason, "Recommendation slot failed");
                metrics::counter!("gains_tracker_classifier_failures_total").increment(1);
                SlotRecommendation::failed(features.body_part.clone(), reason)
            }
        }
    }

    /// Persist a slot as a routine in the user's workout collection
    pub async fn save_routine(
        store: &dyn DocumentStore,
        user_id: &str,
        body_part: &str,
        titles: &[String],
    ) -> Result<WorkoutRoutine, ApiError> {
        if titles.iter().all(|t| t == PLACEHOLDER) {
            return Err(ApiError::validation("Routine has no exercises"));
        }

        let routine = routine_from_slot(body_part, titles, Utc::now());
        WorkoutRepository::save(store, user_id, &routine).await?;
        info!(routine_id = %routine.id, body_part, "Routine saved");
        Ok(routine)
    }

    /// Saved routines, newest first, filtered by category and query
    pub async fn list_routines(
        store: &dyn DocumentStore,
        user_id: &str,
        category: Option<&str>,
        query: Option<&str>,
    ) -> WorkoutsResponse {
        match WorkoutRepository::list(store, user_id).await {
            Ok(routines) => WorkoutsResponse {
                routines: filter_routines(&routines, category, query)
                    .into_iter()
                    .cloned()
                    .collect(),
                advisory: None,
            },
            Err(e) => {
                warn!(error = %e, "Listing routines failed");
                WorkoutsResponse {
                    routines: Vec::new(),
                    advisory: Some(ROUTINES_UNAVAILABLE_ADVISORY.to_string()),
                }
            }
        }
    }
}
