//! Application state management
//!
//! This module provides the shared application state that is passed
//! to all request handlers via Axum's state extraction.
//!
//! # Design Principles
//!
//! 1. **One owner per read model**: the meal tracker and health aggregator
//!    are created once and shared behind `Arc`
//! 2. **Cheap cloning**: All fields use Arc or are already Clone-cheap
//! 3. **Collaborators behind traits**: store, health provider and classifier
//!    are swapped for in-memory versions in tests

use std::sync::Arc;

use crate::config::AppConfig;
use crate::providers::{Classifier, HealthDataProvider};
use crate::repositories::DocumentStore;
use crate::services::{HealthAggregator, MealTracker, RecommendationService};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Document store backing profiles, meals, workouts and catalogs
    pub store: Arc<dyn DocumentStore>,
    /// Day-bucketed meal read model
    pub meals: Arc<MealTracker>,
    /// Health metric snapshots
    pub health: Arc<HealthAggregator>,
    pub recommender: Arc<RecommendationService>,
}

impl AppState {
    /// Wire the services around their collaborators
    pub fn new(
        config: AppConfig,
        store: Arc<dyn DocumentStore>,
        provider: Arc<dyn HealthDataProvider>,
        classifier: Arc<dyn Classifier>,
    ) -> Self {
        let offset = config.session.offset();
        let meals = MealTracker::new(Arc::clone(&store), config.session.user_id.clone(), offset);
        let health = HealthAggregator::new(provider, offset, config.health.daily_steps_goal);
        let recommender = RecommendationService::new(classifier, config.recommender.clone());

        Self {
            config: Arc::new(config),
            store,
            meals: Arc::new(meals),
            health: Arc::new(health),
            recommender: Arc::new(recommender),
        }
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[inline]
    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    /// The user this instance serves
    #[inline]
    pub fn user_id(&self) -> &str {
        &self.config.session.user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{DisabledClassifier, InMemoryHealthProvider};
    use crate::repositories::InMemoryDocumentStore;

    fn state() -> AppState {
        AppState::new(
            AppConfig::default(),
            Arc::new(InMemoryDocumentStore::new()),
            Arc::new(InMemoryHealthProvider::new()),
            Arc::new(DisabledClassifier),
        )
    }

    #[test]
    fn test_state_clone_shares_services() {
        let state = state();
        let cloned = state.clone();
        assert!(Arc::ptr_eq(&state.meals, &cloned.meals));
        assert!(Arc::ptr_eq(&state.health, &cloned.health));
    }

    #[test]
    fn test_user_id_from_session() {
        assert_eq!(state().user_id(), "local");
    }
}
