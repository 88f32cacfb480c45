//! Catalog service - food and exercise lookups
//!
//! Searches never fail: an unreachable store yields an empty list with an
//! advisory for the caller to show.

use gains_tracker_shared::types::{ExerciseSearchResponse, FoodSearchResponse, PortionResponse};
use gains_tracker_shared::units::portion_or_base;
use gains_tracker_shared::FoodUnit;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::repositories::{DocumentStore, ExerciseRepository, FoodRepository};

/// Maximum number of search hits returned
pub const SEARCH_LIMIT: usize = 10;

pub const SEARCH_UNAVAILABLE_ADVISORY: &str = "Search is unavailable right now";

pub struct CatalogService;

impl CatalogService {
    /// Food catalog prefix search on the lowercased query
    pub async fn search_foods(store: &dyn DocumentStore, query: &str) -> FoodSearchResponse {
        let prefix = query.trim().to_lowercase();
        if prefix.is_empty() {
            return FoodSearchResponse {
                results: Vec::new(),
                advisory: None,
            };
        }

        match FoodRepository::search_prefix(store, &prefix, SEARCH_LIMIT).await {
            Ok(results) => {
                debug!(query = %prefix, hits = results.len(), "Food search");
                FoodSearchResponse {
                    results,
                    advisory: None,
                }
            }
            Err(e) => {
                warn!(error = %e, "Food search failed");
                FoodSearchResponse {
                    results: Vec::new(),
                    advisory: Some(SEARCH_UNAVAILABLE_ADVISORY.to_string()),
                }
            }
        }
    }

    /// Exercise description prefix search; titles are matched as typed
    pub async fn search_exercises(store: &dyn DocumentStore, query: &str) -> ExerciseSearchResponse {
        let prefix = query.trim();
        if prefix.is_empty() {
            return ExerciseSearchResponse {
                results: Vec::new(),
                advisory: None,
            };
        }

        match ExerciseRepository::search_prefix(store, prefix, SEARCH_LIMIT).await {
            Ok(results) => ExerciseSearchResponse {
                results,
                advisory: None,
            },
            Err(e) => {
                warn!(error = %e, "Exercise search failed");
                ExerciseSearchResponse {
                    results: Vec::new(),
                    advisory: Some(SEARCH_UNAVAILABLE_ADVISORY.to_string()),
                }
            }
        }
    }

    /// Scale a catalog food to a quantity; unusable quantity text reverts
    /// to the per-100 g values
    pub async fn portion(
        store: &dyn DocumentStore,
        food_name: &str,
        quantity: &str,
        unit: FoodUnit,
    ) -> Result<PortionResponse, ApiError> {
        let food = FoodRepository::find(store, food_name)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Food '{}' not found", food_name)))?;

        let (portion, error) = portion_or_base(&food, quantity, unit);
        Ok(PortionResponse {
            food: food.name,
            quantity: quantity.to_string(),
            unit,
            portion,
            reverted: error.is_some(),
            advisory: error.map(|e| e.advisory()),
        })
    }
}
