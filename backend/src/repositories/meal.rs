//! Meal repository - `users/{uid}/meals`

use gains_tracker_shared::MealRecord;
use tracing::warn;

use super::documents::{DocumentStore, StoreError};

pub fn meals_collection(user_id: &str) -> String {
    format!("users/{}/meals", user_id)
}

pub struct MealRepository;

impl MealRepository {
    pub async fn insert(
        store: &dyn DocumentStore,
        user_id: &str,
        meal: &MealRecord,
    ) -> Result<(), StoreError> {
        store
            .set(&meals_collection(user_id), &meal.id, serde_json::to_value(meal)?)
            .await
    }

    /// All meals of a user; undecodable documents are skipped
    pub async fn list(store: &dyn DocumentStore, user_id: &str) -> Result<Vec<MealRecord>, StoreError> {
        let docs = store.list(&meals_collection(user_id)).await?;

        Ok(docs
            .into_iter()
            .filter_map(|doc| match serde_json::from_value::<MealRecord>(doc) {
                Ok(meal) => Some(meal),
                Err(e) => {
                    warn!(error = %e, "Skipping malformed meal document");
                    None
                }
            })
            .collect())
    }

    pub async fn delete(store: &dyn DocumentStore, user_id: &str, meal_id: &str) -> Result<(), StoreError> {
        store.delete(&meals_collection(user_id), meal_id).await
    }
}
