//! Catalog repositories - `foods` and `workout_info`

use gains_tracker_shared::{ExerciseDescription, FoodItem};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::documents::{DocumentStore, StoreError};

pub const FOODS: &str = "foods";
pub const WORKOUT_INFO: &str = "workout_info";

fn decode_all<T: DeserializeOwned>(docs: Vec<Value>) -> Vec<T> {
    docs.into_iter()
        .filter_map(|doc| serde_json::from_value(doc).ok())
        .collect()
}

pub struct FoodRepository;

impl FoodRepository {
    pub async fn search_prefix(
        store: &dyn DocumentStore,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<FoodItem>, StoreError> {
        let docs = store.query_prefix(FOODS, "name", prefix, limit).await?;
        Ok(decode_all(docs))
    }

    pub async fn find(store: &dyn DocumentStore, name: &str) -> Result<Option<FoodItem>, StoreError> {
        match store.get(FOODS, name).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn insert(store: &dyn DocumentStore, food: &FoodItem) -> Result<(), StoreError> {
        store.set(FOODS, &food.name, serde_json::to_value(food)?).await
    }
}

pub struct ExerciseRepository;

impl ExerciseRepository {
    pub async fn search_prefix(
        store: &dyn DocumentStore,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<ExerciseDescription>, StoreError> {
        let docs = store.query_prefix(WORKOUT_INFO, "title", prefix, limit).await?;
        Ok(decode_all(docs))
    }

    pub async fn insert(
        store: &dyn DocumentStore,
        exercise: &ExerciseDescription,
    ) -> Result<(), StoreError> {
        store
            .set(WORKOUT_INFO, &exercise.title, serde_json::to_value(exercise)?)
            .await
    }
}
