//! Workout repository - `users/{uid}/workouts`

use gains_tracker_shared::WorkoutRoutine;

use super::documents::{DocumentStore, StoreError};

pub fn workouts_collection(user_id: &str) -> String {
    format!("users/{}/workouts", user_id)
}

pub struct WorkoutRepository;

impl WorkoutRepository {
    pub async fn save(
        store: &dyn DocumentStore,
        user_id: &str,
        routine: &WorkoutRoutine,
    ) -> Result<(), StoreError> {
        store
            .set(
                &workouts_collection(user_id),
                &routine.id,
                serde_json::to_value(routine)?,
            )
            .await
    }

    /// Saved routines, newest first
    pub async fn list(
        store: &dyn DocumentStore,
        user_id: &str,
    ) -> Result<Vec<WorkoutRoutine>, StoreError> {
        let docs = store.list(&workouts_collection(user_id)).await?;
        let mut routines: Vec<WorkoutRoutine> = docs
            .into_iter()
            .filter_map(|doc| serde_json::from_value(doc).ok())
            .collect();
        routines.sort_by(|a, b| b.time.cmp(&a.time));
        Ok(routines)
    }
}
