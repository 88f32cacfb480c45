//! Profile repository - the `users` collection

use gains_tracker_shared::UserProfile;

use super::documents::{DocumentStore, StoreError};

pub const USERS: &str = "users";

pub struct ProfileRepository;

impl ProfileRepository {
    pub async fn find(
        store: &dyn DocumentStore,
        user_id: &str,
    ) -> Result<Option<UserProfile>, StoreError> {
        match store.get(USERS, user_id).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn save(store: &dyn DocumentStore, profile: &UserProfile) -> Result<(), StoreError> {
        store
            .set(USERS, &profile.id, serde_json::to_value(profile)?)
            .await
    }
}
