//! Profile service - business logic for the user profile
//!
//! Targets are derived from the stored profile on every read.

use std::collections::BTreeMap;

use gains_tracker_shared::types::{
    CreateProfileRequest, MealGoalsResponse, ProfileResponse, UpdateProfileRequest,
};
use gains_tracker_shared::validation::validate_profile;
use gains_tracker_shared::{allocate_meal_goals, derive_targets, DerivedTargets, MealType, UserProfile};
use tracing::info;

use crate::error::ApiError;
use crate::repositories::{DocumentStore, ProfileRepository};

/// Profile service for user profile operations
pub struct ProfileService;

impl ProfileService {
    /// Load the stored profile
    pub async fn get(store: &dyn DocumentStore, user_id: &str) -> Result<UserProfile, ApiError> {
        ProfileRepository::find(store, user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))
    }

    /// Profile with its initials and derived targets
    pub async fn get_response(
        store: &dyn DocumentStore,
        user_id: &str,
    ) -> Result<ProfileResponse, ApiError> {
        let profile = Self::get(store, user_id).await?;
        Ok(Self::to_response(profile))
    }

    /// Onboarding: store a first profile
    pub async fn create(
        store: &dyn DocumentStore,
        user_id: &str,
        req: CreateProfileRequest,
    ) -> Result<ProfileResponse, ApiError> {
        if ProfileRepository::find(store, user_id).await?.is_some() {
            return Err(ApiError::Conflict("Profile already exists".to_string()));
        }

        let profile = UserProfile {
            id: user_id.to_string(),
            full_name: req.full_name.trim().to_string(),
            age: req.age,
            gender: req.gender,
            height_cm: req.height_cm,
            weight_kg: req.weight_kg,
            fitness_goal: req.fitness_goal,
            dietary_preference: req.dietary_preference,
            activity_level: req.activity_level,
            equipment_access: req.equipment_access,
            meals_per_day: req.meals_per_day,
            meal_targets: None,
            manual_target_calories: None,
        };
        validate_profile(&profile)?;

        ProfileRepository::save(store, &profile).await?;
        info!(user_id, "Profile created");
        Ok(Self::to_response(profile))
    }

    /// Apply explicit field updates and rewrite the document
    pub async fn update(
        store: &dyn DocumentStore,
        user_id: &str,
        req: UpdateProfileRequest,
    ) -> Result<ProfileResponse, ApiError> {
        let mut profile = Self::get(store, user_id).await?;
        Self::apply_update(&mut profile, req);
        validate_profile(&profile)?;

        ProfileRepository::save(store, &profile).await?;
        info!(user_id, "Profile updated");
        Ok(Self::to_response(profile))
    }

    pub async fn targets(store: &dyn DocumentStore, user_id: &str) -> Result<DerivedTargets, ApiError> {
        let profile = Self::get(store, user_id).await?;
        Ok(derive_targets(&profile))
    }

    pub async fn meal_goals(
        store: &dyn DocumentStore,
        user_id: &str,
    ) -> Result<MealGoalsResponse, ApiError> {
        let profile = Self::get(store, user_id).await?;
        Ok(MealGoalsResponse {
            target_calories: derive_targets(&profile).target_calories,
            goals: Self::meal_goals_for(&profile),
            overridden: profile.meal_targets.is_some(),
        })
    }

    /// Per-slot goals: stored overrides, else an even three-way split
    pub fn meal_goals_for(profile: &UserProfile) -> BTreeMap<MealType, i64> {
        let targets = derive_targets(profile);
        allocate_meal_goals(targets.target_calories, profile.meal_targets.as_ref())
    }

    fn to_response(profile: UserProfile) -> ProfileResponse {
        ProfileResponse {
            initials: profile.initials(),
            targets: derive_targets(&profile),
            profile,
        }
    }

    fn apply_update(profile: &mut UserProfile, req: UpdateProfileRequest) {
        if let Some(name) = req.full_name {
            profile.full_name = name.trim().to_string();
        }
        if let Some(age) = req.age {
            profile.age = age;
        }
        if let Some(gender) = req.gender {
            profile.gender = gender;
        }
        if let Some(height) = req.height_cm {
            profile.height_cm = height;
        }
        if let Some(weight) = req.weight_kg {
            profile.weight_kg = weight;
        }
        if let Some(goal) = req.fitness_goal {
            profile.fitness_goal = goal;
        }
        if let Some(pref) = req.dietary_preference {
            profile.dietary_preference = pref;
        }
        if let Some(level) = req.activity_level {
            profile.activity_level = level;
        }
        if let Some(access) = req.equipment_access {
            profile.equipment_access = access;
        }
        if let Some(meals) = req.meals_per_day {
            profile.meals_per_day = meals;
        }

        if req.clear_meal_targets {
            profile.meal_targets = None;
        } else if let Some(targets) = req.meal_targets {
            profile.meal_targets = Some(targets);
        }

        if req.clear_manual_target {
            profile.manual_target_calories = None;
        } else if let Some(target) = req.manual_target_calories {
            profile.manual_target_calories = Some(target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryDocumentStore;
    use gains_tracker_shared::{
        ActivityLevel, DietaryPreference, EquipmentAccess, FitnessGoal, Gender,
    };

    fn create_request() -> CreateProfileRequest {
        CreateProfileRequest {
            full_name: " Jordan Lee ".to_string(),
            age: 27,
            gender: Gender::Male,
            height_cm: 50.0,
            weight_kg: 100.0,
            fitness_goal: FitnessGoal::LoseWeight,
            dietary_preference: DietaryPreference::None,
            activity_level: ActivityLevel::Sedentary,
            equipment_access: EquipmentAccess::Weights,
            meals_per_day: 3,
        }
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let store = InMemoryDocumentStore::new();
        let created = ProfileService::create(&store, "u1", create_request()).await.unwrap();
        assert_eq!(created.profile.full_name, "Jordan Lee");
        assert_eq!(created.initials, "JL");
        assert_eq!(created.targets.bmr, 1515);

        let loaded = ProfileService::get(&store, "u1").await.unwrap();
        assert_eq!(loaded, created.profile);
    }

    #[tokio::test]
    async fn test_create_twice_conflicts() {
        let store = InMemoryDocumentStore::new();
        ProfileService::create(&store, "u1", create_request()).await.unwrap();
        let err = ProfileService::create(&store, "u1", create_request()).await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_missing_profile_not_found() {
        let store = InMemoryDocumentStore::new();
        let err = ProfileService::targets(&store, "nobody").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_manual_target_round_trip() {
        let store = InMemoryDocumentStore::new();
        ProfileService::create(&store, "u1", create_request()).await.unwrap();

        let req = UpdateProfileRequest {
            manual_target_calories: Some(1800),
            ..Default::default()
        };
        let updated = ProfileService::update(&store, "u1", req).await.unwrap();
        assert_eq!(updated.targets.target_calories, 1800);

        let goals = ProfileService::meal_goals(&store, "u1").await.unwrap();
        assert_eq!(goals.goals.values().sum::<i64>(), 1800);
        assert!(!goals.overridden);

        let req = UpdateProfileRequest {
            clear_manual_target: true,
            ..Default::default()
        };
        let cleared = ProfileService::update(&store, "u1", req).await.unwrap();
        assert_eq!(cleared.profile.manual_target_calories, None);
    }

    #[tokio::test]
    async fn test_meal_overrides_returned_verbatim() {
        let store = InMemoryDocumentStore::new();
        ProfileService::create(&store, "u1", create_request()).await.unwrap();

        let overrides = BTreeMap::from([(MealType::Breakfast, 250), (MealType::Snack, 100)]);
        let req = UpdateProfileRequest {
            meal_targets: Some(overrides.clone()),
            ..Default::default()
        };
        ProfileService::update(&store, "u1", req).await.unwrap();

        let goals = ProfileService::meal_goals(&store, "u1").await.unwrap();
        assert_eq!(goals.goals, overrides);
        assert!(goals.overridden);
    }

    #[tokio::test]
    async fn test_invalid_update_is_rejected_and_not_saved() {
        let store = InMemoryDocumentStore::new();
        ProfileService::create(&store, "u1", create_request()).await.unwrap();

        let overrides = BTreeMap::from([(MealType::Lunch, -5)]);
        let req = UpdateProfileRequest {
            meal_targets: Some(overrides),
            ..Default::default()
        };
        let err = ProfileService::update(&store, "u1", req).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation { .. }));

        let stored = ProfileService::get(&store, "u1").await.unwrap();
        assert!(stored.meal_targets.is_none());
    }

    #[tokio::test]
    async fn test_offline_store_is_unavailable() {
        let store = InMemoryDocumentStore::new();
        store.set_offline(true);
        let err = ProfileService::get(&store, "u1").await.unwrap_err();
        assert!(matches!(err, ApiError::Unavailable(_)));
    }
}
