//! Meal tracker - the day-bucketed meal read model
//!
//! Meals are inserted locally first and persisted after. Records not yet
//! persisted, whether in flight or failed, stay in the read model and are
//! retried on the next refresh. A refresh rebuilds the whole mapping from the
//! store and swaps it in at once; a failed refresh keeps the previous mapping.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate};
use gains_tracker_shared::{
    derive_targets, DayBuckets, DaySummary, DerivedTargets, MealRecord, MealType, NutrientField,
};
use rust_decimal::Decimal;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::repositories::{DocumentStore, MealRepository, ProfileRepository, StoreError};

use super::profile::ProfileService;
use super::read_model::Ticketed;

pub const NOT_PERSISTED_ADVISORY: &str = "Meal saved on this device but not yet persisted";
pub const REFRESH_FAILED_ADVISORY: &str = "Could not refresh meals; showing the last loaded data";

/// Outcome of logging a meal
#[derive(Debug, Clone)]
pub struct AddOutcome {
    pub meal: MealRecord,
    pub persisted: bool,
    pub advisory: Option<String>,
}

pub struct MealTracker {
    store: Arc<dyn DocumentStore>,
    user_id: String,
    offset: FixedOffset,
    buckets: Ticketed<DayBuckets>,
    pending: Mutex<Vec<MealRecord>>,
    advisory: RwLock<Option<String>>,
}

impl MealTracker {
    pub fn new(store: Arc<dyn DocumentStore>, user_id: impl Into<String>, offset: FixedOffset) -> Self {
        Self {
            store,
            user_id: user_id.into(),
            offset,
            buckets: Ticketed::new("meals", DayBuckets::new(offset)),
            pending: Mutex::new(Vec::new()),
            advisory: RwLock::new(None),
        }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Insert a meal into the read model, then persist it.
    ///
    /// The meal is registered as pending before the store write starts, so
    /// a refresh running during the write merges it back in. It leaves the
    /// pending list once a write succeeds.
    pub async fn add_meal(&self, meal: MealRecord) -> AddOutcome {
        self.pending.lock().await.push(meal.clone());
        let local = meal.clone();
        self.buckets.update(move |buckets| buckets.add_meal(local)).await;

        match MealRepository::insert(self.store.as_ref(), &self.user_id, &meal).await {
            Ok(()) => {
                self.pending.lock().await.retain(|p| p.id != meal.id);
                info!(meal_id = %meal.id, meal_type = %meal.meal_type, "Meal logged");
                AddOutcome {
                    meal,
                    persisted: true,
                    advisory: None,
                }
            }
            Err(e) => {
                warn!(meal_id = %meal.id, error = %e, "Meal not persisted");
                metrics::counter!("gains_tracker_meal_persist_failures_total").increment(1);
                AddOutcome {
                    meal,
                    persisted: false,
                    advisory: Some(NOT_PERSISTED_ADVISORY.to_string()),
                }
            }
        }
    }

    /// Re-fetch every meal and replace the mapping in one swap
    pub async fn refresh(&self) -> Result<(), StoreError> {
        let ticket = self.buckets.issue();
        let fetched = self.fetch_with_pending().await;

        match fetched {
            Ok(records) => {
                let count = records.len();
                let rebuilt = DayBuckets::from_records(self.offset, records);
                if self.buckets.publish(ticket, rebuilt).await {
                    info!(count, "Meals refreshed");
                }
                *self.advisory.write().await = None;
                metrics::counter!("gains_tracker_meal_refreshes_total", "outcome" => "ok")
                    .increment(1);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Meal refresh failed, keeping previous data");
                *self.advisory.write().await = Some(REFRESH_FAILED_ADVISORY.to_string());
                metrics::counter!("gains_tracker_meal_refreshes_total", "outcome" => "error")
                    .increment(1);
                Err(e)
            }
        }
    }

    /// Store contents plus any records still waiting to be persisted.
    /// Pending records are retried here; ones that persist are dropped
    /// from the pending list.
    async fn fetch_with_pending(&self) -> Result<Vec<MealRecord>, StoreError> {
        let mut pending = self.pending.lock().await;
        let mut still_pending = Vec::new();
        for meal in pending.drain(..) {
            if MealRepository::insert(self.store.as_ref(), &self.user_id, &meal)
                .await
                .is_err()
            {
                still_pending.push(meal);
            }
        }
        *pending = still_pending;

        let mut records = MealRepository::list(self.store.as_ref(), &self.user_id).await?;
        for meal in pending.iter() {
            if !records.iter().any(|r| r.id == meal.id) {
                records.push(meal.clone());
            }
        }
        Ok(records)
    }

    pub async fn snapshot(&self) -> Arc<DayBuckets> {
        self.buckets.read().await
    }

    pub async fn advisory(&self) -> Option<String> {
        self.advisory.read().await.clone()
    }

    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }

    pub async fn daily_total(&self, date: NaiveDate, field: NutrientField) -> Decimal {
        self.buckets.read().await.daily_total(date, field)
    }

    pub async fn meal_type_total(&self, date: NaiveDate, meal_type: MealType) -> Decimal {
        self.buckets.read().await.meal_type_total(date, meal_type)
    }

    pub async fn meals_for(&self, date: NaiveDate, meal_type: MealType) -> Vec<MealRecord> {
        self.buckets
            .read()
            .await
            .meals_for(date, meal_type)
            .cloned()
            .collect()
    }

    /// Day summary against the stored profile's goals.
    /// Without a reachable profile the goals read as zero.
    pub async fn day_summary(&self, date: NaiveDate) -> DaySummary {
        let profile = match ProfileRepository::find(self.store.as_ref(), &self.user_id).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!(error = %e, "Profile unavailable for day summary");
                None
            }
        };

        let (goals, targets) = match profile {
            Some(profile) => (ProfileService::meal_goals_for(&profile), derive_targets(&profile)),
            None => (BTreeMap::new(), DerivedTargets::default()),
        };

        self.buckets.read().await.day_summary(date, &goals, &targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryDocumentStore;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use serde_json::Value;
    use std::time::Duration;

    /// Store whose writes take a while, then succeed or fail
    struct SlowStore {
        inner: InMemoryDocumentStore,
        write_delay: Duration,
        writes_fail: bool,
    }

    impl SlowStore {
        fn new(writes_fail: bool) -> Self {
            Self {
                inner: InMemoryDocumentStore::new(),
                write_delay: Duration::from_millis(200),
                writes_fail,
            }
        }
    }

    #[async_trait]
    impl DocumentStore for SlowStore {
        async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
            self.inner.get(collection, id).await
        }

        async fn set(&self, collection: &str, id: &str, data: Value) -> Result<(), StoreError> {
            tokio::time::sleep(self.write_delay).await;
            if self.writes_fail {
                return Err(StoreError::Unavailable("write timed out".to_string()));
            }
            self.inner.set(collection, id, data).await
        }

        async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
            self.inner.delete(collection, id).await
        }

        async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
            self.inner.list(collection).await
        }

        async fn query_prefix(
            &self,
            collection: &str,
            field: &str,
            prefix: &str,
            limit: usize,
        ) -> Result<Vec<Value>, StoreError> {
            self.inner.query_prefix(collection, field, prefix, limit).await
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Ok(())
        }

        fn kind(&self) -> &'static str {
            "slow"
        }
    }

    fn dec(v: i64) -> Decimal {
        Decimal::from(v)
    }

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, d, h, 0, 0).unwrap()
    }

    fn meal(meal_type: MealType, calories: i64, timestamp: DateTime<Utc>) -> MealRecord {
        MealRecord::new(
            meal_type,
            "Oats",
            dec(calories),
            dec(10),
            dec(5),
            dec(2),
            timestamp,
        )
    }

    fn tracker(store: Arc<InMemoryDocumentStore>) -> MealTracker {
        MealTracker::new(store, "u1", FixedOffset::east_opt(0).unwrap())
    }

    #[tokio::test]
    async fn test_add_meal_persists_and_buckets() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let tracker = tracker(store.clone());

        let outcome = tracker.add_meal(meal(MealType::Breakfast, 300, at(1, 8))).await;
        assert!(outcome.persisted);
        assert!(outcome.advisory.is_none());

        let date = at(1, 8).date_naive();
        assert_eq!(tracker.daily_total(date, NutrientField::Calories).await, dec(300));
        assert_eq!(
            MealRepository::list(store.as_ref(), "u1").await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_add_meal_offline_keeps_local_record() {
        let store = Arc::new(InMemoryDocumentStore::new());
        store.set_offline(true);
        let tracker = tracker(store.clone());

        let outcome = tracker.add_meal(meal(MealType::Lunch, 500, at(1, 12))).await;
        assert!(!outcome.persisted);
        assert_eq!(outcome.advisory.as_deref(), Some(NOT_PERSISTED_ADVISORY));

        let date = at(1, 12).date_naive();
        assert_eq!(tracker.meal_type_total(date, MealType::Lunch).await, dec(500));
        assert_eq!(tracker.pending_count().await, 1);

        // Back online, the refresh persists the pending record
        store.set_offline(false);
        tracker.refresh().await.unwrap();
        assert_eq!(tracker.pending_count().await, 0);
        assert_eq!(tracker.meal_type_total(date, MealType::Lunch).await, dec(500));
    }

    #[tokio::test]
    async fn test_refresh_replaces_mapping() {
        let store = Arc::new(InMemoryDocumentStore::new());
        MealRepository::insert(store.as_ref(), "u1", &meal(MealType::Dinner, 700, at(2, 19)))
            .await
            .unwrap();

        let tracker = tracker(store.clone());
        assert!(tracker.snapshot().await.is_empty());

        tracker.refresh().await.unwrap();
        let snapshot = tracker.snapshot().await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(
            snapshot.daily_total(at(2, 19).date_naive(), NutrientField::Calories),
            dec(700)
        );
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_mapping() {
        let store = Arc::new(InMemoryDocumentStore::new());
        MealRepository::insert(store.as_ref(), "u1", &meal(MealType::Snack, 150, at(3, 15)))
            .await
            .unwrap();
        let tracker = tracker(store.clone());
        tracker.refresh().await.unwrap();

        store.set_offline(true);
        assert!(tracker.refresh().await.is_err());
        assert_eq!(tracker.advisory().await.as_deref(), Some(REFRESH_FAILED_ADVISORY));
        assert_eq!(
            tracker.daily_total(at(3, 15).date_naive(), NutrientField::Calories).await,
            dec(150)
        );

        store.set_offline(false);
        tracker.refresh().await.unwrap();
        assert!(tracker.advisory().await.is_none());
    }

    #[tokio::test]
    async fn test_missing_day_totals_zero() {
        let tracker = tracker(Arc::new(InMemoryDocumentStore::new()));
        let date = at(4, 0).date_naive();
        assert_eq!(tracker.daily_total(date, NutrientField::Protein).await, Decimal::ZERO);
        assert!(tracker.meals_for(date, MealType::Breakfast).await.is_empty());
    }

    #[tokio::test]
    async fn test_day_summary_without_profile() {
        let tracker = tracker(Arc::new(InMemoryDocumentStore::new()));
        tracker.add_meal(meal(MealType::Breakfast, 400, at(5, 7))).await;

        let summary = tracker.day_summary(at(5, 7).date_naive()).await;
        assert_eq!(summary.target_calories, 0);
        assert_eq!(summary.calorie_fraction, 0.0);
        assert_eq!(summary.meals.len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_during_failing_write_keeps_meal() {
        let tracker = Arc::new(MealTracker::new(
            Arc::new(SlowStore::new(true)),
            "u1",
            FixedOffset::east_opt(0).unwrap(),
        ));

        let adding = {
            let tracker = Arc::clone(&tracker);
            tokio::spawn(async move {
                tracker.add_meal(meal(MealType::Breakfast, 300, at(6, 8))).await
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        tracker.refresh().await.unwrap();

        let outcome = adding.await.unwrap();
        assert!(!outcome.persisted);

        let date = at(6, 8).date_naive();
        assert_eq!(tracker.meal_type_total(date, MealType::Breakfast).await, dec(300));
        assert_eq!(tracker.pending_count().await, 1);
    }

    #[tokio::test]
    async fn test_refresh_during_successful_write_keeps_meal() {
        let store = Arc::new(SlowStore::new(false));
        let tracker = Arc::new(MealTracker::new(
            store.clone(),
            "u1",
            FixedOffset::east_opt(0).unwrap(),
        ));

        let adding = {
            let tracker = Arc::clone(&tracker);
            tokio::spawn(async move { tracker.add_meal(meal(MealType::Lunch, 450, at(6, 12))).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        tracker.refresh().await.unwrap();

        assert!(adding.await.unwrap().persisted);

        let date = at(6, 12).date_naive();
        assert_eq!(tracker.meal_type_total(date, MealType::Lunch).await, dec(450));
        assert_eq!(tracker.pending_count().await, 0);
        assert_eq!(MealRepository::list(store.as_ref(), "u1").await.unwrap().len(), 1);
    }
}
