//! Health data provider - the device health service behind the aggregator
//!
//! The trait mirrors what a platform health store offers: an authorization
//! prompt, cumulative sums over a window, the latest sample, fixed-interval
//! averages and change notifications. `InMemoryHealthProvider` holds ingested
//! samples in process and is what the service binary and tests run against;
//! platform bridges plug in behind the same trait.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use gains_tracker_shared::{HealthMetric, HealthSample};
use thiserror::Error;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

/// Health provider failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HealthError {
    #[error("Health data access was denied")]
    AuthorizationDenied,

    #[error("Health data is not available on this device")]
    NotAvailable,

    #[error("Health query failed: {0}")]
    Query(String),
}

#[async_trait]
pub trait HealthDataProvider: Send + Sync {
    /// Ask for read access to every metric the tracker uses
    async fn request_authorization(&self) -> Result<(), HealthError>;

    /// Cumulative sum of a metric over `[start, end)`
    async fn statistical_sum(
        &self,
        metric: HealthMetric,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<f64, HealthError>;

    /// Most recent sample in `[since, until]`
    async fn latest_sample(
        &self,
        metric: HealthMetric,
        since: Option<DateTime<Utc>>,
        until: DateTime<Utc>,
    ) -> Result<Option<HealthSample>, HealthError>;

    /// Averages per `interval` bucket starting at `anchor`, up to `end`;
    /// buckets without samples are omitted
    async fn bucketed_averages(
        &self,
        metric: HealthMetric,
        anchor: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: Duration,
    ) -> Result<Vec<(DateTime<Utc>, f64)>, HealthError>;

    /// Change notifications, one message per metric that received samples
    fn subscribe(&self) -> broadcast::Receiver<HealthMetric>;
}

/// Sample store with change broadcasting
pub struct InMemoryHealthProvider {
    samples: RwLock<HashMap<HealthMetric, Vec<HealthSample>>>,
    changes: broadcast::Sender<HealthMetric>,
    grant_access: AtomicBool,
    available: AtomicBool,
}

impl Default for InMemoryHealthProvider {
    fn default() -> Self {
        let (changes, _) = broadcast::channel(64);
        Self {
            samples: RwLock::new(HashMap::new()),
            changes,
            grant_access: AtomicBool::new(true),
            available: AtomicBool::new(true),
        }
    }
}

impl InMemoryHealthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer future authorization requests with a denial
    pub fn deny_access(&self) {
        self.grant_access.store(false, Ordering::SeqCst);
    }

    /// Make every query fail as if the service were unreachable
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Record samples and notify subscribers
    pub async fn ingest(&self, metric: HealthMetric, new_samples: Vec<HealthSample>) {
        let count = new_samples.len();
        {
            let mut samples = self.samples.write().await;
            samples.entry(metric).or_default().extend(new_samples);
        }
        debug!(?metric, count, "Ingested health samples");
        // No receivers is fine
        let _ = self.changes.send(metric);
    }

    fn check_available(&self) -> Result<(), HealthError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(HealthError::Query("health service unreachable".to_string()))
        }
    }
}

#[async_trait]
impl HealthDataProvider for InMemoryHealthProvider {
    async fn request_authorization(&self) -> Result<(), HealthError> {
        if self.grant_access.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(HealthError::AuthorizationDenied)
        }
    }

    async fn statistical_sum(
        &self,
        metric: HealthMetric,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<f64, HealthError> {
        self.check_available()?;
        let samples = self.samples.read().await;
        Ok(samples
            .get(&metric)
            .map(|list| {
                list.iter()
                    .filter(|s| s.timestamp >= start && s.timestamp < end)
                    .map(|s| s.value)
                    .sum::<f64>()
            })
            .unwrap_or(0.0))
    }

    async fn latest_sample(
        &self,
        metric: HealthMetric,
        since: Option<DateTime<Utc>>,
        until: DateTime<Utc>,
    ) -> Result<Option<HealthSample>, HealthError> {
        self.check_available()?;
        let samples = self.samples.read().await;
        Ok(samples.get(&metric).and_then(|list| {
            list.iter()
                .filter(|s| since.map_or(true, |t| s.timestamp >= t) && s.timestamp <= until)
                .max_by_key(|s| s.timestamp)
                .copied()
        }))
    }

    async fn bucketed_averages(
        &self,
        metric: HealthMetric,
        anchor: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: Duration,
    ) -> Result<Vec<(DateTime<Utc>, f64)>, HealthError> {
        self.check_available()?;
        let step = interval.num_seconds();
        if step <= 0 {
            return Err(HealthError::Query("interval must be positive".to_string()));
        }

        let samples = self.samples.read().await;
        let mut buckets: HashMap<i64, (f64, u32)> = HashMap::new();
        for sample in samples.get(&metric).into_iter().flatten() {
            if sample.timestamp < anchor || sample.timestamp >= end {
                continue;
            }
            let index = (sample.timestamp - anchor).num_seconds() / step;
            let entry = buckets.entry(index).or_insert((0.0, 0));
            entry.0 += sample.value;
            entry.1 += 1;
        }

        let mut averages: Vec<(DateTime<Utc>, f64)> = buckets
            .into_iter()
            .map(|(index, (sum, count))| {
                (anchor + Duration::seconds(index * step), sum / count as f64)
            })
            .collect();
        averages.sort_by_key(|(start, _)| *start);
        Ok(averages)
    }

    fn subscribe(&self) -> broadcast::Receiver<HealthMetric> {
        self.changes.subscribe()
    }
}
