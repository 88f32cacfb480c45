//! Health metric aggregator
//!
//! Holds the latest snapshot of each metric read from the health provider.
//! Every refresh recomputes its snapshot in full and swaps it in; an older
//! refresh finishing late is discarded. Refreshes are triggered explicitly
//! or by the provider's change notifications.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, Utc};
use gains_tracker_shared::snapshots::{
    fill_hourly_buckets, heart_rate_anchor, start_of_local_day, trailing_week_start,
};
use gains_tracker_shared::types::{HourlyHeartRateResponse, MetricsResponse};
use gains_tracker_shared::{CoreError, HealthMetric, HourlyHeartRate, MetricSnapshot};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{OnceCell, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::providers::{HealthDataProvider, HealthError};

use super::read_model::Ticketed;

pub const ACCESS_DENIED_ADVISORY: &str = "Health data access was denied; metrics are hidden";

/// Steps since local midnight with the time of the newest sample
#[derive(Debug, Clone, PartialEq)]
pub struct StepsToday {
    pub snapshot: MetricSnapshot,
    pub latest_at: Option<DateTime<Utc>>,
}

/// Hourly heart rate averages over the trailing day
#[derive(Debug, Clone, PartialEq)]
pub struct HourlySeries {
    pub anchor: DateTime<Utc>,
    pub buckets: Vec<HourlyHeartRate>,
}

pub struct HealthAggregator {
    provider: Arc<dyn HealthDataProvider>,
    offset: FixedOffset,
    daily_steps_goal: i64,
    authorization: OnceCell<Result<(), HealthError>>,
    steps_today: Ticketed<Option<StepsToday>>,
    weekly_steps: Ticketed<Option<f64>>,
    weekly_calories: Ticketed<Option<f64>>,
    weekly_distance: Ticketed<Option<f64>>,
    hourly: Ticketed<Option<HourlySeries>>,
    last_heart_rate: Ticketed<Option<f64>>,
    advisory: RwLock<Option<String>>,
}

impl HealthAggregator {
    pub fn new(provider: Arc<dyn HealthDataProvider>, offset: FixedOffset, daily_steps_goal: i64) -> Self {
        Self {
            provider,
            offset,
            daily_steps_goal,
            authorization: OnceCell::new(),
            steps_today: Ticketed::new("steps_today", None),
            weekly_steps: Ticketed::new("weekly_steps", None),
            weekly_calories: Ticketed::new("weekly_calories", None),
            weekly_distance: Ticketed::new("weekly_distance", None),
            hourly: Ticketed::new("hourly_heart_rate", None),
            last_heart_rate: Ticketed::new("last_heart_rate", None),
            advisory: RwLock::new(None),
        }
    }

    /// Ask the provider for access until it gives a definite answer.
    /// A grant or a refusal is kept; transient failures are retried on the
    /// next refresh.
    async fn authorize(&self) -> Result<(), HealthError> {
        if let Some(answer) = self.authorization.get() {
            return answer.clone();
        }

        let result = self.provider.request_authorization().await;
        match &result {
            Ok(()) => info!("Health data access granted"),
            Err(HealthError::AuthorizationDenied) => warn!("Health data access denied"),
            Err(e) => {
                warn!(error = %e, "Health authorization failed, will retry");
                return result;
            }
        }
        // A concurrent refresh may have stored the same answer first
        let _ = self.authorization.set(result.clone());
        result
    }

    /// False once authorization was refused
    pub fn is_available(&self) -> bool {
        !matches!(self.authorization.get(), Some(Err(_)))
    }

    async fn refresh_cell<T, Fut>(
        &self,
        name: &'static str,
        cell: &Ticketed<Option<T>>,
        compute: Fut,
    ) -> Result<(), HealthError>
    where
        Fut: Future<Output = Result<Option<T>, HealthError>>,
    {
        let ticket = cell.issue();

        if let Err(e) = self.authorize().await {
            if e == HealthError::AuthorizationDenied {
                cell.publish(ticket, None).await;
            }
            *self.advisory.write().await = Some(advisory_for(&e));
            return Err(e);
        }

        match compute.await {
            Ok(value) => {
                cell.publish(ticket, value).await;
                debug!(snapshot = name, "Snapshot refreshed");
                metrics::counter!(
                    "gains_tracker_snapshot_refreshes_total",
                    "snapshot" => name,
                    "outcome" => "ok"
                )
                .increment(1);
                Ok(())
            }
            Err(e) => {
                warn!(snapshot = name, error = %e, "Snapshot refresh failed, keeping previous value");
                metrics::counter!(
                    "gains_tracker_snapshot_refreshes_total",
                    "snapshot" => name,
                    "outcome" => "error"
                )
                .increment(1);
                *self.advisory.write().await = Some(advisory_for(&e));
                Err(e)
            }
        }
    }

    pub async fn refresh_steps_today(&self, now: DateTime<Utc>) -> Result<(), HealthError> {
        let provider = &self.provider;
        let start = start_of_local_day(now, self.offset);
        let goal = self.daily_steps_goal;
        self.refresh_cell("steps_today", &self.steps_today, async move {
            let steps = provider
                .statistical_sum(HealthMetric::StepCount, start, now)
                .await?;
            let latest = provider
                .latest_sample(HealthMetric::StepCount, Some(start), now)
                .await?;
            Ok(Some(StepsToday {
                snapshot: MetricSnapshot::steps_today(steps, goal),
                latest_at: latest.map(|s| s.timestamp),
            }))
        })
        .await
    }

    async fn refresh_weekly_sum(
        &self,
        name: &'static str,
        cell: &Ticketed<Option<f64>>,
        metric: HealthMetric,
        now: DateTime<Utc>,
    ) -> Result<(), HealthError> {
        let provider = &self.provider;
        let start = trailing_week_start(now);
        self.refresh_cell(name, cell, async move {
            Ok(Some(provider.statistical_sum(metric, start, now).await?))
        })
        .await
    }

    pub async fn refresh_weekly_steps(&self, now: DateTime<Utc>) -> Result<(), HealthError> {
        self.refresh_weekly_sum("weekly_steps", &self.weekly_steps, HealthMetric::StepCount, now)
            .await
    }

    pub async fn refresh_weekly_calories(&self, now: DateTime<Utc>) -> Result<(), HealthError> {
        self.refresh_weekly_sum(
            "weekly_calories",
            &self.weekly_calories,
            HealthMetric::ActiveEnergy,
            now,
        )
        .await
    }

    pub async fn refresh_weekly_distance(&self, now: DateTime<Utc>) -> Result<(), HealthError> {
        self.refresh_weekly_sum("weekly_distance", &self.weekly_distance, HealthMetric::Distance, now)
            .await
    }

    pub async fn refresh_hourly_heart_rate(&self, now: DateTime<Utc>) -> Result<(), HealthError> {
        let provider = &self.provider;
        let anchor = heart_rate_anchor(now, self.offset);
        self.refresh_cell("hourly_heart_rate", &self.hourly, async move {
            let averages = provider
                .bucketed_averages(HealthMetric::HeartRate, anchor, now, Duration::hours(1))
                .await?;
            Ok(Some(HourlySeries {
                anchor,
                buckets: fill_hourly_buckets(anchor, now, &averages),
            }))
        })
        .await
    }

    /// Newest heart rate sample within the trailing minute
    pub async fn refresh_last_heart_rate(&self, now: DateTime<Utc>) -> Result<(), HealthError> {
        let provider = &self.provider;
        let since = now - Duration::minutes(1);
        self.refresh_cell("last_heart_rate", &self.last_heart_rate, async move {
            let sample = provider
                .latest_sample(HealthMetric::HeartRate, Some(since), now)
                .await?;
            Ok(sample.map(|s| s.value))
        })
        .await
    }

    /// Refresh the snapshots fed by one metric
    pub async fn refresh_metric(&self, metric: HealthMetric, now: DateTime<Utc>) {
        let result = match metric {
            HealthMetric::StepCount => {
                let today = self.refresh_steps_today(now).await;
                today.and(self.refresh_weekly_steps(now).await)
            }
            HealthMetric::ActiveEnergy => self.refresh_weekly_calories(now).await,
            HealthMetric::Distance => self.refresh_weekly_distance(now).await,
            HealthMetric::HeartRate => {
                let last = self.refresh_last_heart_rate(now).await;
                last.and(self.refresh_hourly_heart_rate(now).await)
            }
        };
        if let Err(e) = result {
            debug!(?metric, error = %e, "Metric refresh incomplete");
        }
    }

    /// Refresh every snapshot as of `now`; true when all succeeded
    pub async fn refresh_all_at(&self, now: DateTime<Utc>) -> bool {
        let results = [
            self.refresh_steps_today(now).await,
            self.refresh_weekly_steps(now).await,
            self.refresh_weekly_calories(now).await,
            self.refresh_weekly_distance(now).await,
            self.refresh_hourly_heart_rate(now).await,
            self.refresh_last_heart_rate(now).await,
        ];

        let ok = results.iter().all(Result::is_ok);
        if ok {
            *self.advisory.write().await = None;
        }
        ok
    }

    pub async fn refresh_all(&self) -> bool {
        self.refresh_all_at(Utc::now()).await
    }

    /// Refresh snapshots whenever the provider reports new samples.
    /// The task ends when the provider's channel closes.
    pub fn spawn_observer(self: &Arc<Self>) -> JoinHandle<()> {
        let mut changes = self.provider.subscribe();
        let aggregator = Arc::clone(self);

        tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(metric) => aggregator.refresh_metric(metric, Utc::now()).await,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Missed health change notifications, refreshing all");
                        aggregator.refresh_all().await;
                    }
                    Err(RecvError::Closed) => {
                        info!("Health change channel closed");
                        break;
                    }
                }
            }
        })
    }

    /// Current snapshots paired with their goals. `burn_target` is the
    /// profile's daily active-energy target; `None` uses the fallback.
    pub async fn report(&self, burn_target: Option<i64>) -> MetricsResponse {
        let advisory = self.advisory.read().await.clone();
        if !self.is_available() {
            return MetricsResponse {
                available: false,
                steps_today: None,
                steps_today_at: None,
                weekly_steps: None,
                weekly_calories: None,
                weekly_distance: None,
                last_heart_rate: None,
                advisory,
            };
        }

        let steps_today = (*self.steps_today.read().await).clone();
        let weekly_steps = *self.weekly_steps.read().await;
        let weekly_calories = *self.weekly_calories.read().await;
        let weekly_distance = *self.weekly_distance.read().await;

        MetricsResponse {
            available: true,
            steps_today_at: steps_today.as_ref().and_then(|s| s.latest_at),
            steps_today: steps_today.map(|s| s.snapshot),
            weekly_steps: weekly_steps.map(MetricSnapshot::weekly_steps),
            weekly_calories: weekly_calories
                .map(|kcal| MetricSnapshot::weekly_calories(kcal, burn_target)),
            weekly_distance: weekly_distance.map(MetricSnapshot::weekly_distance),
            last_heart_rate: *self.last_heart_rate.read().await,
            advisory,
        }
    }

    pub async fn hourly(&self) -> HourlyHeartRateResponse {
        let advisory = self.advisory.read().await.clone();
        let series = self.hourly.read().await;
        match &*series {
            Some(series) if self.is_available() => HourlyHeartRateResponse {
                anchor: Some(series.anchor),
                buckets: series.buckets.clone(),
                advisory,
            },
            _ => HourlyHeartRateResponse {
                anchor: None,
                buckets: Vec::new(),
                advisory,
            },
        }
    }
}

fn advisory_for(err: &HealthError) -> String {
    match err {
        HealthError::AuthorizationDenied => ACCESS_DENIED_ADVISORY.to_string(),
        other => CoreError::ExternalUnavailable(other.to_string()).advisory(),
    }
}
