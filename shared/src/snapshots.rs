//! Health metric snapshot math
//!
//! Window boundaries, goal pairing and hourly bucketing for the health
//! aggregator. Sample retrieval itself happens in the backend behind the
//! health provider trait.

use chrono::{DateTime, Duration, DurationRound, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::goals::goal_fraction;

/// Default daily step goal
pub const DEFAULT_DAILY_STEPS_GOAL: i64 = 10_000;
/// Weekly step goal
pub const WEEKLY_STEPS_GOAL: i64 = 70_000;
/// Weekly distance goal in km
pub const WEEKLY_DISTANCE_GOAL_KM: i64 = 35;
/// Daily calorie burn used when no profile is loaded
pub const FALLBACK_DAILY_CAL_BURN: i64 = 500;

/// Quantities read from the health provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthMetric {
    /// count
    StepCount,
    /// beats per minute
    HeartRate,
    /// kcal
    ActiveEnergy,
    /// meters
    Distance,
}

impl HealthMetric {
    pub const ALL: [HealthMetric; 4] = [
        HealthMetric::StepCount,
        HealthMetric::HeartRate,
        HealthMetric::ActiveEnergy,
        HealthMetric::Distance,
    ];
}

/// One provider sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthSample {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Kind of a goal-paired snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Steps,
    Calories,
    Distance,
}

/// A value paired with its goal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    pub icon: String,
    pub consumed: i64,
    pub goal: i64,
    pub kind: MetricKind,
}

impl MetricSnapshot {
    pub fn fraction(&self) -> f64 {
        goal_fraction(self.consumed as f64, self.goal as f64)
    }

    pub fn steps_today(steps: f64, goal: i64) -> Self {
        Self {
            icon: "figure.walk".to_string(),
            consumed: steps as i64,
            goal,
            kind: MetricKind::Steps,
        }
    }

    pub fn weekly_steps(steps: f64) -> Self {
        Self {
            icon: "figure.stair.stepper".to_string(),
            consumed: steps as i64,
            goal: WEEKLY_STEPS_GOAL,
            kind: MetricKind::Steps,
        }
    }

    /// Weekly active energy against seven days of the daily burn target
    pub fn weekly_calories(kcal: f64, daily_burn_target: Option<i64>) -> Self {
        Self {
            icon: "flame".to_string(),
            consumed: kcal as i64,
            goal: 7 * daily_burn_target.unwrap_or(FALLBACK_DAILY_CAL_BURN),
            kind: MetricKind::Calories,
        }
    }

    /// Weekly distance, reported in whole km
    pub fn weekly_distance(meters: f64) -> Self {
        Self {
            icon: "figure.run".to_string(),
            consumed: crate::units::DistanceUnit::Kilometers.from_meters(meters) as i64,
            goal: WEEKLY_DISTANCE_GOAL_KM,
            kind: MetricKind::Distance,
        }
    }
}

/// Average heart rate of one hour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourlyHeartRate {
    pub hour: DateTime<Utc>,
    pub bpm: f64,
}

// ============================================================================
// Windows
// ============================================================================

/// Local midnight of the day containing `now`, as a UTC instant
pub fn start_of_local_day(now: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
    let local = now.with_timezone(&offset);
    local
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| midnight.and_local_timezone(offset).single())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(now)
}

/// Start of the trailing seven-day window
pub fn trailing_week_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(7)
}

/// Floor of the local hour 24 hours before `now`
pub fn heart_rate_anchor(now: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
    let local = (now - Duration::hours(24)).with_timezone(&offset);
    local
        .duration_trunc(Duration::hours(1))
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(now - Duration::hours(24))
}

/// Lay provider averages onto hourly buckets from `anchor` up to `now`
///
/// Hours without samples read as 0.
pub fn fill_hourly_buckets(
    anchor: DateTime<Utc>,
    now: DateTime<Utc>,
    averages: &[(DateTime<Utc>, f64)],
) -> Vec<HourlyHeartRate> {
    let by_hour: BTreeMap<DateTime<Utc>, f64> = averages.iter().copied().collect();
    let mut buckets = Vec::new();
    let mut hour = anchor;

    while hour < now {
        buckets.push(HourlyHeartRate {
            hour,
            bpm: by_hour.get(&hour).copied().unwrap_or(0.0),
        });
        hour += Duration::hours(1);
    }

    buckets
}
