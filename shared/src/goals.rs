//! Daily goal allocation
//!
//! Splits a daily calorie target across meal slots and tracks progress
//! toward each slot's goal.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::MealType;

/// Split `total` into `parts` integers that differ by at most one
///
/// The remainder goes to the earliest parts, so the sum is always exactly
/// `total`. Zero parts yields an empty vector.
pub fn split_evenly(total: i64, parts: usize) -> Vec<i64> {
    if parts == 0 {
        return Vec::new();
    }

    let n = parts as i64;
    let base = total.div_euclid(n);
    let remainder = total.rem_euclid(n) as usize;

    (0..parts)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect()
}

/// Per-slot calorie goals
///
/// Stored overrides are returned verbatim. Otherwise the target is split
/// evenly across breakfast, lunch and dinner.
pub fn allocate_meal_goals(
    target_calories: i64,
    overrides: Option<&BTreeMap<MealType, i64>>,
) -> BTreeMap<MealType, i64> {
    if let Some(overrides) = overrides {
        return overrides.clone();
    }

    MealType::CANONICAL_SLOTS
        .into_iter()
        .zip(split_evenly(target_calories, MealType::CANONICAL_SLOTS.len()))
        .collect()
}

/// Progress toward a goal in `[0, 1]`
///
/// A goal of zero or less has no meaningful fraction and reads as 0.
pub fn goal_fraction(consumed: f64, goal: f64) -> f64 {
    if goal <= 0.0 {
        return 0.0;
    }
    (consumed / goal).clamp(0.0, 1.0)
}

/// One meal slot's consumption against its goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealSlotProgress {
    pub meal_type: MealType,
    pub consumed: Decimal,
    pub goal: i64,
    pub fraction: f64,
    pub over_goal: bool,
}

impl MealSlotProgress {
    pub fn new(meal_type: MealType, consumed: Decimal, goal: i64) -> Self {
        let consumed_f = consumed.to_f64().unwrap_or(0.0);
        Self {
            meal_type,
            consumed,
            goal,
            fraction: goal_fraction(consumed_f, goal as f64),
            over_goal: goal > 0 && consumed > Decimal::from(goal),
        }
    }
}
