//! Day-bucketed meal aggregation
//!
//! Meals are grouped by the local calendar date of their timestamp. The UTC
//! offset of the user's locale is part of the bucket set so that a meal
//! logged at 23:30 local time lands on the right day regardless of where the
//! service runs.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::goals::{goal_fraction, MealSlotProgress};
use crate::health_metrics::{DerivedTargets, Macro};
use crate::models::{MealRecord, MealType};

/// Nutrient selector for totals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NutrientField {
    Calories,
    Carb,
    Protein,
    Fat,
}

impl NutrientField {
    pub fn of(&self, meal: &MealRecord) -> Decimal {
        match self {
            NutrientField::Calories => meal.calories,
            NutrientField::Carb => meal.carb,
            NutrientField::Protein => meal.protein,
            NutrientField::Fat => meal.fat,
        }
    }
}

/// Nutrient totals for a set of meals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutrientTotals {
    pub calories: Decimal,
    pub carb: Decimal,
    pub protein: Decimal,
    pub fat: Decimal,
}

/// Aggregates nutrient totals from a list of meals
pub fn aggregate_meals<'a>(meals: impl IntoIterator<Item = &'a MealRecord>) -> NutrientTotals {
    meals.into_iter().fold(NutrientTotals::default(), |acc, meal| NutrientTotals {
        calories: acc.calories + meal.calories,
        carb: acc.carb + meal.carb,
        protein: acc.protein + meal.protein,
        fat: acc.fat + meal.fat,
    })
}

/// Meals grouped by local calendar date
#[derive(Debug, Clone, PartialEq)]
pub struct DayBuckets {
    offset: FixedOffset,
    days: BTreeMap<NaiveDate, Vec<MealRecord>>,
}

impl DayBuckets {
    pub fn new(offset: FixedOffset) -> Self {
        Self {
            offset,
            days: BTreeMap::new(),
        }
    }

    /// Build a complete mapping from a bulk fetch
    pub fn from_records(offset: FixedOffset, records: impl IntoIterator<Item = MealRecord>) -> Self {
        let mut buckets = Self::new(offset);
        for record in records {
            buckets.add_meal(record);
        }
        buckets
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Local calendar date of a timestamp
    pub fn day_key(&self, timestamp: DateTime<Utc>) -> NaiveDate {
        timestamp.with_timezone(&self.offset).date_naive()
    }

    /// Insert a record into its day bucket. No deduplication.
    pub fn add_meal(&mut self, record: MealRecord) {
        let key = self.day_key(record.timestamp);
        self.days.entry(key).or_default().push(record);
    }

    /// All meals of a day, in insertion order
    pub fn day(&self, date: NaiveDate) -> &[MealRecord] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Total of one nutrient over a day; zero for a missing bucket
    pub fn daily_total(&self, date: NaiveDate, field: NutrientField) -> Decimal {
        self.day(date).iter().map(|m| field.of(m)).sum()
    }

    /// Calories logged for one meal type within a day
    pub fn meal_type_total(&self, date: NaiveDate, meal_type: MealType) -> Decimal {
        self.meals_for(date, meal_type).map(|m| m.calories).sum()
    }

    /// Records of one meal slot within a day
    pub fn meals_for(
        &self,
        date: NaiveDate,
        meal_type: MealType,
    ) -> impl Iterator<Item = &MealRecord> + '_ {
        self.day(date).iter().filter(move |m| m.meal_type == meal_type)
    }

    pub fn totals(&self, date: NaiveDate) -> NutrientTotals {
        aggregate_meals(self.day(date))
    }

    /// Presentation-ready summary of a day against its goals
    pub fn day_summary(
        &self,
        date: NaiveDate,
        meal_goals: &BTreeMap<MealType, i64>,
        targets: &DerivedTargets,
    ) -> DaySummary {
        let totals = self.totals(date);

        let slots: BTreeSet<MealType> = meal_goals
            .keys()
            .copied()
            .chain(self.day(date).iter().map(|m| m.meal_type))
            .collect();

        let meal_slots = slots
            .into_iter()
            .map(|slot| {
                let goal = meal_goals.get(&slot).copied().unwrap_or(0);
                MealSlotProgress::new(slot, self.meal_type_total(date, slot), goal)
            })
            .collect();

        let macros = vec![
            MacroProgress::new(Macro::Protein, totals.protein, targets.protein_grams),
            MacroProgress::new(Macro::Fat, totals.fat, targets.fat_grams),
            MacroProgress::new(Macro::Carbs, totals.carb, targets.carb_grams),
        ];

        DaySummary {
            date,
            totals,
            target_calories: targets.target_calories,
            calorie_fraction: goal_fraction(
                totals.calories.to_f64().unwrap_or(0.0),
                targets.target_calories as f64,
            ),
            meal_slots,
            macros,
            meals: self.day(date).to_vec(),
        }
    }
}

/// Consumption of one macro against its gram target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroProgress {
    pub nutrient: Macro,
    pub consumed: Decimal,
    pub goal: i64,
    pub fraction: f64,
}

impl MacroProgress {
    pub fn new(nutrient: Macro, consumed: Decimal, goal: i64) -> Self {
        Self {
            nutrient,
            consumed,
            goal,
            fraction: goal_fraction(consumed.to_f64().unwrap_or(0.0), goal as f64),
        }
    }
}

/// Daily summary read model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub totals: NutrientTotals,
    pub target_calories: i64,
    pub calorie_fraction: f64,
    pub meal_slots: Vec<MealSlotProgress>,
    pub macros: Vec<MacroProgress>,
    pub meals: Vec<MealRecord>,
}
