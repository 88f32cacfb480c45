//! Unit conversion and portion scaling module
//!
//! Food catalog values are per 100 g. Quantities entered in ounces or pounds
//! are converted to grams before scaling.
//!
//! # Design Principles
//!
//! 1. **Internal Consistency**: Food math happens in grams, distance in meters
//! 2. **Exact Arithmetic**: Portions are scaled with `Decimal`, not `f64`
//! 3. **Conversion at Boundaries**: Convert on input/output, not in business logic

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;
use crate::models::FoodItem;

// ============================================================================
// Food Quantity Units
// ============================================================================

/// Unit of an entered food quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FoodUnit {
    #[default]
    #[serde(alias = "g")]
    Grams,
    #[serde(alias = "oz")]
    Ounces,
    #[serde(alias = "lb", alias = "lbs")]
    Pounds,
}

impl FoodUnit {
    /// Grams in one unit
    pub fn grams_per_unit(&self) -> Decimal {
        match self {
            FoodUnit::Grams => Decimal::ONE,
            FoodUnit::Ounces => Decimal::new(283_495, 4),
            FoodUnit::Pounds => Decimal::new(453_592, 3),
        }
    }

    /// Convert a quantity in this unit to grams; `None` on overflow
    pub fn to_grams(&self, value: Decimal) -> Option<Decimal> {
        value.checked_mul(self.grams_per_unit())
    }

    /// Get the unit abbreviation
    pub fn abbreviation(&self) -> &'static str {
        match self {
            FoodUnit::Grams => "g",
            FoodUnit::Ounces => "oz",
            FoodUnit::Pounds => "lb",
        }
    }
}

impl fmt::Display for FoodUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

impl FromStr for FoodUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "g" | "gram" | "grams" => Ok(FoodUnit::Grams),
            "oz" | "ounce" | "ounces" => Ok(FoodUnit::Ounces),
            "lb" | "lbs" | "pound" | "pounds" => Ok(FoodUnit::Pounds),
            _ => Err(format!("Unknown food unit: {}", s)),
        }
    }
}

// ============================================================================
// Distance Units
// ============================================================================

/// Distance unit for reported health metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    Meters,
    #[default]
    Kilometers,
}

impl DistanceUnit {
    /// Convert from this unit to meters
    pub fn to_meters(&self, value: f64) -> f64 {
        match self {
            DistanceUnit::Meters => value,
            DistanceUnit::Kilometers => value * 1000.0,
        }
    }

    /// Convert from meters to this unit
    pub fn from_meters(&self, meters: f64) -> f64 {
        match self {
            DistanceUnit::Meters => meters,
            DistanceUnit::Kilometers => meters / 1000.0,
        }
    }

    pub fn abbreviation(&self) -> &'static str {
        match self {
            DistanceUnit::Meters => "m",
            DistanceUnit::Kilometers => "km",
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

// ============================================================================
// Portion Scaling
// ============================================================================

/// Nutrients of a portion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portion {
    pub calories: Decimal,
    pub carb: Decimal,
    pub protein: Decimal,
    pub fat: Decimal,
}

impl Portion {
    /// The unscaled per-100 g values of a food
    pub fn base(food: &FoodItem) -> Self {
        Self {
            calories: food.calories,
            carb: food.carb,
            protein: food.protein,
            fat: food.fat,
        }
    }
}

/// Scale a food's per-100 g values to an entered quantity
///
/// Each nutrient becomes `ceil(base / 100 × grams)`. Empty, non-numeric or
/// non-positive quantity text is rejected as malformed.
pub fn scale_portion(food: &FoodItem, quantity: &str, unit: FoodUnit) -> Result<Portion, CoreError> {
    let value = Decimal::from_str(quantity.trim())
        .map_err(|_| CoreError::MalformedInput(format!("quantity '{}'", quantity)))?;
    if value <= Decimal::ZERO {
        return Err(CoreError::MalformedInput(format!("quantity '{}'", quantity)));
    }

    let overflow = || CoreError::MalformedInput(format!("quantity '{}' is too large", quantity.trim()));
    let grams = unit.to_grams(value).ok_or_else(overflow)?;
    let scale = |base: Decimal| {
        (base / Decimal::ONE_HUNDRED)
            .checked_mul(grams)
            .map(|v| v.ceil())
            .ok_or_else(overflow)
    };

    Ok(Portion {
        calories: scale(food.calories)?,
        carb: scale(food.carb)?,
        protein: scale(food.protein)?,
        fat: scale(food.fat)?,
    })
}

/// Scale a portion, reverting to the base values on malformed text
pub fn portion_or_base(food: &FoodItem, quantity: &str, unit: FoodUnit) -> (Portion, Option<CoreError>) {
    match scale_portion(food, quantity, unit) {
        Ok(portion) => (portion, None),
        Err(err) => (Portion::base(food), Some(err)),
    }
}
