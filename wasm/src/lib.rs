//! Gains Tracker WASM Module
//!
//! This crate provides WebAssembly bindings for the target calculator, the
//! meal goal allocator and portion scaling so a web view can compute them
//! without a round trip. Structured values cross the boundary as JSON.

use std::collections::BTreeMap;

use gains_tracker_shared::units::{portion_or_base, FoodUnit};
use gains_tracker_shared::{allocate_meal_goals, derive_targets, FoodItem, MealType, UserProfile};
use wasm_bindgen::prelude::*;

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Derived targets for a profile given as JSON
#[wasm_bindgen]
pub fn derive_targets_json(profile_json: &str) -> Result<String, JsValue> {
    let profile: UserProfile = serde_json::from_str(profile_json).map_err(to_js_error)?;
    serde_json::to_string(&derive_targets(&profile)).map_err(to_js_error)
}

/// Split a calorie total into `parts` near-equal integers
#[wasm_bindgen]
pub fn split_evenly(total: i32, parts: usize) -> Vec<i32> {
    gains_tracker_shared::split_evenly(total as i64, parts)
        .into_iter()
        .map(|v| v as i32)
        .collect()
}

/// Per-slot goals; `overrides_json` may be empty
#[wasm_bindgen]
pub fn meal_goals_json(target_calories: i32, overrides_json: &str) -> Result<String, JsValue> {
    let overrides: Option<BTreeMap<MealType, i64>> = if overrides_json.trim().is_empty() {
        None
    } else {
        Some(serde_json::from_str(overrides_json).map_err(to_js_error)?)
    };
    let goals = allocate_meal_goals(target_calories as i64, overrides.as_ref());
    serde_json::to_string(&goals).map_err(to_js_error)
}

/// Scale a food (JSON, per 100 g) to a quantity; reverts to base values on
/// malformed quantity text
#[wasm_bindgen]
pub fn scale_portion_json(food_json: &str, quantity: &str, unit: &str) -> Result<String, JsValue> {
    let food: FoodItem = serde_json::from_str(food_json).map_err(to_js_error)?;
    let unit: FoodUnit = unit.parse().unwrap_or_default();
    let (portion, _) = portion_or_base(&food, quantity, unit);
    serde_json::to_string(&portion).map_err(to_js_error)
}
