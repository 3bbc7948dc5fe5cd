//! WebAssembly module for the Crop Advisor
//!
//! Provides client-side computation for:
//! - Season/soil rule lookups
//! - Offline validation of prices and soil samples

use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&JsValue::from_str("crop advisor wasm loaded"));
}

/// Rule-table crops for a season and soil, as a JS array of strings
#[wasm_bindgen]
pub fn rule_crops(season: &str, soil: &str) -> Result<js_sys::Array, JsValue> {
    let crops = rule_crop_names(season, soil).map_err(|e| JsValue::from_str(&e))?;
    Ok(crops.into_iter().map(JsValue::from).collect())
}

/// Whether an expected price (₹ per quintal) can be submitted
#[wasm_bindgen]
pub fn validate_expected_price(price: f64) -> bool {
    let price = Decimal::try_from(price).unwrap_or(Decimal::ZERO);
    shared::validate_expected_price(price).is_ok()
}

/// Validate a soil sample given as JSON
#[wasm_bindgen]
pub fn validate_sample(sample_json: &str) -> Result<(), JsValue> {
    check_sample_json(sample_json).map_err(|e| JsValue::from_str(&e))
}

fn rule_crop_names(season: &str, soil: &str) -> Result<Vec<&'static str>, String> {
    shared::rules::lookup(season, soil)
        .map(|crops| crops.to_vec())
        .map_err(|e| e.to_string())
}

fn check_sample_json(sample_json: &str) -> Result<(), String> {
    let sample: SoilSample = serde_json::from_str(sample_json)
        .map_err(|e| format!("Invalid sample JSON: {}", e))?;
    shared::validate_sample(&sample).map_err(str::to_string)
}
