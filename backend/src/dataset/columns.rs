//! Header aliases for the bundled CSV tables
//!
//! The tables in circulation spell the same column several ways
//! ("Soil Type"/"soil_type", "Crop Type"/"label", "Temparature"/"temperature").
//! Lookups are case-insensitive after trimming.

use csv::StringRecord;

use crate::error::{AppError, AppResult};

pub const LABEL: &[&str] = &["Crop Type", "label", "crop", "Crop Name"];
pub const SOIL_TYPE: &[&str] = &["Soil Type", "soil_type", "soil"];
pub const NITROGEN: &[&str] = &["Nitrogen", "N"];
pub const PHOSPHOROUS: &[&str] = &["Phosphorous", "Phosphorus", "P"];
pub const POTASSIUM: &[&str] = &["Potassium", "K"];
pub const TEMPERATURE: &[&str] = &["Temparature", "Temperature"];
pub const HUMIDITY: &[&str] = &["Humidity", "Humidity "];
pub const MOISTURE: &[&str] = &["Moisture"];
pub const RAINFALL: &[&str] = &["rainfall"];
pub const PH: &[&str] = &["ph"];
pub const PRICE: &[&str] = &["price", "modal_price", "Price (Rs/quintal)"];

pub const STATE: &[&str] = &["State_Name", "State"];
pub const DISTRICT: &[&str] = &["District_Name", "District"];
pub const SEASON: &[&str] = &["Season"];
pub const CROP: &[&str] = &["Crop", "commodity"];
pub const YEAR: &[&str] = &["Crop_Year", "Year"];
pub const AREA: &[&str] = &["Area"];
pub const PRODUCTION: &[&str] = &["Production"];

/// Position of the first header matching any alias
pub fn find(headers: &StringRecord, aliases: &[&str]) -> Option<usize> {
    headers.iter().position(|h| {
        aliases
            .iter()
            .any(|alias| h.trim().eq_ignore_ascii_case(alias.trim()))
    })
}

pub fn require(headers: &StringRecord, aliases: &[&str]) -> AppResult<usize> {
    find(headers, aliases).ok_or_else(|| {
        AppError::Dataset(format!("missing column (expected one of {:?})", aliases))
    })
}
