//! Rows of the bundled reference tables

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Season;
use crate::types::names_match;

/// A labelled training row of the crop table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CropRecord {
    pub label: String,
    pub soil_type: Option<String>,
    /// Numeric readings, in the column order of the table's feature schema
    pub features: Vec<f64>,
    /// Price per quintal, when the table carries one
    pub price: Option<Decimal>,
}

/// A district-level production record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegionRecord {
    pub state: String,
    pub district: String,
    /// Season as written in the source (`Kharif`, `Rabi`, `Whole Year`, ...)
    pub season: String,
    pub crop: String,
    pub year: Option<i32>,
    pub area: Option<f64>,
    pub production: Option<f64>,
}

impl RegionRecord {
    pub fn is_in(&self, state: &str, district: &str) -> bool {
        names_match(&self.state, state) && names_match(&self.district, district)
    }

    /// Whole-year crops are grown in every season; "Summer" rows are Zaid.
    pub fn grown_in(&self, season: Season) -> bool {
        if names_match(&self.season, "Whole Year") {
            return true;
        }
        self.season
            .parse::<Season>()
            .map(|s| s == season)
            .unwrap_or(false)
    }
}

/// Local reference price of a crop (₹ per quintal)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceRecord {
    pub crop: String,
    pub price: Decimal,
}
