//! Weather data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One 3-hourly forecast step shown on the weather panel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastEntry {
    pub timestamp: DateTime<Utc>,
    pub temperature_celsius: f64,
    pub description: String,
}

/// Forecast summary for a city
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CityForecast {
    pub city: String,
    pub entries: Vec<ForecastEntry>,
}
