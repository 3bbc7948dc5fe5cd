//! User-supplied soil and climate readings

use serde::{Deserialize, Serialize};
use validator::Validate;

/// One set of readings submitted for a single prediction.
///
/// Which optional readings are required depends on the columns of the
/// loaded training table: a table with a `rainfall` column needs
/// `rainfall`, a table with `Soil Type` needs `soil_type`, and so on.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct SoilSample {
    /// Nitrogen content (kg/ha)
    #[serde(alias = "N")]
    #[validate(range(min = 0.0, max = 300.0))]
    pub nitrogen: f64,

    /// Phosphorous content (kg/ha)
    #[serde(alias = "P", alias = "phosphorus")]
    #[validate(range(min = 0.0, max = 300.0))]
    pub phosphorous: f64,

    /// Potassium content (kg/ha)
    #[serde(alias = "K")]
    #[validate(range(min = 0.0, max = 300.0))]
    pub potassium: f64,

    /// Air temperature (°C)
    #[validate(range(min = -10.0, max = 60.0))]
    pub temperature: f64,

    /// Relative humidity (%)
    #[validate(range(min = 0.0, max = 100.0))]
    pub humidity: f64,

    /// Soil moisture (%)
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0))]
    pub moisture: Option<f64>,

    /// Rainfall (mm)
    #[serde(default)]
    #[validate(range(min = 0.0, max = 5000.0))]
    pub rainfall: Option<f64>,

    /// Soil pH
    #[serde(default)]
    #[validate(range(min = 0.0, max = 14.0))]
    pub ph: Option<f64>,

    /// Soil type as spelled in the training table (e.g. "Sandy", "Loamy")
    #[serde(default)]
    pub soil_type: Option<String>,
}

impl SoilSample {
    /// Readings common to every table layout
    pub fn new(
        nitrogen: f64,
        phosphorous: f64,
        potassium: f64,
        temperature: f64,
        humidity: f64,
    ) -> Self {
        Self {
            nitrogen,
            phosphorous,
            potassium,
            temperature,
            humidity,
            moisture: None,
            rainfall: None,
            ph: None,
            soil_type: None,
        }
    }

    pub fn with_moisture(mut self, moisture: f64) -> Self {
        self.moisture = Some(moisture);
        self
    }

    pub fn with_rainfall(mut self, rainfall: f64) -> Self {
        self.rainfall = Some(rainfall);
        self
    }

    pub fn with_ph(mut self, ph: f64) -> Self {
        self.ph = Some(ph);
        self
    }

    pub fn with_soil_type(mut self, soil_type: impl Into<String>) -> Self {
        self.soil_type = Some(soil_type.into());
        self
    }
}
