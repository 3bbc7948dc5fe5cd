//! Configuration management for the Crop Advisor
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with CROP_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

use crate::ml::ClassifierKind;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Bundled table locations
    pub datasets: DatasetConfig,

    /// Classifier selection and hyper-parameters
    pub model: ModelConfig,

    /// Weather API configuration
    pub weather: WeatherConfig,

    /// Mandi price API configuration
    pub mandi: MandiConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatasetConfig {
    /// Soil/climate readings labelled with a crop
    pub crop_path: String,

    /// District production records
    pub region_path: String,

    /// Local crop price table
    pub price_path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    pub kind: ClassifierKind,

    /// Trees in the random forest
    pub n_trees: usize,

    /// Maximum depth of forest trees
    pub max_depth: usize,

    pub min_samples_split: usize,

    /// Boosting rounds
    pub n_rounds: usize,

    /// Depth of each boosted regression tree
    pub boosting_depth: usize,

    pub learning_rate: f64,

    /// Folds used to collect out-of-fold scores for calibration
    pub calibration_folds: usize,

    pub seed: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    /// Weather API endpoint
    pub api_endpoint: String,

    /// Weather API key
    pub api_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MandiConfig {
    /// Open-data resource endpoint
    pub api_endpoint: String,

    /// Open-data API key
    pub api_key: String,

    /// Records requested per call
    pub limit: u32,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("CROP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 8501)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("datasets.crop_path", "data/crop_recommendation.csv")?
            .set_default("datasets.region_path", "data/crop_production.csv")?
            .set_default("datasets.price_path", "data/crop_prices.csv")?
            .set_default("model.kind", "forest")?
            .set_default("model.n_trees", 100)?
            .set_default("model.max_depth", 16)?
            .set_default("model.min_samples_split", 2)?
            .set_default("model.n_rounds", 100)?
            .set_default("model.boosting_depth", 3)?
            .set_default("model.learning_rate", 0.1)?
            .set_default("model.calibration_folds", 3)?
            .set_default("model.seed", 42)?
            .set_default(
                "weather.api_endpoint",
                "https://api.openweathermap.org/data/2.5",
            )?
            .set_default("weather.api_key", "")?
            .set_default(
                "mandi.api_endpoint",
                "https://api.data.gov.in/resource/9ef84268-d588-465a-a308-a864a43d0070",
            )?
            .set_default("mandi.api_key", "")?
            .set_default("mandi.limit", 100)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (CROP_ prefix)
            .add_source(
                Environment::with_prefix("CROP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8501,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            kind: ClassifierKind::Forest,
            n_trees: 100,
            max_depth: 16,
            min_samples_split: 2,
            n_rounds: 100,
            boosting_depth: 3,
            learning_rate: 0.1,
            calibration_folds: 3,
            seed: 42,
        }
    }
}

impl ModelConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.n_trees == 0 || self.n_rounds == 0 {
            return Err("model.n_trees and model.n_rounds must be positive".to_string());
        }
        if self.max_depth == 0 || self.boosting_depth == 0 {
            return Err("tree depths must be positive".to_string());
        }
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err("model.learning_rate must be in (0, 1]".to_string());
        }
        if self.calibration_folds < 2 {
            return Err("model.calibration_folds must be at least 2".to_string());
        }
        Ok(())
    }
}
