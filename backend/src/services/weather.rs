//! Weather service for the forecast panel

use shared::{validate_city, CityForecast, FORECAST_ENTRIES};

use crate::config::WeatherConfig;
use crate::error::{AppError, AppResult};
use crate::external::WeatherClient;

/// Weather service wrapping the forecast client
#[derive(Clone)]
pub struct WeatherService {
    weather_client: Option<WeatherClient>,
}

impl WeatherService {
    /// Service without an API client; every lookup is unavailable
    pub fn new() -> Self {
        Self {
            weather_client: None,
        }
    }

    pub fn with_client(client: WeatherClient) -> Self {
        Self {
            weather_client: Some(client),
        }
    }

    /// Client from configuration; no key means no client
    pub fn from_config(config: &WeatherConfig) -> Self {
        if config.api_key.trim().is_empty() {
            tracing::warn!("Weather API key not configured; forecasts disabled");
            return Self::new();
        }
        Self::with_client(WeatherClient::with_base_url(
            config.api_key.clone(),
            config.api_endpoint.clone(),
        ))
    }

    /// The first few forecast steps for a city
    pub async fn forecast(&self, city: &str) -> AppResult<CityForecast> {
        validate_city(city).map_err(|msg| AppError::validation("city", msg))?;

        let client = self.weather_client.as_ref().ok_or_else(|| {
            tracing::warn!("Weather API client not configured");
            AppError::WeatherServiceUnavailable
        })?;

        let mut forecast = client.get_forecast(city.trim()).await?;
        forecast.entries.truncate(FORECAST_ENTRIES);
        Ok(forecast)
    }
}

impl Default for WeatherService {
    fn default() -> Self {
        Self::new()
    }
}
