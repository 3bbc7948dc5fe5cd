//! Weather API client for city forecasts
//!
//! Integrates with the OpenWeatherMap 5 day / 3 hour forecast endpoint.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use shared::{CityForecast, ForecastEntry};

use crate::error::{AppError, AppResult};

/// Weather API client
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
}

/// OpenWeatherMap API response for forecast
#[derive(Debug, Deserialize)]
struct OWMForecastResponse {
    #[serde(default)]
    city: Option<OWMCity>,
    list: Vec<OWMForecastItem>,
}

#[derive(Debug, Deserialize)]
struct OWMCity {
    name: String,
}

#[derive(Debug, Deserialize)]
struct OWMForecastItem {
    dt: i64,
    main: OWMMain,
    #[serde(default)]
    weather: Vec<OWMWeather>,
}

#[derive(Debug, Deserialize)]
struct OWMMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OWMWeather {
    description: String,
}

impl WeatherClient {
    /// Create a WeatherClient against `base_url` (e.g. `https://api.openweathermap.org/data/2.5`)
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the 3-hourly forecast for a city, in API order.
    ///
    /// Every failure (transport, non-2xx, malformed body) collapses to
    /// `WeatherServiceUnavailable`; the detail is only logged.
    pub async fn get_forecast(&self, city: &str) -> AppResult<CityForecast> {
        let url = format!("{}/forecast", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Weather API request failed: {}", e);
                AppError::WeatherServiceUnavailable
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Weather API error for {}: {} - {}", city, status, body);
            return Err(AppError::WeatherServiceUnavailable);
        }

        let data: OWMForecastResponse = response.json().await.map_err(|e| {
            tracing::warn!("Failed to parse forecast response: {}", e);
            AppError::WeatherServiceUnavailable
        })?;

        Ok(convert_forecast_response(city, data))
    }
}

/// Convert OpenWeatherMap forecast response to our format
fn convert_forecast_response(city: &str, data: OWMForecastResponse) -> CityForecast {
    let entries = data
        .list
        .into_iter()
        .map(|item| ForecastEntry {
            timestamp: DateTime::from_timestamp(item.dt, 0).unwrap_or_else(Utc::now),
            temperature_celsius: item.main.temp,
            description: item
                .weather
                .into_iter()
                .next()
                .map(|w| w.description)
                .unwrap_or_default(),
        })
        .collect();

    CityForecast {
        city: data
            .city
            .map(|c| c.name)
            .unwrap_or_else(|| city.trim().to_string()),
        entries,
    }
}
