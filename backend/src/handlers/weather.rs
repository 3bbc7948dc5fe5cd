//! HTTP handlers for the forecast panel

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use shared::CityForecast;

use crate::error::AppResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    #[serde(default)]
    pub city: String,
}

/// Next few 3-hourly forecast steps for a city
pub async fn get_city_forecast(
    State(state): State<AppState>,
    Query(query): Query<ForecastQuery>,
) -> AppResult<Json<CityForecast>> {
    let forecast = state.weather.forecast(&query.city).await?;
    Ok(Json(forecast))
}
