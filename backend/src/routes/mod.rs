//! Route definitions for the Crop Advisor API

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Season/soil rule table
        .route("/rules", get(handlers::get_rule_crops))
        // Model-backed prediction
        .route("/predictions", post(handlers::predict))
        .route("/recommendations", post(handlers::recommend))
        .route("/model", get(handlers::get_model_summary))
        // District production records
        .nest("/regions", region_routes())
        // Live market prices
        .nest("/market", market_routes())
        // Weather forecast
        .nest("/weather", weather_routes())
}

fn region_routes() -> Router<AppState> {
    Router::new().route("/crops", get(handlers::get_region_crops))
}

fn market_routes() -> Router<AppState> {
    Router::new().route("/suggestions", get(handlers::suggest_by_price))
}

fn weather_routes() -> Router<AppState> {
    Router::new().route("/forecast", get(handlers::get_city_forecast))
}
