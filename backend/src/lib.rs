//! Crop Advisor - Backend Server
//!
//! Suggests crops for a field from a season/soil rule table, a classifier
//! trained on soil and climate readings, district production records and
//! live mandi prices.

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod dataset;
pub mod error;
pub mod external;
pub mod handlers;
pub mod ml;
pub mod routes;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};

use dataset::DatasetCache;
use services::{MarketService, RecommendationService, WeatherService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub recommendations: Arc<RecommendationService>,
    pub market: MarketService,
    pub weather: WeatherService,
}

impl AppState {
    /// State with services built from configuration; nothing is loaded yet
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);
        let datasets = Arc::new(DatasetCache::new());
        Self {
            recommendations: Arc::new(RecommendationService::new(
                Arc::clone(&config),
                datasets,
            )),
            market: MarketService::from_config(&config.mandi),
            weather: WeatherService::from_config(&config.weather),
            config,
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Crop Advisor API v1.0"
}
