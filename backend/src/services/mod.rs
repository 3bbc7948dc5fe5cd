//! Business logic services for the Crop Advisor

pub mod market;
pub mod recommendation;
pub mod weather;

pub use market::{MarketService, PriceQuery};
pub use recommendation::{
    ModelSummary, RecommendationFilter, RecommendationRequest, RecommendationService, Recommender,
};
pub use weather::WeatherService;
