//! HTTP handlers

pub mod health;
pub mod market;
pub mod recommendation;
pub mod rules;
pub mod weather;

pub use health::health_check;
pub use market::suggest_by_price;
pub use recommendation::{get_model_summary, get_region_crops, predict, recommend};
pub use rules::get_rule_crops;
pub use weather::get_city_forecast;
