//! HTTP handlers for price-based suggestions

use axum::{
    extract::{Query, State},
    Json,
};
use shared::PriceSuggestion;

use crate::error::AppResult;
use crate::services::PriceQuery;
use crate::AppState;

/// Commodities trading at (or near) the expected price
pub async fn suggest_by_price(
    State(state): State<AppState>,
    Query(query): Query<PriceQuery>,
) -> AppResult<Json<PriceSuggestion>> {
    let suggestion = state
        .market
        .suggest_by_price(query.price, query.mode())
        .await?;
    Ok(Json(suggestion))
}
