//! Price-only crop suggestions from live mandi prices

use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{
    validate_expected_price, validate_price_tolerance, MandiPrice, PriceMatchMode,
    PriceSuggestion, TOP_PRICE_SUGGESTIONS,
};

use crate::config::MandiConfig;
use crate::error::{AppError, AppResult};
use crate::external::MandiClient;

/// Query for the price panel
#[derive(Debug, Clone, Deserialize)]
pub struct PriceQuery {
    /// Expected price (₹ per quintal)
    pub price: Decimal,
    /// When present, match within this distance instead of at-or-above
    #[serde(default)]
    pub tolerance: Option<Decimal>,
}

impl PriceQuery {
    pub fn mode(&self) -> PriceMatchMode {
        match self.tolerance {
            Some(tolerance) => PriceMatchMode::Within { tolerance },
            None => PriceMatchMode::AtOrAbove,
        }
    }
}

#[derive(Clone)]
pub struct MarketService {
    mandi_client: Option<MandiClient>,
}

impl MarketService {
    pub fn new() -> Self {
        Self { mandi_client: None }
    }

    pub fn with_client(client: MandiClient) -> Self {
        Self {
            mandi_client: Some(client),
        }
    }

    pub fn from_config(config: &MandiConfig) -> Self {
        if config.api_key.trim().is_empty() {
            tracing::warn!("Mandi API key not configured; price suggestions disabled");
            return Self::new();
        }
        Self::with_client(MandiClient::new(
            config.api_key.clone(),
            config.api_endpoint.clone(),
            config.limit,
        ))
    }

    /// Commodities whose modal price matches the expected price.
    ///
    /// The price is checked before any request is made.
    pub async fn suggest_by_price(
        &self,
        expected: Decimal,
        mode: PriceMatchMode,
    ) -> AppResult<PriceSuggestion> {
        validate_expected_price(expected).map_err(|_| AppError::InvalidPrice)?;
        if let PriceMatchMode::Within { tolerance } = mode {
            validate_price_tolerance(tolerance)
                .map_err(|msg| AppError::validation("tolerance", msg))?;
        }

        let client = self.mandi_client.as_ref().ok_or_else(|| {
            tracing::warn!("Mandi API client not configured");
            AppError::MarketServiceUnavailable
        })?;

        let records = client.fetch_prices().await?;
        tracing::debug!("Fetched {} mandi records", records.len());
        Ok(select_prices(records, expected, mode, TOP_PRICE_SUGGESTIONS))
    }
}

impl Default for MarketService {
    fn default() -> Self {
        Self::new()
    }
}

/// Matching records, at most `limit`.
///
/// At-or-above keeps API order; within-tolerance puts the closest first
/// (stable, so equal distances keep API order).
pub fn select_prices(
    records: Vec<MandiPrice>,
    expected: Decimal,
    mode: PriceMatchMode,
    limit: usize,
) -> PriceSuggestion {
    let mut prices: Vec<MandiPrice> = records
        .into_iter()
        .filter(|p| mode.accepts(p.modal_price, expected))
        .collect();

    if let PriceMatchMode::Within { .. } = mode {
        prices.sort_by_key(|p| {
            p.modal_price
                .checked_sub(expected)
                .map_or(Decimal::MAX, |d| d.abs())
        });
    }
    prices.truncate(limit);

    if prices.is_empty() {
        let reason = match mode {
            PriceMatchMode::AtOrAbove => {
                format!("No crops found at or above ₹{} per quintal", expected)
            }
            PriceMatchMode::Within { tolerance } => format!(
                "No crops found within ₹{} of ₹{} per quintal",
                tolerance, expected
            ),
        };
        return PriceSuggestion::NoMatch { reason };
    }
    PriceSuggestion::Matched { prices }
}
