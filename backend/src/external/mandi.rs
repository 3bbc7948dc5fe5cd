//! Mandi price API client
//!
//! Reads current daily commodity prices from the data.gov.in open data
//! resource. Records arrive with every field as a string.

use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::MandiPrice;
use std::str::FromStr;

use crate::error::{AppError, AppResult};

/// Mandi price API client
#[derive(Clone)]
pub struct MandiClient {
    client: Client,
    api_key: String,
    endpoint: String,
    limit: u32,
}

#[derive(Debug, Deserialize)]
struct MandiResponse {
    #[serde(default)]
    records: Vec<MandiRecord>,
}

#[derive(Debug, Deserialize)]
struct MandiRecord {
    #[serde(default)]
    commodity: String,
    #[serde(default)]
    modal_price: serde_json::Value,
    #[serde(default)]
    state: String,
    #[serde(default)]
    market: String,
}

impl MandiClient {
    pub fn new(api_key: String, endpoint: String, limit: u32) -> Self {
        Self {
            client: Client::new(),
            api_key,
            endpoint,
            limit,
        }
    }

    /// Fetch the latest records, in API order.
    ///
    /// Records whose modal price is missing or not numeric are skipped.
    /// Transport, status and body failures become `MarketServiceUnavailable`.
    pub async fn fetch_prices(&self) -> AppResult<Vec<MandiPrice>> {
        let limit = self.limit.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("api-key", self.api_key.as_str()),
                ("format", "json"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Mandi API request failed: {}", e);
                AppError::MarketServiceUnavailable
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Mandi API error: {} - {}", status, body);
            return Err(AppError::MarketServiceUnavailable);
        }

        let data: MandiResponse = response.json().await.map_err(|e| {
            tracing::warn!("Failed to parse mandi response: {}", e);
            AppError::MarketServiceUnavailable
        })?;

        Ok(convert_records(data.records))
    }
}

fn convert_records(records: Vec<MandiRecord>) -> Vec<MandiPrice> {
    let total = records.len();
    let prices: Vec<MandiPrice> = records
        .into_iter()
        .filter_map(|record| {
            let modal_price = parse_price(&record.modal_price)?;
            Some(MandiPrice {
                commodity: record.commodity,
                modal_price,
                state: record.state,
                market: record.market,
            })
        })
        .collect();

    if prices.len() < total {
        tracing::debug!(
            "Skipped {} mandi records without a positive modal price",
            total - prices.len()
        );
    }
    prices
}

/// Modal prices must be positive to be usable
fn parse_price(value: &serde_json::Value) -> Option<Decimal> {
    let price = match value {
        serde_json::Value::String(s) => Decimal::from_str(s.trim()).ok(),
        serde_json::Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    }?;
    (price > Decimal::ZERO).then_some(price)
}
