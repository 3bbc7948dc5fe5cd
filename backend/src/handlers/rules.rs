//! HTTP handlers for the season/soil rule table

use axum::{extract::Query, Json};
use serde::{Deserialize, Serialize};
use shared::ParseError;

use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct RuleQuery {
    pub season: String,
    pub soil: String,
}

#[derive(Debug, Serialize)]
pub struct RuleResponse {
    pub season: String,
    pub soil: String,
    pub crops: Vec<&'static str>,
}

/// Rule-based crops for a season and soil
pub async fn get_rule_crops(Query(query): Query<RuleQuery>) -> AppResult<Json<RuleResponse>> {
    let crops = shared::rules::lookup(&query.season, &query.soil).map_err(|e| {
        let field = match e {
            ParseError::UnknownSeason(_) => "season",
            ParseError::UnknownSoil(_) => "soil",
        };
        AppError::validation(field, e.to_string())
    })?;

    Ok(Json(RuleResponse {
        season: query.season.trim().to_string(),
        soil: query.soil.trim().to_string(),
        crops: crops.to_vec(),
    }))
}
