//! HTTP handlers for model predictions and recommendations

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Serialize;
use shared::{
    validate_region_name, PredictionResult, RecommendationOutcome, RegionQuery, SoilSample,
};

use crate::error::{AppError, AppResult};
use crate::services::{ModelSummary, RecommendationRequest};
use crate::AppState;

/// Full ranked distribution for a soil sample
pub async fn predict(
    State(state): State<AppState>,
    Json(sample): Json<SoilSample>,
) -> AppResult<Json<PredictionResult>> {
    let result = state.recommendations.predict(&sample).await?;
    Ok(Json(result))
}

/// Top crops for a sample, optionally restricted by region and price
pub async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<RecommendationOutcome>> {
    if let Some(region) = &request.filter.region {
        check_region(region)?;
    }
    let outcome = state.recommendations.recommend(&request).await?;
    Ok(Json(outcome))
}

#[derive(Debug, Serialize)]
pub struct RegionCropsResponse {
    pub region: RegionQuery,
    pub crops: Vec<String>,
}

/// Crops recorded for a state and district
pub async fn get_region_crops(
    State(state): State<AppState>,
    Query(query): Query<RegionQuery>,
) -> AppResult<Json<RegionCropsResponse>> {
    check_region(&query)?;
    let crops = state.recommendations.region_crops(&query).await?;
    Ok(Json(RegionCropsResponse {
        region: query,
        crops,
    }))
}

/// Summary of the fitted model
pub async fn get_model_summary(State(state): State<AppState>) -> AppResult<Json<ModelSummary>> {
    Ok(Json(state.recommendations.model_summary().await?))
}

fn check_region(region: &RegionQuery) -> AppResult<()> {
    validate_region_name(&region.state).map_err(|msg| AppError::validation("state", msg))?;
    validate_region_name(&region.district).map_err(|msg| AppError::validation("district", msg))
}
