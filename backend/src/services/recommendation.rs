//! Classifier-backed crop recommendation
//!
//! The recommender is fitted once from the crop table on first use and kept
//! for the life of the process. Predictions can then be restricted to the
//! crops a district actually grows and/or to crops under a price ceiling.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    names_match, validate_expected_price, validate_soil_type, CropScore, PredictionResult,
    RecommendationOutcome, RegionQuery, SoilSample, TOP_RECOMMENDATIONS,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::OnceCell;
use validator::Validate;

use crate::config::{Config, DatasetConfig, ModelConfig};
use crate::dataset::{CropTable, DatasetCache, FeatureSchema, RegionTable};
use crate::error::{AppError, AppResult};
use crate::ml::{self, Classifier, ClassifierKind, LabelEncoder};

/// A fitted classifier together with the encoders it was trained through
pub struct Recommender {
    schema: FeatureSchema,
    soil_encoder: Option<LabelEncoder>,
    crop_encoder: LabelEncoder,
    classifier: Box<dyn Classifier>,
    rows: usize,
}

/// Description of the fitted model
#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    pub classifier: ClassifierKind,
    pub rows: usize,
    pub features: Vec<&'static str>,
    pub crops: Vec<String>,
    pub soil_types: Vec<String>,
}

/// Optional restrictions applied to a ranked prediction
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendationFilter {
    #[serde(default)]
    pub region: Option<RegionQuery>,
    /// Highest acceptable price (₹ per quintal)
    #[serde(default)]
    pub price_ceiling: Option<Decimal>,
}

/// Input for a filtered recommendation
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationRequest {
    pub sample: SoilSample,
    #[serde(flatten)]
    pub filter: RecommendationFilter,
}

impl Recommender {
    /// Encode the table and fit the configured classifier
    pub fn fit(table: &CropTable, config: &ModelConfig) -> AppResult<Self> {
        if table.is_empty() {
            return Err(AppError::Model("empty training set".to_string()));
        }

        let crop_encoder = LabelEncoder::fit("crop", table.records.iter().map(|r| &r.label));
        let soil_encoder = if table.schema.has_soil_type {
            Some(LabelEncoder::fit(
                "soil type",
                table
                    .records
                    .iter()
                    .filter_map(|r| r.soil_type.as_deref()),
            ))
        } else {
            None
        };

        let mut features = Vec::with_capacity(table.len());
        let mut labels = Vec::with_capacity(table.len());
        for record in &table.records {
            let mut row = record.features.clone();
            if let (Some(encoder), Some(soil)) = (&soil_encoder, &record.soil_type) {
                row.push(encoder.encode(soil)? as f64);
            }
            features.push(row);
            labels.push(crop_encoder.encode(&record.label)?);
        }

        let mut classifier = ml::build(config);
        classifier.fit(&features, &labels, crop_encoder.len())?;

        tracing::info!(
            "Fitted {} on {} rows ({} crops)",
            classifier.kind(),
            table.len(),
            crop_encoder.len()
        );

        Ok(Self {
            schema: table.schema,
            soil_encoder,
            crop_encoder,
            classifier,
            rows: table.len(),
        })
    }

    /// Feature row for a sample, in training column order
    pub fn encode(&self, sample: &SoilSample) -> AppResult<Vec<f64>> {
        sample.validate()?;
        if let Some(soil) = sample.soil_type.as_deref() {
            validate_soil_type(soil).map_err(|msg| AppError::validation("soil_type", msg))?;
        }
        let mut row = self.schema.numeric_readings(sample)?;
        if let Some(encoder) = &self.soil_encoder {
            let soil = sample
                .soil_type
                .as_deref()
                .ok_or_else(|| AppError::validation("soil_type", "soil type is required"))?;
            row.push(encoder.encode(soil)? as f64);
        }
        Ok(row)
    }

    /// Probability per crop in `labels()` order
    pub fn predict_proba(&self, sample: &SoilSample) -> AppResult<Vec<f64>> {
        let row = self.encode(sample)?;
        self.classifier.predict_proba(&row)
    }

    /// Every fitted crop, most likely first
    pub fn predict(&self, sample: &SoilSample) -> AppResult<PredictionResult> {
        let proba = self.predict_proba(sample)?;
        Ok(PredictionResult {
            crops: ml::rank(&proba, self.labels()),
        })
    }

    pub fn labels(&self) -> &[String] {
        self.crop_encoder.classes()
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            classifier: self.classifier.kind(),
            rows: self.rows,
            features: self.schema.feature_names(),
            crops: self.crop_encoder.classes().to_vec(),
            soil_types: self
                .soil_encoder
                .as_ref()
                .map(|e| e.classes().to_vec())
                .unwrap_or_default(),
        }
    }
}

/// Restrict a ranking to a region's crops and a price ceiling, keep the
/// ranking order and truncate to `limit`.
pub fn filter_ranked(
    ranked: Vec<CropScore>,
    filter: &RecommendationFilter,
    regions: Option<&RegionTable>,
    prices: &HashMap<String, Decimal>,
    limit: usize,
) -> RecommendationOutcome {
    let allowed: Option<Vec<String>> = match (&filter.region, regions) {
        (Some(query), Some(table)) => Some(region_crops(table, query)),
        (Some(_), None) => Some(Vec::new()),
        (None, _) => None,
    };

    let crops: Vec<CropScore> = ranked
        .into_iter()
        .filter(|score| {
            allowed
                .as_ref()
                .map_or(true, |crops| crops.iter().any(|c| names_match(c, &score.crop)))
        })
        .filter(|score| match filter.price_ceiling {
            Some(ceiling) => prices
                .get(&score.crop.trim().to_lowercase())
                .map_or(false, |price| *price <= ceiling),
            None => true,
        })
        .take(limit)
        .collect();

    if crops.is_empty() {
        let reason = match (&filter.region, filter.price_ceiling) {
            (Some(q), Some(ceiling)) => format!(
                "No suitable crop grown in {}, {} within ₹{}",
                q.district, q.state, ceiling
            ),
            (Some(q), None) => format!("No suitable crop grown in {}, {}", q.district, q.state),
            (None, Some(ceiling)) => format!("No suitable crop priced within ₹{}", ceiling),
            (None, None) => "No suitable crop found".to_string(),
        };
        return RecommendationOutcome::NoMatch { reason };
    }
    RecommendationOutcome::Matched { crops }
}

/// Distinct crops recorded for a district (and season, when given), sorted
pub fn region_crops(table: &RegionTable, query: &RegionQuery) -> Vec<String> {
    table
        .records
        .iter()
        .filter(|r| r.is_in(&query.state, &query.district))
        .filter(|r| query.season.map_or(true, |s| r.grown_in(s)))
        .map(|r| r.crop.trim().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Recommendation service owning the memoized recommender
pub struct RecommendationService {
    config: Arc<Config>,
    datasets: Arc<DatasetCache>,
    recommender: OnceCell<Arc<Recommender>>,
}

impl RecommendationService {
    pub fn new(config: Arc<Config>, datasets: Arc<DatasetCache>) -> Self {
        Self {
            config,
            datasets,
            recommender: OnceCell::new(),
        }
    }

    /// Fitted recommender. The first caller loads and fits on the blocking
    /// pool; concurrent callers wait for it. Failures are not cached.
    pub async fn recommender(&self) -> AppResult<Arc<Recommender>> {
        let recommender = self
            .recommender
            .get_or_try_init(|| async {
                let datasets = Arc::clone(&self.datasets);
                let path = self.config.datasets.crop_path.clone();
                let model = self.config.model.clone();
                let fitted = tokio::task::spawn_blocking(move || {
                    let table = datasets.crop_table(&path)?;
                    Recommender::fit(&table, &model)
                })
                .await
                .map_err(|e| AppError::Internal(format!("model fitting task failed: {}", e)))??;
                Ok::<_, AppError>(Arc::new(fitted))
            })
            .await?;
        Ok(Arc::clone(recommender))
    }

    pub fn is_ready(&self) -> bool {
        self.recommender.initialized()
    }

    /// Full ranked distribution for a sample
    pub async fn predict(&self, sample: &SoilSample) -> AppResult<PredictionResult> {
        let recommender = self.recommender().await?;
        recommender.predict(sample)
    }

    /// Top crops for a sample after region and price restrictions
    pub async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> AppResult<RecommendationOutcome> {
        if let Some(ceiling) = request.filter.price_ceiling {
            validate_expected_price(ceiling).map_err(|_| AppError::InvalidPrice)?;
        }

        let recommender = self.recommender().await?;
        let ranked = recommender.predict(&request.sample)?;

        let regions = match &request.filter.region {
            Some(_) => Some(
                self.load(|datasets, paths| datasets.region_table(&paths.region_path))
                    .await?,
            ),
            None => None,
        };
        let prices = match request.filter.price_ceiling {
            Some(_) => self.load(price_map).await?,
            None => HashMap::new(),
        };

        let outcome = filter_ranked(
            ranked.crops,
            &request.filter,
            regions.as_deref(),
            &prices,
            TOP_RECOMMENDATIONS,
        );
        if let RecommendationOutcome::NoMatch { reason } = &outcome {
            tracing::info!("Recommendation without match: {}", reason);
        }
        Ok(outcome)
    }

    /// Crops grown in a region
    pub async fn region_crops(&self, query: &RegionQuery) -> AppResult<Vec<String>> {
        let table = self
            .load(|datasets, paths| datasets.region_table(&paths.region_path))
            .await?;
        Ok(region_crops(&table, query))
    }

    pub async fn model_summary(&self) -> AppResult<ModelSummary> {
        Ok(self.recommender().await?.summary())
    }

    /// Run a dataset read on the blocking pool; CSV loads can be large
    async fn load<T, F>(&self, read: F) -> AppResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&DatasetCache, &DatasetConfig) -> AppResult<T> + Send + 'static,
    {
        let datasets = Arc::clone(&self.datasets);
        let config = Arc::clone(&self.config);
        tokio::task::spawn_blocking(move || read(&datasets, &config.datasets))
            .await
            .map_err(|e| AppError::Internal(format!("dataset load task failed: {}", e)))?
    }
}

/// Price per crop: the price table when present, else the mean of the
/// crop table's own price column
fn price_map(
    datasets: &DatasetCache,
    paths: &DatasetConfig,
) -> AppResult<HashMap<String, Decimal>> {
    match datasets.price_table(&paths.price_path) {
        Ok(table) => Ok(table.price_map()),
        Err(AppError::DatasetUnavailable { path }) => {
            tracing::warn!("Price table {} missing, using crop table prices", path);
            let crops = datasets.crop_table(&paths.crop_path)?;
            Ok(crops.mean_prices())
        }
        Err(e) => Err(e),
    }
}
