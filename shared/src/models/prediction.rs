//! Prediction and recommendation results

use serde::{Deserialize, Serialize};

/// One ranked crop with the classifier's confidence in it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CropScore {
    pub crop: String,
    /// Probability in [0, 1]
    pub confidence: f64,
}

impl CropScore {
    pub fn new(crop: impl Into<String>, confidence: f64) -> Self {
        Self {
            crop: crop.into(),
            confidence,
        }
    }
}

/// Ordered (crop, confidence) pairs, most likely first
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PredictionResult {
    pub crops: Vec<CropScore>,
}

impl PredictionResult {
    pub fn top(&self) -> Option<&CropScore> {
        self.crops.first()
    }
}

/// Outcome of a filtered recommendation.
///
/// An empty intersection is reported as `NoMatch`, never as an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecommendationOutcome {
    Matched { crops: Vec<CropScore> },
    NoMatch { reason: String },
}

impl RecommendationOutcome {
    pub fn crops(&self) -> &[CropScore] {
        match self {
            RecommendationOutcome::Matched { crops } => crops,
            RecommendationOutcome::NoMatch { .. } => &[],
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, RecommendationOutcome::Matched { .. })
    }
}
