//! Tabular classifiers for crop prediction
//!
//! Three interchangeable implementations sit behind [`Classifier`]: a random
//! forest, multinomial gradient boosting, and gradient boosting with
//! isotonic probability calibration. All fit synchronously from scratch and
//! are deterministic for a fixed seed.

pub mod boosting;
pub mod calibration;
pub mod encoder;
pub mod forest;
pub mod tree;

pub use boosting::GradientBoosting;
pub use calibration::{CalibratedBoosting, IsotonicRegression};
pub use encoder::LabelEncoder;
pub use forest::RandomForest;

use serde::{Deserialize, Serialize};
use shared::CropScore;
use std::fmt;

use crate::config::ModelConfig;
use crate::error::{AppError, AppResult};

/// A multi-class probabilistic classifier
pub trait Classifier: Send + Sync {
    /// Train on `features` (one row per sample) and class indices in
    /// `0..n_classes`. Blocks until done.
    fn fit(&mut self, features: &[Vec<f64>], labels: &[usize], n_classes: usize) -> AppResult<()>;

    /// Probability per fitted class; sums to 1
    fn predict_proba(&self, row: &[f64]) -> AppResult<Vec<f64>>;

    fn kind(&self) -> ClassifierKind;
}

/// Which classifier backs the recommender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    Forest,
    Boosted,
    Calibrated,
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifierKind::Forest => write!(f, "random forest"),
            ClassifierKind::Boosted => write!(f, "gradient boosting"),
            ClassifierKind::Calibrated => write!(f, "calibrated gradient boosting"),
        }
    }
}

/// Unfitted classifier configured from `config`
pub fn build(config: &ModelConfig) -> Box<dyn Classifier> {
    match config.kind {
        ClassifierKind::Forest => Box::new(RandomForest::from_config(config)),
        ClassifierKind::Boosted => Box::new(GradientBoosting::from_config(config)),
        ClassifierKind::Calibrated => Box::new(CalibratedBoosting::from_config(config)),
    }
}

/// Pair probabilities with labels, most likely first.
///
/// The sort is stable, so equal probabilities keep label (class index) order.
pub fn rank(probabilities: &[f64], labels: &[String]) -> Vec<CropScore> {
    let mut order: Vec<usize> = (0..probabilities.len().min(labels.len())).collect();
    order.sort_by(|&a, &b| probabilities[b].total_cmp(&probabilities[a]));
    order
        .into_iter()
        .map(|i| CropScore::new(labels[i].clone(), probabilities[i]))
        .collect()
}

/// Shape checks shared by every `fit`; returns the feature width
pub(crate) fn check_training(
    features: &[Vec<f64>],
    labels: &[usize],
    n_classes: usize,
) -> AppResult<usize> {
    if features.is_empty() {
        return Err(AppError::Model("empty training set".to_string()));
    }
    if features.len() != labels.len() {
        return Err(AppError::Model(format!(
            "{} rows but {} labels",
            features.len(),
            labels.len()
        )));
    }
    if n_classes == 0 {
        return Err(AppError::Model("no classes to fit".to_string()));
    }
    let width = features[0].len();
    if width == 0 {
        return Err(AppError::Model("rows have no features".to_string()));
    }
    if let Some(row) = features.iter().position(|r| r.len() != width) {
        return Err(AppError::Model(format!(
            "row {} has {} features, expected {}",
            row,
            features[row].len(),
            width
        )));
    }
    if let Some(&label) = labels.iter().find(|&&l| l >= n_classes) {
        return Err(AppError::Model(format!(
            "label {} outside 0..{}",
            label, n_classes
        )));
    }
    Ok(width)
}

pub(crate) fn check_row(row: &[f64], width: usize) -> AppResult<()> {
    if width == 0 {
        return Err(AppError::Model("classifier has not been fitted".to_string()));
    }
    if row.len() != width {
        return Err(AppError::Model(format!(
            "sample has {} features, model expects {}",
            row.len(),
            width
        )));
    }
    Ok(())
}

/// Numerically stable softmax
pub(crate) fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exp: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exp.iter().sum();
    exp.into_iter().map(|e| e / sum).collect()
}
