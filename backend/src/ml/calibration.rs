//! Isotonic probability calibration
//!
//! The calibrated classifier collects out-of-fold boosted probabilities,
//! fits one monotone (pool-adjacent-violators) map per class from raw
//! probability to observed frequency, then refits the boosted model on every
//! row. Calibrated outputs are renormalised to sum to 1.

use serde::Serialize;

use super::boosting::GradientBoosting;
use super::{check_row, check_training, Classifier, ClassifierKind};
use crate::config::ModelConfig;
use crate::error::{AppError, AppResult};

/// Monotone non-decreasing step map with linear interpolation between knots
#[derive(Debug, Clone, Serialize, Default)]
pub struct IsotonicRegression {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl IsotonicRegression {
    pub fn fit(x: &[f64], y: &[f64]) -> Self {
        let mut pairs: Vec<(f64, f64)> = x.iter().copied().zip(y.iter().copied()).collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        // (sum of y, weight, lowest x, highest x)
        let mut blocks: Vec<(f64, f64, f64, f64)> = Vec::with_capacity(pairs.len());
        for (xi, yi) in pairs {
            blocks.push((yi, 1.0, xi, xi));
            while blocks.len() > 1 {
                let last = blocks[blocks.len() - 1];
                let before = blocks[blocks.len() - 2];
                if before.0 / before.1 <= last.0 / last.1 {
                    break;
                }
                blocks.pop();
                if let Some(pooled) = blocks.last_mut() {
                    pooled.0 += last.0;
                    pooled.1 += last.1;
                    pooled.3 = last.3;
                }
            }
        }

        let mut knots_x = Vec::with_capacity(blocks.len() * 2);
        let mut knots_y = Vec::with_capacity(blocks.len() * 2);
        for (sum, weight, lo, hi) in blocks {
            let mean = sum / weight;
            knots_x.push(lo);
            knots_y.push(mean);
            if hi > lo {
                knots_x.push(hi);
                knots_y.push(mean);
            }
        }
        Self {
            x: knots_x,
            y: knots_y,
        }
    }

    /// Calibrated value; inputs outside the fitted range are clipped
    pub fn predict(&self, value: f64) -> f64 {
        match self.x.len() {
            0 => value,
            1 => self.y[0],
            _ => {
                let last = self.x.len() - 1;
                if value <= self.x[0] {
                    return self.y[0];
                }
                if value >= self.x[last] {
                    return self.y[last];
                }
                // First knot strictly greater than value
                let hi = self.x.partition_point(|&k| k <= value);
                let lo = hi - 1;
                let span = self.x[hi] - self.x[lo];
                if span <= 0.0 {
                    return self.y[hi];
                }
                let t = (value - self.x[lo]) / span;
                self.y[lo] + t * (self.y[hi] - self.y[lo])
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct CalibratedBoosting {
    config: ModelConfig,
    folds: usize,
    n_features: usize,
    base: Option<GradientBoosting>,
    calibrators: Vec<IsotonicRegression>,
}

impl CalibratedBoosting {
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            config: config.clone(),
            folds: config.calibration_folds,
            n_features: 0,
            base: None,
            calibrators: Vec::new(),
        }
    }

    /// Fold of every row: each class's rows are dealt round-robin so every
    /// fold sees every class that has at least `folds` rows
    fn assign_folds(&self, labels: &[usize], n_classes: usize) -> Vec<usize> {
        let mut next = vec![0usize; n_classes];
        labels
            .iter()
            .map(|&label| {
                let fold = next[label] % self.folds;
                next[label] += 1;
                fold
            })
            .collect()
    }
}

impl Classifier for CalibratedBoosting {
    fn fit(&mut self, features: &[Vec<f64>], labels: &[usize], n_classes: usize) -> AppResult<()> {
        let width = check_training(features, labels, n_classes)?;
        if self.folds < 2 {
            return Err(AppError::Model(
                "calibration needs at least 2 folds".to_string(),
            ));
        }
        if features.len() < self.folds * 2 {
            return Err(AppError::Model(format!(
                "calibration needs at least {} rows, got {}",
                self.folds * 2,
                features.len()
            )));
        }

        let fold_of = self.assign_folds(labels, n_classes);
        let mut out_of_fold = vec![Vec::new(); features.len()];

        for fold in 0..self.folds {
            let (train_rows, train_labels): (Vec<Vec<f64>>, Vec<usize>) = features
                .iter()
                .zip(labels)
                .zip(&fold_of)
                .filter(|(_, f)| **f != fold)
                .map(|((row, &label), _)| (row.clone(), label))
                .unzip();
            if train_rows.is_empty() {
                return Err(AppError::Model(format!("fold {} left no training rows", fold)));
            }

            let mut model = GradientBoosting::from_config(&self.config);
            model.fit(&train_rows, &train_labels, n_classes)?;
            for (i, row) in features.iter().enumerate() {
                if fold_of[i] == fold {
                    out_of_fold[i] = model.predict_proba(row)?;
                }
            }
        }

        self.calibrators = (0..n_classes)
            .map(|class| {
                let raw: Vec<f64> = out_of_fold.iter().map(|p| p[class]).collect();
                let hits: Vec<f64> = labels
                    .iter()
                    .map(|&l| if l == class { 1.0 } else { 0.0 })
                    .collect();
                IsotonicRegression::fit(&raw, &hits)
            })
            .collect();

        let mut base = GradientBoosting::from_config(&self.config);
        base.fit(features, labels, n_classes)?;
        self.base = Some(base);
        self.n_features = width;

        tracing::debug!(
            "Fitted calibrated boosting: {} folds, {} classes",
            self.folds,
            n_classes
        );
        Ok(())
    }

    fn predict_proba(&self, row: &[f64]) -> AppResult<Vec<f64>> {
        check_row(row, self.n_features)?;
        let base = self
            .base
            .as_ref()
            .ok_or_else(|| AppError::Model("classifier has not been fitted".to_string()))?;
        let raw = base.predict_proba(row)?;

        let calibrated: Vec<f64> = raw
            .iter()
            .zip(&self.calibrators)
            .map(|(p, iso)| iso.predict(*p).clamp(0.0, 1.0))
            .collect();
        let total: f64 = calibrated.iter().sum();
        if total <= 1e-12 {
            return Ok(raw);
        }
        Ok(calibrated.into_iter().map(|p| p / total).collect())
    }

    fn kind(&self) -> ClassifierKind {
        ClassifierKind::Calibrated
    }
}
