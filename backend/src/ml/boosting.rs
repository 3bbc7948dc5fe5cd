//! Multinomial gradient boosting
//!
//! One regression tree per class per round, fitted to the softmax residuals
//! `y - p`. Leaves take a single Newton step,
//! `(K-1)/K * sum(r) / sum(|r| (1 - |r|))`, and start from log class priors.

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::tree::{RegressionTree, TreeParams};
use super::{check_row, check_training, softmax, Classifier, ClassifierKind};
use crate::config::ModelConfig;
use crate::error::AppResult;

const MIN_PRIOR: f64 = 1e-12;

#[derive(Debug, Clone)]
pub struct GradientBoosting {
    n_rounds: usize,
    learning_rate: f64,
    max_depth: usize,
    min_samples_split: usize,
    seed: u64,
    n_features: usize,
    init: Vec<f64>,
    /// `stages[round][class]`
    stages: Vec<Vec<RegressionTree>>,
}

impl GradientBoosting {
    pub fn new(n_rounds: usize, learning_rate: f64, max_depth: usize, seed: u64) -> Self {
        Self {
            n_rounds,
            learning_rate,
            max_depth,
            min_samples_split: 2,
            seed,
            n_features: 0,
            init: Vec::new(),
            stages: Vec::new(),
        }
    }

    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            min_samples_split: config.min_samples_split,
            ..Self::new(
                config.n_rounds,
                config.learning_rate,
                config.boosting_depth,
                config.seed,
            )
        }
    }

    /// Raw additive scores before the softmax
    fn scores(&self, row: &[f64]) -> Vec<f64> {
        let mut scores = self.init.clone();
        for stage in &self.stages {
            for (score, tree) in scores.iter_mut().zip(stage) {
                *score += self.learning_rate * tree.predict(row);
            }
        }
        scores
    }
}

impl Classifier for GradientBoosting {
    fn fit(&mut self, features: &[Vec<f64>], labels: &[usize], n_classes: usize) -> AppResult<()> {
        let width = check_training(features, labels, n_classes)?;
        let n = features.len();
        let k = n_classes as f64;

        let mut counts = vec![0.0; n_classes];
        for &label in labels {
            counts[label] += 1.0;
        }
        let init: Vec<f64> = counts
            .iter()
            .map(|c| (c / n as f64).max(MIN_PRIOR).ln())
            .collect();

        let params = TreeParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            max_features: None,
        };
        let mut rng = StdRng::seed_from_u64(self.seed);
        let all: Vec<usize> = (0..n).collect();
        let mut scores: Vec<Vec<f64>> = vec![init.clone(); n];
        let mut stages = Vec::with_capacity(self.n_rounds);

        for _ in 0..self.n_rounds {
            let probs: Vec<Vec<f64>> = scores.iter().map(|s| softmax(s)).collect();
            let mut stage = Vec::with_capacity(n_classes);

            for class in 0..n_classes {
                let residuals: Vec<f64> = (0..n)
                    .map(|i| {
                        let y = if labels[i] == class { 1.0 } else { 0.0 };
                        y - probs[i][class]
                    })
                    .collect();

                let tree = RegressionTree::fit(features, &residuals, &all, params, &mut rng, |idx| {
                    let numerator: f64 = idx.iter().map(|&i| residuals[i]).sum();
                    let denominator: f64 = idx
                        .iter()
                        .map(|&i| {
                            let r = residuals[i].abs();
                            r * (1.0 - r)
                        })
                        .sum();
                    if denominator.abs() < 1e-12 {
                        0.0
                    } else {
                        (k - 1.0) / k * numerator / denominator
                    }
                });

                for (row, score) in features.iter().zip(scores.iter_mut()) {
                    score[class] += self.learning_rate * tree.predict(row);
                }
                stage.push(tree);
            }
            stages.push(stage);
        }

        tracing::debug!(
            "Fitted gradient boosting: {} rounds, {} rows, {} classes",
            stages.len(),
            n,
            n_classes
        );
        self.init = init;
        self.stages = stages;
        self.n_features = width;
        Ok(())
    }

    fn predict_proba(&self, row: &[f64]) -> AppResult<Vec<f64>> {
        check_row(row, self.n_features)?;
        Ok(softmax(&self.scores(row)))
    }

    fn kind(&self) -> ClassifierKind {
        ClassifierKind::Boosted
    }
}
