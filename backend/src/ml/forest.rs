//! Random forest of bootstrap-sampled Gini trees

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::tree::{ClassificationTree, TreeParams};
use super::{check_row, check_training, Classifier, ClassifierKind};
use crate::config::ModelConfig;
use crate::error::AppResult;

#[derive(Debug, Clone)]
pub struct RandomForest {
    n_trees: usize,
    max_depth: usize,
    min_samples_split: usize,
    seed: u64,
    n_classes: usize,
    n_features: usize,
    trees: Vec<ClassificationTree>,
}

impl RandomForest {
    pub fn new(n_trees: usize, max_depth: usize, seed: u64) -> Self {
        Self {
            n_trees,
            max_depth,
            min_samples_split: 2,
            seed,
            n_classes: 0,
            n_features: 0,
            trees: Vec::new(),
        }
    }

    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            min_samples_split: config.min_samples_split,
            ..Self::new(config.n_trees, config.max_depth, config.seed)
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Classifier for RandomForest {
    fn fit(&mut self, features: &[Vec<f64>], labels: &[usize], n_classes: usize) -> AppResult<()> {
        let width = check_training(features, labels, n_classes)?;
        let params = TreeParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            max_features: Some((width as f64).sqrt().ceil() as usize),
        };

        let mut rng = StdRng::seed_from_u64(self.seed);
        let n = features.len();
        let mut trees = Vec::with_capacity(self.n_trees);
        for _ in 0..self.n_trees.max(1) {
            let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            trees.push(ClassificationTree::fit(
                features, labels, &bootstrap, n_classes, params, &mut rng,
            ));
        }

        tracing::debug!(
            "Fitted random forest: {} trees, {} rows, {} classes",
            trees.len(),
            n,
            n_classes
        );
        self.trees = trees;
        self.n_classes = n_classes;
        self.n_features = width;
        Ok(())
    }

    fn predict_proba(&self, row: &[f64]) -> AppResult<Vec<f64>> {
        check_row(row, self.n_features)?;
        let mut proba = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (p, leaf) in proba.iter_mut().zip(tree.predict_proba(row)) {
                *p += leaf;
            }
        }
        let n = self.trees.len() as f64;
        Ok(proba.into_iter().map(|p| p / n).collect())
    }

    fn kind(&self) -> ClassifierKind {
        ClassifierKind::Forest
    }
}
