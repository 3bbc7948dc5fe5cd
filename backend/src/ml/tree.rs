//! CART decision trees
//!
//! Binary trees stored in a flat arena. Samples go left when
//! `row[feature] <= threshold`. Classification trees split on Gini impurity
//! and keep a normalised class distribution per leaf; regression trees split
//! on squared error and take their leaf value from the caller (boosting uses
//! a Newton step there).

use rand::rngs::StdRng;
use rand::seq::index::sample;

const MIN_GAIN: f64 = 1e-12;

/// Growth limits shared by both tree kinds
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    /// Features examined per split; `None` examines all of them
    pub max_features: Option<usize>,
}

#[derive(Debug, Clone)]
enum Node<L> {
    Leaf(L),
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone)]
struct Arena<L> {
    nodes: Vec<Node<L>>,
}

impl<L> Arena<L> {
    fn leaf_for(&self, row: &[f64]) -> &L {
        let mut at = 0;
        loop {
            match &self.nodes[at] {
                Node::Leaf(value) => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    at = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    fn depth(&self) -> usize {
        fn walk<L>(nodes: &[Node<L>], at: usize) -> usize {
            match &nodes[at] {
                Node::Leaf(_) => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        walk(&self.nodes, 0)
    }
}

#[derive(Debug, Clone, Copy)]
struct SplitChoice {
    feature: usize,
    threshold: f64,
    /// Position in the feature-sorted index slice where the right side starts
    cut: usize,
    score: f64,
}

/// Features to examine at one node
fn candidate_features(n_features: usize, params: &TreeParams, rng: &mut StdRng) -> Vec<usize> {
    match params.max_features {
        Some(k) if k < n_features => sample(rng, n_features, k.max(1)).into_vec(),
        _ => (0..n_features).collect(),
    }
}

fn sorted_by_feature(rows: &[Vec<f64>], indices: &[usize], feature: usize) -> Vec<usize> {
    let mut sorted = indices.to_vec();
    sorted.sort_by(|&a, &b| rows[a][feature].total_cmp(&rows[b][feature]));
    sorted
}

/// Partition `indices` in place around a split; returns the left length
fn partition(rows: &[Vec<f64>], indices: &mut [usize], feature: usize, threshold: f64) -> usize {
    let mut left = 0;
    for i in 0..indices.len() {
        if rows[indices[i]][feature] <= threshold {
            indices.swap(left, i);
            left += 1;
        }
    }
    left
}

// ============================================================================
// Classification
// ============================================================================

/// Gini classification tree with class-distribution leaves
#[derive(Debug, Clone)]
pub struct ClassificationTree {
    arena: Arena<Vec<f64>>,
}

struct ClassificationGrower<'a> {
    rows: &'a [Vec<f64>],
    labels: &'a [usize],
    n_classes: usize,
    params: TreeParams,
    nodes: Vec<Node<Vec<f64>>>,
}

impl ClassificationTree {
    /// Fit on the rows named by `indices` (repeats allowed, as in a bootstrap)
    pub fn fit(
        rows: &[Vec<f64>],
        labels: &[usize],
        indices: &[usize],
        n_classes: usize,
        params: TreeParams,
        rng: &mut StdRng,
    ) -> Self {
        let mut grower = ClassificationGrower {
            rows,
            labels,
            n_classes,
            params,
            nodes: Vec::new(),
        };
        let mut working = indices.to_vec();
        grower.grow(&mut working, 0, rng);
        Self {
            arena: Arena {
                nodes: grower.nodes,
            },
        }
    }

    /// Class distribution of the leaf the row falls into (sums to 1)
    pub fn predict_proba(&self, row: &[f64]) -> &[f64] {
        self.arena.leaf_for(row)
    }

    pub fn depth(&self) -> usize {
        self.arena.depth()
    }
}

impl ClassificationGrower<'_> {
    fn counts(&self, indices: &[usize]) -> Vec<f64> {
        let mut counts = vec![0.0; self.n_classes];
        for &i in indices {
            counts[self.labels[i]] += 1.0;
        }
        counts
    }

    fn leaf(&mut self, counts: Vec<f64>) -> usize {
        let total: f64 = counts.iter().sum();
        let distribution = if total > 0.0 {
            counts.into_iter().map(|c| c / total).collect()
        } else {
            vec![1.0 / self.n_classes as f64; self.n_classes]
        };
        self.nodes.push(Node::Leaf(distribution));
        self.nodes.len() - 1
    }

    fn grow(&mut self, indices: &mut [usize], depth: usize, rng: &mut StdRng) -> usize {
        let counts = self.counts(indices);
        let n = indices.len() as f64;
        let pure = counts.iter().filter(|&&c| c > 0.0).count() <= 1;
        if pure
            || depth >= self.params.max_depth
            || indices.len() < self.params.min_samples_split.max(2)
        {
            return self.leaf(counts);
        }

        // Sum over children of n * gini, to be minimised
        let parent_score = n - counts.iter().map(|c| c * c).sum::<f64>() / n;
        let split = match self.best_split(indices, &counts, parent_score, rng) {
            Some(split) => split,
            None => return self.leaf(counts),
        };

        let cut = partition(self.rows, indices, split.feature, split.threshold);
        debug_assert_eq!(cut, split.cut);

        let at = self.nodes.len();
        self.nodes.push(Node::Leaf(Vec::new()));
        let (left_idx, right_idx) = indices.split_at_mut(cut);
        let left = self.grow(left_idx, depth + 1, rng);
        let right = self.grow(right_idx, depth + 1, rng);
        self.nodes[at] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        at
    }

    fn best_split(
        &self,
        indices: &[usize],
        counts: &[f64],
        parent_score: f64,
        rng: &mut StdRng,
    ) -> Option<SplitChoice> {
        let n_features = self.rows.first().map_or(0, |r| r.len());
        let mut best: Option<SplitChoice> = None;

        for feature in candidate_features(n_features, &self.params, rng) {
            let sorted = sorted_by_feature(self.rows, indices, feature);
            let mut left = vec![0.0; self.n_classes];
            let mut left_sq = 0.0;
            let mut right = counts.to_vec();
            let mut right_sq: f64 = right.iter().map(|c| c * c).sum();

            for pos in 0..sorted.len() - 1 {
                let class = self.labels[sorted[pos]];
                left_sq += 2.0 * left[class] + 1.0;
                left[class] += 1.0;
                right_sq -= 2.0 * right[class] - 1.0;
                right[class] -= 1.0;

                let here = self.rows[sorted[pos]][feature];
                let next = self.rows[sorted[pos + 1]][feature];
                if here == next {
                    continue;
                }
                let nl = (pos + 1) as f64;
                let nr = (sorted.len() - pos - 1) as f64;
                let score = (nl - left_sq / nl) + (nr - right_sq / nr);
                if parent_score - score > MIN_GAIN
                    && best.map_or(true, |b| score < b.score)
                {
                    best = Some(SplitChoice {
                        feature,
                        threshold: midpoint(here, next),
                        cut: pos + 1,
                        score,
                    });
                }
            }
        }
        best
    }
}

// ============================================================================
// Regression
// ============================================================================

/// Squared-error regression tree with caller-computed leaf values
#[derive(Debug, Clone)]
pub struct RegressionTree {
    arena: Arena<f64>,
}

struct RegressionGrower<'a, F> {
    rows: &'a [Vec<f64>],
    targets: &'a [f64],
    params: TreeParams,
    leaf_value: F,
    nodes: Vec<Node<f64>>,
}

impl RegressionTree {
    /// Fit `targets` on the rows named by `indices`. `leaf_value` maps the
    /// sample indices that reach a leaf to that leaf's output.
    pub fn fit<F>(
        rows: &[Vec<f64>],
        targets: &[f64],
        indices: &[usize],
        params: TreeParams,
        rng: &mut StdRng,
        leaf_value: F,
    ) -> Self
    where
        F: Fn(&[usize]) -> f64,
    {
        let mut grower = RegressionGrower {
            rows,
            targets,
            params,
            leaf_value,
            nodes: Vec::new(),
        };
        let mut working = indices.to_vec();
        grower.grow(&mut working, 0, rng);
        Self {
            arena: Arena {
                nodes: grower.nodes,
            },
        }
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        *self.arena.leaf_for(row)
    }
}

impl<F> RegressionGrower<'_, F>
where
    F: Fn(&[usize]) -> f64,
{
    fn leaf(&mut self, indices: &[usize]) -> usize {
        let value = (self.leaf_value)(indices);
        self.nodes.push(Node::Leaf(if value.is_finite() { value } else { 0.0 }));
        self.nodes.len() - 1
    }

    fn grow(&mut self, indices: &mut [usize], depth: usize, rng: &mut StdRng) -> usize {
        if depth >= self.params.max_depth || indices.len() < self.params.min_samples_split.max(2)
        {
            return self.leaf(indices);
        }

        let split = match self.best_split(indices, rng) {
            Some(split) => split,
            None => return self.leaf(indices),
        };

        let cut = partition(self.rows, indices, split.feature, split.threshold);
        let at = self.nodes.len();
        self.nodes.push(Node::Leaf(0.0));
        let (left_idx, right_idx) = indices.split_at_mut(cut);
        let left = self.grow(left_idx, depth + 1, rng);
        let right = self.grow(right_idx, depth + 1, rng);
        self.nodes[at] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        at
    }

    /// Maximises sum_l^2 / n_l + sum_r^2 / n_r, i.e. minimises squared error
    fn best_split(&self, indices: &[usize], rng: &mut StdRng) -> Option<SplitChoice> {
        let n_features = self.rows.first().map_or(0, |r| r.len());
        let total: f64 = indices.iter().map(|&i| self.targets[i]).sum();
        let parent_score = total * total / indices.len() as f64;
        let mut best: Option<SplitChoice> = None;

        for feature in candidate_features(n_features, &self.params, rng) {
            let sorted = sorted_by_feature(self.rows, indices, feature);
            let mut left_sum = 0.0;

            for pos in 0..sorted.len() - 1 {
                left_sum += self.targets[sorted[pos]];
                let here = self.rows[sorted[pos]][feature];
                let next = self.rows[sorted[pos + 1]][feature];
                if here == next {
                    continue;
                }
                let nl = (pos + 1) as f64;
                let nr = (sorted.len() - pos - 1) as f64;
                let right_sum = total - left_sum;
                let score = left_sum * left_sum / nl + right_sum * right_sum / nr;
                if score - parent_score > MIN_GAIN && best.map_or(true, |b| score > b.score) {
                    best = Some(SplitChoice {
                        feature,
                        threshold: midpoint(here, next),
                        cut: pos + 1,
                        score,
                    });
                }
            }
        }
        best
    }
}

/// Threshold between two distinct sorted values; falls back to the lower
/// value when the midpoint rounds onto the upper one
fn midpoint(low: f64, high: f64) -> f64 {
    let mid = low + (high - low) / 2.0;
    if mid >= high {
        low
    } else {
        mid
    }
}
