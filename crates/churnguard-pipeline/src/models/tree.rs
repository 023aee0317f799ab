//! Gini decision tree for binary classification.

use ndarray::{Array2, ArrayView1};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) enum TreeNode {
    Leaf {
        class: u8,
    },
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

/// A single decision tree: recursive binary splits on midpoint thresholds,
/// chosen by Gini impurity reduction over a per-split random feature subset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Option<TreeNode>,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features considered per split; `None` means all of them.
    pub max_features: Option<usize>,
    seed: u64,
    n_features: usize,
}

impl DecisionTree {
    pub fn new(seed: u64) -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed,
            n_features: 0,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    /// Grow the tree on the given training data.
    pub fn fit(&mut self, x: &Array2<f64>, y: &[u8]) -> Result<()> {
        let n_samples = x.nrows();
        if n_samples == 0 {
            return Err(PipelineError::Computation(
                "cannot fit a decision tree on zero samples".to_string(),
            ));
        }
        if n_samples != y.len() {
            return Err(PipelineError::Computation(format!(
                "feature matrix has {} rows but {} labels were given",
                n_samples,
                y.len()
            )));
        }

        self.n_features = x.ncols();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let indices: Vec<usize> = (0..n_samples).collect();
        self.root = Some(self.build_node(x, y, &indices, 0, &mut rng));
        Ok(())
    }

    /// Predict a class per row.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<u8>> {
        let root = self.root.as_ref().ok_or_else(|| {
            PipelineError::Computation("decision tree used before fitting".to_string())
        })?;

        Ok((0..x.nrows())
            .map(|i| Self::predict_row(root, x.row(i)))
            .collect())
    }

    fn predict_row(node: &TreeNode, row: ArrayView1<f64>) -> u8 {
        match node {
            TreeNode::Leaf { class } => *class,
            TreeNode::Split {
                feature_idx,
                threshold,
                left,
                right,
            } => {
                if row[*feature_idx] <= *threshold {
                    Self::predict_row(left, row)
                } else {
                    Self::predict_row(right, row)
                }
            }
        }
    }

    fn build_node(
        &self,
        x: &Array2<f64>,
        y: &[u8],
        indices: &[usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let n = indices.len();
        let positives = indices.iter().filter(|&&i| y[i] == 1).count();

        let is_pure = positives == 0 || positives == n;
        let depth_capped = self.max_depth.map_or(false, |d| depth >= d);
        if is_pure || depth_capped || n < self.min_samples_split {
            return Self::leaf(positives, n);
        }

        match self.find_best_split(x, y, indices, rng) {
            Some((feature_idx, threshold)) => {
                let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
                    .iter()
                    .partition(|&&i| x[(i, feature_idx)] <= threshold);

                let left = Box::new(self.build_node(x, y, &left_indices, depth + 1, rng));
                let right = Box::new(self.build_node(x, y, &right_indices, depth + 1, rng));

                TreeNode::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                }
            }
            None => Self::leaf(positives, n),
        }
    }

    fn leaf(positives: usize, n: usize) -> TreeNode {
        // Majority class; an exact tie goes to Not Churn.
        let class = if positives * 2 > n { 1 } else { 0 };
        TreeNode::Leaf { class }
    }

    /// Best (feature, midpoint threshold) by Gini gain across a random
    /// subset of features, honoring the leaf-size minimum. Returns `None`
    /// when no candidate split improves on the parent.
    fn find_best_split(
        &self,
        x: &Array2<f64>,
        y: &[u8],
        indices: &[usize],
        rng: &mut ChaCha8Rng,
    ) -> Option<(usize, f64)> {
        let n_features = x.ncols();
        let k = self
            .max_features
            .unwrap_or(n_features)
            .min(n_features)
            .max(1);

        let mut features: Vec<usize> = (0..n_features).collect();
        let candidates: Vec<usize> = if k < n_features {
            let (chosen, _) = features.partial_shuffle(rng, k);
            chosen.to_vec()
        } else {
            features
        };

        let n = indices.len();
        let total_positives = indices.iter().filter(|&&i| y[i] == 1).count();
        let parent_gini = gini(total_positives, n);

        let mut best: Option<(usize, f64, f64)> = None;

        for &feature_idx in &candidates {
            let mut order: Vec<(f64, u8)> = indices
                .iter()
                .map(|&i| (x[(i, feature_idx)], y[i]))
                .collect();
            order.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

            // Sweep left-to-right, keeping a running positive count so each
            // candidate threshold costs O(1).
            let mut left_positives = 0usize;
            for i in 1..n {
                left_positives += order[i - 1].1 as usize;

                if order[i - 1].0 == order[i].0 {
                    continue;
                }
                let left_n = i;
                let right_n = n - i;
                if left_n < self.min_samples_leaf || right_n < self.min_samples_leaf {
                    continue;
                }

                let right_positives = total_positives - left_positives;
                let weighted = (left_n as f64 * gini(left_positives, left_n)
                    + right_n as f64 * gini(right_positives, right_n))
                    / n as f64;
                let gain = parent_gini - weighted;

                if gain > best.map_or(0.0, |(_, _, g)| g) {
                    let threshold = (order[i - 1].0 + order[i].0) / 2.0;
                    best = Some((feature_idx, threshold, gain));
                }
            }
        }

        best.map(|(feature_idx, threshold, _)| (feature_idx, threshold))
    }
}

fn gini(positives: usize, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let p = positives as f64 / n as f64;
    let q = 1.0 - p;
    1.0 - p * p - q * q
}
