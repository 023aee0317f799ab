//! Random forest: bootstrap-sampled Gini trees voting on the class.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::Context;
use ndarray::{Array2, Axis};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::models::tree::DecisionTree;
use crate::models::BinaryClassifier;

/// One hyperparameter configuration for the forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    /// `None` grows every tree until its leaves are pure.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            bootstrap: true,
            seed: 42,
        }
    }
}

/// Tree-ensemble classifier. Created untrained, fitted once, then used
/// read-only for prediction; serializable for the persistence sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    params: ForestParams,
    trees: Vec<DecisionTree>,
    n_features: usize,
}

impl RandomForestClassifier {
    pub fn new(params: ForestParams) -> Self {
        Self {
            params,
            trees: Vec::new(),
            n_features: 0,
        }
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Serialize the fitted model to a JSON artifact.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("failed to create model file {}", path.display()))?;
        serde_json::to_writer(BufWriter::new(file), self)
            .with_context(|| format!("failed to serialize model to {}", path.display()))?;
        Ok(())
    }

    /// Load a previously saved model artifact.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("failed to open model file {}", path.display()))?;
        let model = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("failed to parse model file {}", path.display()))?;
        Ok(model)
    }
}

impl BinaryClassifier for RandomForestClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &[u8]) -> Result<()> {
        let n_samples = x.nrows();
        if n_samples == 0 {
            return Err(PipelineError::Computation(
                "cannot fit a random forest on zero samples".to_string(),
            ));
        }
        if n_samples != y.len() {
            return Err(PipelineError::Computation(format!(
                "feature matrix has {} rows but {} labels were given",
                n_samples,
                y.len()
            )));
        }
        if let Some(&bad) = y.iter().find(|&&label| label > 1) {
            return Err(PipelineError::Computation(format!(
                "labels must be 0 or 1, found {}",
                bad
            )));
        }
        if self.params.n_estimators == 0 {
            return Err(PipelineError::Configuration(
                "a random forest needs at least one tree".to_string(),
            ));
        }

        self.n_features = x.ncols();
        // sqrt feature subsampling, the usual classifier default.
        let max_features = ((self.n_features as f64).sqrt().ceil() as usize).max(1);

        let params = &self.params;
        let trees: Vec<DecisionTree> = (0..params.n_estimators)
            .into_par_iter()
            .map(|tree_idx| -> Result<DecisionTree> {
                let tree_seed = params.seed.wrapping_add(tree_idx as u64);
                let mut rng = ChaCha8Rng::seed_from_u64(tree_seed);

                let sample_indices: Vec<usize> = if params.bootstrap {
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
                } else {
                    (0..n_samples).collect()
                };

                let x_boot = x.select(Axis(0), &sample_indices);
                let y_boot: Vec<u8> = sample_indices.iter().map(|&i| y[i]).collect();

                let mut tree = DecisionTree::new(tree_seed)
                    .with_min_samples_split(params.min_samples_split)
                    .with_min_samples_leaf(params.min_samples_leaf)
                    .with_max_features(max_features);
                if let Some(depth) = params.max_depth {
                    tree = tree.with_max_depth(depth);
                }

                tree.fit(&x_boot, &y_boot)?;
                Ok(tree)
            })
            .collect::<Result<Vec<_>>>()?;

        self.trees = trees;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<u8>> {
        if self.trees.is_empty() {
            return Err(PipelineError::Computation(
                "random forest used before fitting".to_string(),
            ));
        }
        if x.ncols() != self.n_features {
            return Err(PipelineError::Computation(format!(
                "model was fitted on {} features but given {}",
                self.n_features,
                x.ncols()
            )));
        }

        let per_tree: Vec<Vec<u8>> = self
            .trees
            .par_iter()
            .map(|tree| tree.predict(x))
            .collect::<Result<Vec<_>>>()?;

        let n_trees = per_tree.len();
        let predictions = (0..x.nrows())
            .map(|i| {
                let votes = per_tree.iter().filter(|preds| preds[i] == 1).count();
                // Majority vote; an exact tie goes to Not Churn.
                if votes * 2 > n_trees {
                    1
                } else {
                    0
                }
            })
            .collect();

        Ok(predictions)
    }

    fn name(&self) -> &str {
        "random_forest"
    }
}
