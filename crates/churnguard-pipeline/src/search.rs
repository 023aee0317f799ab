//! Randomized hyperparameter search validated by stratified k-fold
//! cross-validation.

use ndarray::{Array2, Axis};
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cross_validation::StratifiedKFold;
use crate::error::{PipelineError, Result};
use crate::metrics;
use crate::models::{BinaryClassifier, ForestParams, RandomForestClassifier};

/// Hyperparameter ranges the search draws from. Integer ranges are
/// half-open `[lo, hi)`; the remaining dimensions are explicit choices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSpace {
    pub n_estimators: (usize, usize),
    pub max_depth: Vec<Option<usize>>,
    pub min_samples_split: (usize, usize),
    pub min_samples_leaf: (usize, usize),
    pub bootstrap: Vec<bool>,
}

impl Default for SearchSpace {
    fn default() -> Self {
        Self {
            n_estimators: (100, 500),
            max_depth: vec![None, Some(10), Some(20), Some(30)],
            min_samples_split: (2, 20),
            min_samples_leaf: (1, 10),
            bootstrap: vec![true, false],
        }
    }
}

impl SearchSpace {
    pub fn validate(&self) -> Result<()> {
        for (name, (lo, hi)) in [
            ("n_estimators", self.n_estimators),
            ("min_samples_split", self.min_samples_split),
            ("min_samples_leaf", self.min_samples_leaf),
        ] {
            if lo >= hi {
                return Err(PipelineError::Configuration(format!(
                    "search range for {} is empty: [{}, {})",
                    name, lo, hi
                )));
            }
        }
        if self.max_depth.is_empty() {
            return Err(PipelineError::Configuration(
                "search space has no max_depth choices".to_string(),
            ));
        }
        if self.bootstrap.is_empty() {
            return Err(PipelineError::Configuration(
                "search space has no bootstrap choices".to_string(),
            ));
        }
        if self.n_estimators.0 == 0 {
            return Err(PipelineError::Configuration(
                "n_estimators range must start at 1 or higher".to_string(),
            ));
        }
        Ok(())
    }

    /// Draw one configuration, uniform and independent per dimension. The
    /// model seed is fixed across candidates so score differences come from
    /// the hyperparameters alone.
    pub fn sample(&self, rng: &mut ChaCha8Rng, model_seed: u64) -> ForestParams {
        ForestParams {
            n_estimators: rng.gen_range(self.n_estimators.0..self.n_estimators.1),
            max_depth: *self
                .max_depth
                .choose(rng)
                .expect("search space validated before sampling"),
            min_samples_split: rng.gen_range(self.min_samples_split.0..self.min_samples_split.1),
            min_samples_leaf: rng.gen_range(self.min_samples_leaf.0..self.min_samples_leaf.1),
            bootstrap: *self
                .bootstrap
                .choose(rng)
                .expect("search space validated before sampling"),
            seed: model_seed,
        }
    }
}

/// Search settings: how many configurations to draw and how to validate
/// each one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub n_iter: usize,
    pub cv_folds: usize,
    pub seed: u64,
    pub space: SearchSpace,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            n_iter: 20,
            cv_folds: 5,
            seed: 42,
            space: SearchSpace::default(),
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_iter == 0 {
            return Err(PipelineError::Configuration(
                "search needs at least one candidate configuration".to_string(),
            ));
        }
        if self.cv_folds < 2 {
            return Err(PipelineError::Configuration(format!(
                "cross-validation needs at least 2 folds, got {}",
                self.cv_folds
            )));
        }
        self.space.validate()
    }
}

/// One evaluated candidate: its parameters and cross-validation scores.
#[derive(Debug, Clone, Serialize)]
pub struct TrialResult {
    pub trial_id: usize,
    pub params: ForestParams,
    pub fold_scores: Vec<f64>,
    pub mean_score: f64,
}

/// Everything the search produced: all trials, the index of the winner, and
/// a final model refitted on the full training split with the winning
/// configuration.
#[derive(Debug)]
pub struct SearchOutcome {
    pub trials: Vec<TrialResult>,
    pub best_index: usize,
    pub model: RandomForestClassifier,
}

impl SearchOutcome {
    pub fn best(&self) -> &TrialResult {
        &self.trials[self.best_index]
    }
}

/// Run the randomized search over the training split.
///
/// Candidates are sampled sequentially from a seeded RNG (so the draw order
/// is reproducible), evaluated in parallel across the rayon pool, and
/// compared by mean fold accuracy with a strict-improvement scan so a tie
/// goes to the first-sampled configuration.
pub fn randomized_search(
    x_train: &Array2<f64>,
    y_train: &[u8],
    config: &SearchConfig,
) -> Result<SearchOutcome> {
    config.validate()?;

    let folds = StratifiedKFold::new(config.cv_folds, config.seed).split(y_train)?;

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let candidates: Vec<ForestParams> = (0..config.n_iter)
        .map(|_| config.space.sample(&mut rng, config.seed))
        .collect();

    log::info!(
        "evaluating {} candidate configurations with {}-fold stratified cross-validation",
        candidates.len(),
        config.cv_folds
    );

    let trials: Vec<TrialResult> = candidates
        .par_iter()
        .enumerate()
        .map(|(trial_id, params)| -> Result<TrialResult> {
            let mut fold_scores = Vec::with_capacity(folds.len());
            for fold in &folds {
                let x_fit = x_train.select(Axis(0), &fold.train_indices);
                let y_fit: Vec<u8> = fold.train_indices.iter().map(|&i| y_train[i]).collect();
                let x_val = x_train.select(Axis(0), &fold.test_indices);
                let y_val: Vec<u8> = fold.test_indices.iter().map(|&i| y_train[i]).collect();

                let mut model = RandomForestClassifier::new(params.clone());
                model.fit(&x_fit, &y_fit)?;
                let y_pred = model.predict(&x_val)?;
                fold_scores.push(metrics::accuracy(&y_val, &y_pred)?);
            }

            let mean_score = fold_scores.iter().sum::<f64>() / fold_scores.len() as f64;
            log::info!(
                "trial {}/{}: mean accuracy {:.4}",
                trial_id + 1,
                config.n_iter,
                mean_score
            );
            log::debug!("trial {} params: {:?}", trial_id + 1, params);

            Ok(TrialResult {
                trial_id,
                params: params.clone(),
                fold_scores,
                mean_score,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut best_index = 0;
    for (idx, trial) in trials.iter().enumerate() {
        if trial.mean_score > trials[best_index].mean_score {
            best_index = idx;
        }
    }

    log::info!(
        "best trial {} with mean accuracy {:.4}: {:?}",
        best_index + 1,
        trials[best_index].mean_score,
        trials[best_index].params
    );

    let mut model = RandomForestClassifier::new(trials[best_index].params.clone());
    model.fit(x_train, y_train)?;

    Ok(SearchOutcome {
        trials,
        best_index,
        model,
    })
}
