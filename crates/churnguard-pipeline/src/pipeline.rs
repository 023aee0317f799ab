//! Ordered composition of the pipeline stages.
//!
//! One `run` call takes a loaded dataset through cleaning, feature
//! engineering, splitting, training, tuning, and evaluation. Each stage is
//! a pure function over the previous stage's output; the split is computed
//! exactly once on the cleaned row order and reused everywhere.

use ndarray::Axis;

use crate::cleaning;
use crate::config::PipelineConfig;
use crate::data::CustomerDataset;
use crate::error::Result;
use crate::features::{self, StandardScaler};
use crate::metrics::{self, Evaluation};
use crate::models::{BinaryClassifier, ForestParams, RandomForestClassifier};
use crate::search::{self, TrialResult};
use crate::split::{self, TrainTestSplit};

/// Everything a run produces: evaluations before and after tuning, the
/// trial history, and the final model ready for persistence.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub rows_loaded: usize,
    pub rows_after_cleaning: usize,
    pub feature_names: Vec<String>,
    pub split: TrainTestSplit,
    pub initial_eval: Evaluation,
    pub tuned_eval: Evaluation,
    pub trials: Vec<TrialResult>,
    pub best_params: ForestParams,
    pub model: RandomForestClassifier,
}

/// Execute the full pipeline on a loaded dataset.
pub fn run(dataset: &CustomerDataset, config: &PipelineConfig) -> Result<PipelineOutcome> {
    config.validate()?;

    dataset.print_summary();

    log::info!("stage: cleaning");
    let cleaned = cleaning::clean(dataset)?;

    log::info!("stage: feature engineering");
    let feature_set = features::build_features(&cleaned)?;

    log::info!("stage: train/test split");
    let split = split::train_test_split(feature_set.labels.len(), config.test_fraction, config.seed)?;

    // Scaling statistics come from the training rows only; the transform
    // itself is applied to the full matrix.
    let scaled_columns = features::scaled_feature_indices(&feature_set.feature_names);
    let scaler = StandardScaler::fit(&feature_set.x, &split.train_indices, &scaled_columns)?;
    let x = scaler.transform(&feature_set.x);

    let x_train = x.select(Axis(0), &split.train_indices);
    let y_train: Vec<u8> = split
        .train_indices
        .iter()
        .map(|&i| feature_set.labels[i])
        .collect();
    let x_test = x.select(Axis(0), &split.test_indices);
    let y_test: Vec<u8> = split
        .test_indices
        .iter()
        .map(|&i| feature_set.labels[i])
        .collect();

    log::info!("stage: training initial forest");
    let mut initial_model = RandomForestClassifier::new(ForestParams {
        seed: config.seed,
        ..config.forest.clone()
    });
    initial_model.fit(&x_train, &y_train)?;
    let initial_eval = metrics::evaluate(&initial_model, &x_test, &y_test)?;
    log::info!(
        "initial forest test accuracy: {:.4}",
        initial_eval.accuracy
    );

    log::info!("stage: hyperparameter search");
    let outcome = search::randomized_search(&x_train, &y_train, &config.search)?;
    let best_params = outcome.best().params.clone();

    let tuned_eval = metrics::evaluate(&outcome.model, &x_test, &y_test)?;
    log::info!("tuned forest test accuracy: {:.4}", tuned_eval.accuracy);

    Ok(PipelineOutcome {
        rows_loaded: dataset.len(),
        rows_after_cleaning: cleaned.len(),
        feature_names: feature_set.feature_names,
        split,
        initial_eval,
        tuned_eval,
        trials: outcome.trials,
        best_params,
        model: outcome.model,
    })
}
