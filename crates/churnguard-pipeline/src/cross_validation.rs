//! Stratified k-fold splitting for cross-validation.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::{PipelineError, Result};

/// One fold's train/test index sets.
#[derive(Debug, Clone)]
pub struct FoldSplit {
    pub fold_idx: usize,
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// Shuffled stratified k-fold splitter over binary labels: each fold
/// receives a near-equal share of every class, so fold class proportions
/// track the overall distribution.
#[derive(Debug, Clone, Copy)]
pub struct StratifiedKFold {
    pub n_splits: usize,
    pub seed: u64,
}

impl StratifiedKFold {
    pub fn new(n_splits: usize, seed: u64) -> Self {
        Self { n_splits, seed }
    }

    /// Generate the folds for the given labels.
    ///
    /// Fails when a class has fewer members than the requested number of
    /// folds; silently reducing the fold count would change the validation
    /// contract under the caller's feet.
    pub fn split(&self, y: &[u8]) -> Result<Vec<FoldSplit>> {
        if self.n_splits < 2 {
            return Err(PipelineError::Configuration(format!(
                "cross-validation needs at least 2 folds, got {}",
                self.n_splits
            )));
        }

        let mut negatives: Vec<usize> = Vec::new();
        let mut positives: Vec<usize> = Vec::new();
        for (idx, &label) in y.iter().enumerate() {
            if label == 0 {
                negatives.push(idx);
            } else {
                positives.push(idx);
            }
        }

        for (class, members) in [(0u8, &negatives), (1u8, &positives)] {
            if members.len() < self.n_splits {
                return Err(PipelineError::Configuration(format!(
                    "class {} has {} samples, fewer than the {} requested folds",
                    class,
                    members.len(),
                    self.n_splits
                )));
            }
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        negatives.shuffle(&mut rng);
        positives.shuffle(&mut rng);

        // Deal each class round-robin so every fold gets its share.
        let mut folds: Vec<Vec<usize>> = vec![Vec::new(); self.n_splits];
        for class_indices in [&negatives, &positives] {
            for (i, &idx) in class_indices.iter().enumerate() {
                folds[i % self.n_splits].push(idx);
            }
        }

        let splits = (0..self.n_splits)
            .map(|fold_idx| {
                let test_indices = folds[fold_idx].clone();
                let train_indices = folds
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != fold_idx)
                    .flat_map(|(_, fold)| fold.iter().copied())
                    .collect();
                FoldSplit {
                    fold_idx,
                    train_indices,
                    test_indices,
                }
            })
            .collect();

        Ok(splits)
    }
}
