//! Deterministic train/test partitioning.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::{PipelineError, Result};

/// A disjoint, exhaustive partition of row indices into training and test
/// groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// Partition `0..n_samples` into train and test index sets.
///
/// Pure function of its inputs: the same sample count, fraction, and seed
/// always produce the same partition, regardless of what columns the table
/// carries at the time of the call. The test set takes the first
/// ceil(n * fraction) positions of the seeded shuffle.
pub fn train_test_split(n_samples: usize, test_fraction: f64, seed: u64) -> Result<TrainTestSplit> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(PipelineError::Configuration(format!(
            "test fraction must lie in (0, 1), got {}",
            test_fraction
        )));
    }

    let n_test = (n_samples as f64 * test_fraction).ceil() as usize;
    if n_test == 0 || n_test >= n_samples {
        return Err(PipelineError::Configuration(format!(
            "test fraction {} leaves an empty split for {} samples",
            test_fraction, n_samples
        )));
    }

    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test_indices = indices[..n_test].to_vec();
    let train_indices = indices[n_test..].to_vec();

    log::info!(
        "split {} samples into {} train / {} test (seed {})",
        n_samples,
        train_indices.len(),
        test_indices.len(),
        seed
    );

    Ok(TrainTestSplit {
        train_indices,
        test_indices,
    })
}
