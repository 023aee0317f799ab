//! Classifier models and the trait seam the pipeline trains against.

pub mod baseline;
pub mod forest;
pub mod tree;

pub use baseline::MajorityClassifier;
pub use forest::{ForestParams, RandomForestClassifier};
pub use tree::DecisionTree;

use ndarray::Array2;

use crate::error::Result;

/// Contract for binary churn classifiers: fit once on a training matrix,
/// then score unseen rows with 0/1 predictions.
pub trait BinaryClassifier {
    /// Fit the model; `y` holds 0 (Not Churn) or 1 (Churn) per row of `x`.
    fn fit(&mut self, x: &Array2<f64>, y: &[u8]) -> Result<()>;

    /// Predict a class per row of `x`. Fails if the model was never fitted.
    fn predict(&self, x: &Array2<f64>) -> Result<Vec<u8>>;

    /// Human readable name for the model.
    fn name(&self) -> &str {
        "classifier"
    }
}
