//! Trivial majority-class baseline, useful as a floor for model quality.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::models::BinaryClassifier;

/// Predicts the most frequent training class for every input row. A tuned
/// model that cannot beat this is not learning anything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MajorityClassifier {
    majority: Option<u8>,
}

impl MajorityClassifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BinaryClassifier for MajorityClassifier {
    fn fit(&mut self, _x: &Array2<f64>, y: &[u8]) -> Result<()> {
        if y.is_empty() {
            return Err(PipelineError::Computation(
                "cannot fit a baseline on zero samples".to_string(),
            ));
        }
        let positives = y.iter().filter(|&&label| label == 1).count();
        // Tie goes to Not Churn.
        self.majority = Some(if positives * 2 > y.len() { 1 } else { 0 });
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<u8>> {
        let class = self.majority.ok_or_else(|| {
            PipelineError::Computation("baseline used before fitting".to_string())
        })?;
        Ok(vec![class; x.nrows()])
    }

    fn name(&self) -> &str {
        "majority_class"
    }
}
