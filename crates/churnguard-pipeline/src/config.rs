use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::models::ForestParams;
use crate::search::SearchConfig;

/// Central configuration for one pipeline run. Every field has a default,
/// so an empty JSON object is a valid config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Fraction of cleaned rows held out for evaluation.
    pub test_fraction: f64,
    /// Seed shared by the splitter, the initial forest, and the search.
    pub seed: u64,
    /// Parameters of the forest fitted before tuning.
    pub forest: ForestParams,
    pub search: SearchConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
            forest: ForestParams::default(),
            search: SearchConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(PipelineError::Configuration(format!(
                "test fraction must lie in (0, 1), got {}",
                self.test_fraction
            )));
        }
        if self.forest.n_estimators == 0 {
            return Err(PipelineError::Configuration(
                "the initial forest needs at least one tree".to_string(),
            ));
        }
        if self.forest.min_samples_split < 2 {
            return Err(PipelineError::Configuration(
                "min_samples_split must be at least 2".to_string(),
            ));
        }
        if self.forest.min_samples_leaf < 1 {
            return Err(PipelineError::Configuration(
                "min_samples_leaf must be at least 1".to_string(),
            ));
        }
        self.search.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn default_settings() {
        let config = PipelineConfig::default();
        assert_eq!(config.test_fraction, 0.2);
        assert_eq!(config.seed, 42);
        assert_eq!(config.forest.n_estimators, 100);
        assert_eq!(config.search.n_iter, 20);
        assert_eq!(config.search.cv_folds, 5);
    }

    #[test]
    fn bad_fraction_rejected() {
        let config = PipelineConfig {
            test_fraction: 1.0,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_json_deserializes_to_defaults() {
        let config: PipelineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());
    }
}
