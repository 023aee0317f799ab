//! Feature engineering: one-hot encoding, the cost-per-GB ratio, and
//! standard scaling.

use std::collections::BTreeSet;

use ndarray::Array2;

use crate::data::{CategoricalColumn, CustomerDataset};
use crate::error::{PipelineError, Result};

/// Feature matrix plus its column names and the row-aligned labels.
/// Identifier, name, and label columns are never part of `x`.
#[derive(Debug, Clone)]
pub struct FeatureSet {
    pub x: Array2<f64>,
    pub feature_names: Vec<String>,
    pub labels: Vec<u8>,
}

/// Build the model-ready feature matrix from a cleaned dataset.
///
/// Column order: Age, Subscription_Length_Months, the one-hot indicator
/// columns for Gender and Location (first category dropped), then
/// Cost_Per_GB. Monthly_Bill and Total_Usage_GB only survive inside the
/// derived ratio.
pub fn build_features(dataset: &CustomerDataset) -> Result<FeatureSet> {
    let n_rows = dataset.len();

    let gender = encode_one_hot(dataset, CategoricalColumn::Gender)?;
    let location = encode_one_hot(dataset, CategoricalColumn::Location)?;
    let cost_per_gb = derive_cost_per_gb(dataset)?;

    let mut feature_names = vec!["Age".to_string(), "Subscription_Length_Months".to_string()];
    feature_names.extend(gender.names.iter().cloned());
    feature_names.extend(location.names.iter().cloned());
    feature_names.push("Cost_Per_GB".to_string());

    let n_cols = feature_names.len();
    let mut values = Vec::with_capacity(n_rows * n_cols);
    for row in 0..n_rows {
        values.push(dataset.age[row]);
        values.push(dataset.subscription_length_months[row]);
        for column in &gender.columns {
            values.push(column[row]);
        }
        for column in &location.columns {
            values.push(column[row]);
        }
        values.push(cost_per_gb[row]);
    }

    let x = Array2::from_shape_vec((n_rows, n_cols), values)
        .map_err(|e| PipelineError::Computation(format!("feature matrix shape: {}", e)))?;

    log::info!("built {} features for {} rows", n_cols, n_rows);

    Ok(FeatureSet {
        x,
        feature_names,
        labels: dataset.churn.clone(),
    })
}

/// Indices of the feature columns subject to standard scaling: the
/// continuous inputs, not the one-hot indicators.
pub fn scaled_feature_indices(feature_names: &[String]) -> Vec<usize> {
    const SCALED: [&str; 3] = ["Age", "Subscription_Length_Months", "Cost_Per_GB"];
    feature_names
        .iter()
        .enumerate()
        .filter(|(_, name)| SCALED.contains(&name.as_str()))
        .map(|(idx, _)| idx)
        .collect()
}

struct EncodedColumn {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

/// One-hot encode a categorical column with the first (lexicographically
/// smallest) category dropped: k categories yield k - 1 indicator columns.
fn encode_one_hot(dataset: &CustomerDataset, column: CategoricalColumn) -> Result<EncodedColumn> {
    let values = dataset.categorical(column);

    let mut categories: BTreeSet<&str> = BTreeSet::new();
    for (row, value) in values.iter().enumerate() {
        match value {
            Some(v) => {
                categories.insert(v.as_str());
            }
            None => {
                return Err(PipelineError::Data(format!(
                    "missing '{}' value at row {}; encoding requires a cleaned dataset",
                    column.name(),
                    row + 1
                )))
            }
        }
    }

    // BTreeSet iterates in sorted order; the first category becomes the
    // implicit baseline.
    let kept: Vec<&str> = categories.iter().skip(1).copied().collect();

    let names = kept
        .iter()
        .map(|category| format!("{}_{}", column.name(), category))
        .collect();
    let columns = kept
        .iter()
        .map(|category| {
            values
                .iter()
                .map(|v| {
                    let matches = v.as_deref() == Some(*category);
                    if matches {
                        1.0
                    } else {
                        0.0
                    }
                })
                .collect()
        })
        .collect();

    Ok(EncodedColumn { names, columns })
}

/// Monthly bill divided by total usage. A customer with zero recorded usage
/// makes the ratio undefined; that is a computation error, not an infinity
/// to smuggle into the scaler.
fn derive_cost_per_gb(dataset: &CustomerDataset) -> Result<Vec<f64>> {
    dataset
        .monthly_bill
        .iter()
        .zip(dataset.total_usage_gb.iter())
        .enumerate()
        .map(|(row, (&bill, &usage))| {
            if usage == 0.0 {
                Err(PipelineError::Computation(format!(
                    "Total_Usage_GB is zero for customer {} (row {}); Cost_Per_GB is undefined",
                    dataset.customer_id[row],
                    row + 1
                )))
            } else {
                Ok(bill / usage)
            }
        })
        .collect()
}

/// Per-column mean/std standardization, fitted on a row subset and applied
/// to the full matrix.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    pub columns: Vec<usize>,
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

impl StandardScaler {
    /// Minimum stddev to avoid division by zero when transforming.
    const MIN_STD: f64 = 1e-6;

    /// Fit scaling statistics for the selected columns using only the given
    /// rows. Fitting on the training rows alone keeps test-set distribution
    /// out of the learned statistics.
    pub fn fit(x: &Array2<f64>, rows: &[usize], columns: &[usize]) -> Result<StandardScaler> {
        if rows.is_empty() {
            return Err(PipelineError::Computation(
                "scaler fit requires at least one row".to_string(),
            ));
        }

        let n = rows.len() as f64;
        let mut mean = Vec::with_capacity(columns.len());
        let mut std = Vec::with_capacity(columns.len());

        for &col in columns {
            let sum: f64 = rows.iter().map(|&r| x[(r, col)]).sum();
            let m = sum / n;
            let var: f64 = rows.iter().map(|&r| (x[(r, col)] - m).powi(2)).sum::<f64>() / n;
            mean.push(m);
            std.push(var.sqrt().max(Self::MIN_STD));
        }

        Ok(StandardScaler {
            columns: columns.to_vec(),
            mean,
            std,
        })
    }

    /// Return a new matrix with the fitted columns standardized; all other
    /// columns pass through unchanged.
    pub fn transform(&self, x: &Array2<f64>) -> Array2<f64> {
        let mut out = x.clone();
        for (pos, &col) in self.columns.iter().enumerate() {
            for row in 0..out.nrows() {
                out[(row, col)] = (out[(row, col)] - self.mean[pos]) / self.std[pos];
            }
        }
        out
    }
}
