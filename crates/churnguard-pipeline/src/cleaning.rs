//! Dataset cleaning: mode imputation and IQR outlier removal.
//!
//! Both steps are pure; each returns a new `CustomerDataset`. After `clean`
//! runs, no categorical column contains a missing value and every numeric
//! column lies within its sequentially computed inlier bounds.

use crate::data::{CategoricalColumn, CustomerDataset, NumericColumn};
use crate::error::{PipelineError, Result};
use crate::stats;

const IQR_FACTOR: f64 = 1.5;

/// Impute missing categorical entries with the column's most frequent
/// observed value; ties resolve to the value encountered first.
///
/// A column with no observed values at all has an undefined mode and is a
/// data error rather than something to fill in silently.
pub fn impute_missing(dataset: &CustomerDataset) -> Result<CustomerDataset> {
    let mut cleaned = dataset.clone();

    for column in CategoricalColumn::ALL {
        let values = cleaned.categorical(column);
        let n_missing = values.iter().filter(|v| v.is_none()).count();
        if n_missing == 0 {
            continue;
        }

        let observed: Vec<&str> = values.iter().flatten().map(String::as_str).collect();
        let mode = stats::mode(&observed).ok_or_else(|| {
            PipelineError::Data(format!(
                "column '{}' is entirely missing; mode imputation is undefined",
                column.name()
            ))
        })?;
        let fill = mode.to_string();

        log::info!(
            "imputing {} missing '{}' values with mode '{}'",
            n_missing,
            column.name(),
            fill
        );

        for value in cleaned.categorical_mut(column).iter_mut() {
            if value.is_none() {
                *value = Some(fill.clone());
            }
        }
    }

    Ok(cleaned)
}

/// Drop rows falling outside [Q1 - 1.5*IQR, Q3 + 1.5*IQR] for each numeric
/// column in turn.
///
/// Filtering narrows sequentially: a row removed by one column's bounds is
/// excluded from the quartile computation of every later column. A column
/// whose IQR is zero is skipped with a warning instead of collapsing the
/// dataset onto its modal value.
pub fn drop_outliers(dataset: &CustomerDataset) -> Result<CustomerDataset> {
    let mut filtered = dataset.clone();

    for column in NumericColumn::ALL {
        if filtered.is_empty() {
            return Err(PipelineError::Computation(format!(
                "no rows left before outlier filtering of '{}'",
                column.name()
            )));
        }

        let values = filtered.numeric(column);
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let q1 = stats::quantile(&sorted, 0.25);
        let q3 = stats::quantile(&sorted, 0.75);
        let iqr = q3 - q1;

        if iqr == 0.0 {
            log::warn!(
                "column '{}' has zero interquartile range; skipping outlier filtering",
                column.name()
            );
            continue;
        }

        let lower = q1 - IQR_FACTOR * iqr;
        let upper = q3 + IQR_FACTOR * iqr;

        let mask: Vec<bool> = values.iter().map(|&v| v >= lower && v <= upper).collect();
        let dropped = mask.iter().filter(|&&keep| !keep).count();
        if dropped > 0 {
            log::debug!(
                "column '{}': dropping {} rows outside [{:.3}, {:.3}]",
                column.name(),
                dropped,
                lower,
                upper
            );
            filtered = filtered.filter(&mask);
        }
    }

    Ok(filtered)
}

/// Full cleaning pass: imputation followed by outlier removal.
pub fn clean(dataset: &CustomerDataset) -> Result<CustomerDataset> {
    let imputed = impute_missing(dataset)?;
    let cleaned = drop_outliers(&imputed)?;
    log::info!(
        "cleaning kept {} of {} rows",
        cleaned.len(),
        dataset.len()
    );
    Ok(cleaned)
}
