//! Evaluation metrics for binary churn predictions.
//!
//! Precision, recall, and F1 follow scikit-learn's zero-division
//! convention: they degrade to 0.0 with a warning instead of failing when a
//! class never appears among the predictions.

use std::fmt;

use ndarray::Array2;
use serde::Serialize;

use crate::error::{PipelineError, Result};
use crate::models::BinaryClassifier;

/// Display names, in class order 0 then 1.
pub const CLASS_LABELS: [&str; 2] = ["Not Churn", "Churn"];

struct BinaryCounts {
    tp: usize,
    fp: usize,
    tn: usize,
    fn_: usize,
}

fn binary_counts(y_true: &[u8], y_pred: &[u8]) -> Result<BinaryCounts> {
    if y_true.len() != y_pred.len() {
        return Err(PipelineError::Computation(format!(
            "{} labels but {} predictions",
            y_true.len(),
            y_pred.len()
        )));
    }
    if y_true.is_empty() {
        return Err(PipelineError::Computation(
            "metrics are undefined for zero samples".to_string(),
        ));
    }

    let mut counts = BinaryCounts {
        tp: 0,
        fp: 0,
        tn: 0,
        fn_: 0,
    };
    for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
        match (t == 1, p == 1) {
            (true, true) => counts.tp += 1,
            (false, true) => counts.fp += 1,
            (false, false) => counts.tn += 1,
            (true, false) => counts.fn_ += 1,
        }
    }
    Ok(counts)
}

/// Fraction of predictions matching the true label.
pub fn accuracy(y_true: &[u8], y_pred: &[u8]) -> Result<f64> {
    let c = binary_counts(y_true, y_pred)?;
    Ok((c.tp + c.tn) as f64 / y_true.len() as f64)
}

/// True positives over predicted positives; 0.0 when nothing was predicted
/// positive.
pub fn precision(y_true: &[u8], y_pred: &[u8]) -> Result<f64> {
    let c = binary_counts(y_true, y_pred)?;
    Ok(safe_ratio(c.tp, c.tp + c.fp, "precision"))
}

/// True positives over actual positives; 0.0 when no positives exist.
pub fn recall(y_true: &[u8], y_pred: &[u8]) -> Result<f64> {
    let c = binary_counts(y_true, y_pred)?;
    Ok(safe_ratio(c.tp, c.tp + c.fn_, "recall"))
}

/// Harmonic mean of precision and recall; 0.0 when both are zero.
pub fn f1_score(y_true: &[u8], y_pred: &[u8]) -> Result<f64> {
    let p = precision(y_true, y_pred)?;
    let r = recall(y_true, y_pred)?;
    Ok(harmonic_mean(p, r))
}

fn safe_ratio(numerator: usize, denominator: usize, metric: &str) -> f64 {
    if denominator == 0 {
        log::warn!("{} denominator is zero; reporting 0.0", metric);
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn harmonic_mean(p: f64, r: f64) -> f64 {
    if p + r == 0.0 {
        0.0
    } else {
        2.0 * p * r / (p + r)
    }
}

/// 2x2 confusion matrix. Rows are the actual class, columns the predicted
/// class, both in the order [Not Churn, Churn].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    counts: [[usize; 2]; 2],
}

impl ConfusionMatrix {
    pub fn from_predictions(y_true: &[u8], y_pred: &[u8]) -> Result<ConfusionMatrix> {
        let c = binary_counts(y_true, y_pred)?;
        Ok(ConfusionMatrix {
            counts: [[c.tn, c.fp], [c.fn_, c.tp]],
        })
    }

    pub fn count(&self, actual: u8, predicted: u8) -> usize {
        self.counts[actual as usize][predicted as usize]
    }

    /// Row totals, i.e. the number of test rows per actual class.
    pub fn row_sums(&self) -> [usize; 2] {
        [
            self.counts[0][0] + self.counts[0][1],
            self.counts[1][0] + self.counts[1][1],
        ]
    }

    pub fn rows(&self) -> &[[usize; 2]; 2] {
        &self.counts
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{:>12} {:>10} {:>10}", "", CLASS_LABELS[0], CLASS_LABELS[1])?;
        for (label, row) in CLASS_LABELS.iter().zip(self.counts.iter()) {
            writeln!(f, "{:>12} {:>10} {:>10}", label, row[0], row[1])?;
        }
        Ok(())
    }
}

/// Precision/recall/F1/support for one class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class metrics plus macro and support-weighted averages, mirroring a
/// scikit-learn classification report.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationReport {
    pub per_class: [ClassMetrics; 2],
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
    pub accuracy: f64,
}

impl ClassificationReport {
    pub fn from_predictions(y_true: &[u8], y_pred: &[u8]) -> Result<ClassificationReport> {
        let per_class = [
            class_metrics(y_true, y_pred, 0),
            class_metrics(y_true, y_pred, 1),
        ];
        let total: usize = per_class.iter().map(|m| m.support).sum();

        let macro_avg = ClassMetrics {
            precision: per_class.iter().map(|m| m.precision).sum::<f64>() / 2.0,
            recall: per_class.iter().map(|m| m.recall).sum::<f64>() / 2.0,
            f1: per_class.iter().map(|m| m.f1).sum::<f64>() / 2.0,
            support: total,
        };
        let weighted = |f: fn(&ClassMetrics) -> f64| {
            per_class
                .iter()
                .map(|m| f(m) * m.support as f64)
                .sum::<f64>()
                / total as f64
        };
        let weighted_avg = ClassMetrics {
            precision: weighted(|m| m.precision),
            recall: weighted(|m| m.recall),
            f1: weighted(|m| m.f1),
            support: total,
        };

        Ok(ClassificationReport {
            per_class,
            macro_avg,
            weighted_avg,
            accuracy: accuracy(y_true, y_pred)?,
        })
    }

    /// Render the report as a fixed-width table for the textual stream.
    pub fn to_table_string(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{:>14} {:>10} {:>10} {:>10} {:>10}\n",
            "", "precision", "recall", "f1-score", "support"
        ));
        for (label, m) in CLASS_LABELS.iter().zip(self.per_class.iter()) {
            out.push_str(&format!(
                "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}\n",
                label, m.precision, m.recall, m.f1, m.support
            ));
        }
        out.push_str(&format!(
            "{:>14} {:>10} {:>10} {:>10.2} {:>10}\n",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        ));
        for (label, m) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            out.push_str(&format!(
                "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}\n",
                label, m.precision, m.recall, m.f1, m.support
            ));
        }
        out
    }
}

/// One-vs-rest metrics for a single class. Zero denominators degrade to 0.0
/// like the scalar metrics.
fn class_metrics(y_true: &[u8], y_pred: &[u8], class: u8) -> ClassMetrics {
    let tp = y_true
        .iter()
        .zip(y_pred)
        .filter(|(&t, &p)| t == class && p == class)
        .count();
    let predicted = y_pred.iter().filter(|&&p| p == class).count();
    let support = y_true.iter().filter(|&&t| t == class).count();

    let precision = safe_ratio(tp, predicted, "per-class precision");
    let recall = safe_ratio(tp, support, "per-class recall");

    ClassMetrics {
        precision,
        recall,
        f1: harmonic_mean(precision, recall),
        support,
    }
}

/// Full evaluation of one model on a held-out split.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub model_name: String,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub report: ClassificationReport,
    pub confusion: ConfusionMatrix,
}

/// Score a fitted model on test data it has never seen.
pub fn evaluate<M: BinaryClassifier + ?Sized>(
    model: &M,
    x_test: &Array2<f64>,
    y_test: &[u8],
) -> Result<Evaluation> {
    let y_pred = model.predict(x_test)?;

    Ok(Evaluation {
        model_name: model.name().to_string(),
        accuracy: accuracy(y_test, &y_pred)?,
        precision: precision(y_test, &y_pred)?,
        recall: recall(y_test, &y_pred)?,
        f1: f1_score(y_test, &y_pred)?,
        report: ClassificationReport::from_predictions(y_test, &y_pred)?,
        confusion: ConfusionMatrix::from_predictions(y_test, &y_pred)?,
    })
}
