use plotly::common::{ColorScale, ColorScalePalette};
use plotly::layout::{Axis, Layout};
use plotly::{HeatMap, Plot};

use crate::metrics::{ClassificationReport, ConfusionMatrix, CLASS_LABELS};

/// Heatmap of the confusion matrix, actual classes on the y axis and
/// predicted classes on the x axis.
pub fn plot_confusion_matrix(matrix: &ConfusionMatrix, title: &str) -> Result<Plot, String> {
    let x: Vec<String> = CLASS_LABELS.iter().map(|s| s.to_string()).collect();
    // Plotly draws y[0] at the bottom; reverse so the first class reads
    // from the top like a printed matrix.
    let y: Vec<String> = CLASS_LABELS.iter().rev().map(|s| s.to_string()).collect();
    let z: Vec<Vec<f64>> = matrix
        .rows()
        .iter()
        .rev()
        .map(|row| row.iter().map(|&count| count as f64).collect())
        .collect();

    let trace = HeatMap::new(x, y, z).color_scale(ColorScale::Palette(ColorScalePalette::Blues));

    let layout = Layout::new()
        .title(title)
        .x_axis(Axis::new().title("Predicted"))
        .y_axis(Axis::new().title("Actual"));

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(layout);

    Ok(plot)
}

/// Heatmap of per-class precision, recall, and F1, one row per class.
pub fn plot_classification_report(
    report: &ClassificationReport,
    title: &str,
) -> Result<Plot, String> {
    let x: Vec<String> = ["precision", "recall", "f1-score"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let y: Vec<String> = CLASS_LABELS.iter().rev().map(|s| s.to_string()).collect();
    let z: Vec<Vec<f64>> = report
        .per_class
        .iter()
        .rev()
        .map(|m| vec![m.precision, m.recall, m.f1])
        .collect();

    let trace = HeatMap::new(x, y, z).color_scale(ColorScale::Palette(ColorScalePalette::YlGnBu));

    let layout = Layout::new()
        .title(title)
        .x_axis(Axis::new().title("Metrics"))
        .y_axis(Axis::new().title("Classes"));

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(layout);

    Ok(plot)
}
