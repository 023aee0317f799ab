//! HTML report assembly: metric tables, search trials, and the plotly
//! heatmaps embedded in one self-contained page.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use maud::{html, Markup, PreEscaped, DOCTYPE};

use churnguard_pipeline::config::PipelineConfig;
use churnguard_pipeline::metrics::Evaluation;
use churnguard_pipeline::pipeline::PipelineOutcome;
use churnguard_pipeline::report::plots;
use churnguard_pipeline::search::TrialResult;

const STYLE: &str = "\
    body { font-family: sans-serif; margin: 2em auto; max-width: 960px; }\n\
    table { border-collapse: collapse; margin: 1em 0; }\n\
    th, td { border: 1px solid #ccc; padding: 4px 12px; text-align: right; }\n\
    th:first-child, td:first-child { text-align: left; }\n\
    .code-container { background-color: #f5f5f5; padding: 10px; border-radius: 5px;\n\
        overflow-x: auto; font-family: monospace; white-space: pre-wrap; }";

/// Render the run report and write it to `path`.
pub fn write_report(
    outcome: &PipelineOutcome,
    config: &PipelineConfig,
    path: &Path,
) -> Result<()> {
    let confusion_plot = plots::plot_confusion_matrix(&outcome.tuned_eval.confusion, "Confusion Matrix")
        .map_err(anyhow::Error::msg)?;
    let report_plot =
        plots::plot_classification_report(&outcome.tuned_eval.report, "Classification Report")
            .map_err(anyhow::Error::msg)?;

    let markup = html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { "churnguard report" }
                script src="https://cdn.plot.ly/plotly-2.12.1.min.js" {}
                style { (PreEscaped(STYLE)) }
            }
            body {
                h1 { "Churn Prediction Report" }
                p { "Generated " (Local::now().format("%Y-%m-%d %H:%M:%S")) }

                h2 { "Overview" }
                table {
                    tr { td { "Rows loaded" } td { (outcome.rows_loaded) } }
                    tr { td { "Rows after cleaning" } td { (outcome.rows_after_cleaning) } }
                    tr { td { "Training rows" } td { (outcome.split.train_indices.len()) } }
                    tr { td { "Test rows" } td { (outcome.split.test_indices.len()) } }
                    tr { td { "Features" } td { (outcome.feature_names.join(", ")) } }
                }

                h2 { "Evaluation" }
                (metric_table(&outcome.initial_eval, &outcome.tuned_eval))

                div { (PreEscaped(confusion_plot.to_inline_html(Some("confusion-matrix")))) }
                div { (PreEscaped(report_plot.to_inline_html(Some("classification-report")))) }

                h2 { "Search Trials" }
                (trial_table(&outcome.trials))

                h2 { "Configuration" }
                div class="code-container" {
                    pre { code { (PreEscaped(serde_json::to_string_pretty(config)?)) } }
                }
            }
        }
    };

    std::fs::write(path, markup.into_string())
        .with_context(|| format!("failed to write report to {}", path.display()))?;

    Ok(())
}

fn metric_table(initial: &Evaluation, tuned: &Evaluation) -> Markup {
    let row = |name: &str, a: f64, b: f64| {
        html! {
            tr {
                td { (name) }
                td { (format!("{:.2}", a)) }
                td { (format!("{:.2}", b)) }
            }
        }
    };
    html! {
        table {
            tr { th { "Metric" } th { "Initial forest" } th { "Tuned forest" } }
            (row("Accuracy", initial.accuracy, tuned.accuracy))
            (row("Precision", initial.precision, tuned.precision))
            (row("Recall", initial.recall, tuned.recall))
            (row("F1-score", initial.f1, tuned.f1))
        }
    }
}

fn trial_table(trials: &[TrialResult]) -> Markup {
    html! {
        table {
            tr {
                th { "Trial" }
                th { "Trees" }
                th { "Max depth" }
                th { "Min split" }
                th { "Min leaf" }
                th { "Bootstrap" }
                th { "Mean CV accuracy" }
            }
            @for trial in trials {
                tr {
                    td { (trial.trial_id + 1) }
                    td { (trial.params.n_estimators) }
                    td {
                        @match trial.params.max_depth {
                            Some(depth) => { (depth) }
                            None => { "unbounded" }
                        }
                    }
                    td { (trial.params.min_samples_split) }
                    td { (trial.params.min_samples_leaf) }
                    td { (trial.params.bootstrap) }
                    td { (format!("{:.4}", trial.mean_score)) }
                }
            }
        }
    }
}
