//! End-to-end pipeline tests on synthetic customer data.

use churnguard_pipeline::config::PipelineConfig;
use churnguard_pipeline::data::CustomerDataset;
use churnguard_pipeline::metrics;
use churnguard_pipeline::models::{BinaryClassifier, MajorityClassifier};
use churnguard_pipeline::pipeline;
use churnguard_pipeline::search::{SearchConfig, SearchSpace};
use churnguard_pipeline::split::train_test_split;
use ndarray::Array2;

/// Deterministic synthetic dataset with a 70/30 class balance and churn
/// predictable from age. Values are spread evenly enough that the IQR
/// filter keeps every row.
fn synthetic_dataset(n: usize) -> CustomerDataset {
    let cities = ["Chicago", "Houston", "Miami"];
    let mut dataset = CustomerDataset::default();
    for i in 0..n {
        // 70% of rows land below the churn age threshold.
        let age = 20.0 + ((i * 37) % 50) as f64;
        let churn = if age >= 55.0 { 1 } else { 0 };
        dataset.customer_id.push(i as u32 + 1);
        dataset.name.push(format!("Customer {}", i + 1));
        dataset.age.push(age);
        dataset
            .gender
            .push(Some(if i % 2 == 0 { "Female" } else { "Male" }.to_string()));
        dataset
            .location
            .push(Some(cities[i % cities.len()].to_string()));
        dataset
            .subscription_length_months
            .push(1.0 + ((i * 13) % 24) as f64);
        dataset.monthly_bill.push(30.0 + ((i * 7) % 60) as f64);
        dataset.total_usage_gb.push(20.0 + ((i * 11) % 80) as f64);
        dataset.churn.push(churn);
    }
    dataset
}

fn fast_config() -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.forest.n_estimators = 15;
    config.search = SearchConfig {
        n_iter: 3,
        cv_folds: 3,
        seed: 42,
        space: SearchSpace {
            n_estimators: (10, 20),
            max_depth: vec![None, Some(8)],
            min_samples_split: (2, 5),
            min_samples_leaf: (1, 3),
            bootstrap: vec![true, false],
        },
    };
    config
}

#[test]
fn majority_baseline_tracks_class_balance() {
    let dataset = synthetic_dataset(1000);
    let positives = dataset.churn.iter().filter(|&&c| c == 1).count();
    let majority_share = 1.0 - positives as f64 / 1000.0;
    assert!(majority_share > 0.6 && majority_share < 0.8);

    let split = train_test_split(1000, 0.2, 42).unwrap();
    assert_eq!(split.train_indices.len(), 800);
    assert_eq!(split.test_indices.len(), 200);

    // Features are irrelevant to the baseline; a placeholder matrix keeps
    // the shapes honest.
    let x_train: Array2<f64> = Array2::zeros((split.train_indices.len(), 2));
    let x_test: Array2<f64> = Array2::zeros((split.test_indices.len(), 2));
    let y_train: Vec<u8> = split.train_indices.iter().map(|&i| dataset.churn[i]).collect();
    let y_test: Vec<u8> = split.test_indices.iter().map(|&i| dataset.churn[i]).collect();

    let mut baseline = MajorityClassifier::new();
    baseline.fit(&x_train, &y_train).unwrap();
    let eval = metrics::evaluate(&baseline, &x_test, &y_test).unwrap();

    let test_majority_share =
        y_test.iter().filter(|&&c| c == 0).count() as f64 / y_test.len() as f64;
    assert!((eval.accuracy - test_majority_share).abs() < 1e-12);
    assert!((eval.accuracy - 0.7).abs() < 0.1);

    // A baseline that never predicts churn has zero precision and recall.
    assert_eq!(eval.precision, 0.0);
    assert_eq!(eval.recall, 0.0);
    assert_eq!(eval.f1, 0.0);
}

#[test]
fn full_run_produces_a_consistent_outcome() {
    let dataset = synthetic_dataset(300);
    let config = fast_config();

    let outcome = pipeline::run(&dataset, &config).unwrap();

    assert_eq!(outcome.rows_loaded, 300);
    assert!(outcome.rows_after_cleaning <= 300);
    assert_eq!(outcome.trials.len(), config.search.n_iter);

    // Age, subscription length, one gender dummy, two location dummies,
    // cost per GB.
    assert_eq!(outcome.feature_names.len(), 6);

    let n_test = outcome.split.test_indices.len();
    let n_train = outcome.split.train_indices.len();
    assert_eq!(n_test + n_train, outcome.rows_after_cleaning);

    // Confusion matrix rows account for every test row.
    let [neg, pos] = outcome.tuned_eval.confusion.row_sums();
    assert_eq!(neg + pos, n_test);

    // Churn is a simple age threshold; the tuned forest should beat the
    // majority share comfortably.
    assert!(
        outcome.tuned_eval.accuracy > 0.8,
        "tuned accuracy {} unexpectedly low",
        outcome.tuned_eval.accuracy
    );
    // The winner is the first trial reaching the top mean score.
    let best_score = outcome
        .trials
        .iter()
        .map(|t| t.mean_score)
        .fold(f64::MIN, f64::max);
    let first_best = outcome
        .trials
        .iter()
        .find(|t| t.mean_score == best_score)
        .unwrap();
    assert_eq!(outcome.best_params, first_best.params);
}

#[test]
fn run_is_deterministic() {
    let dataset = synthetic_dataset(200);
    let config = fast_config();

    let a = pipeline::run(&dataset, &config).unwrap();
    let b = pipeline::run(&dataset, &config).unwrap();

    assert_eq!(a.split, b.split);
    assert_eq!(a.best_params, b.best_params);
    assert_eq!(a.tuned_eval.accuracy, b.tuned_eval.accuracy);
    assert_eq!(a.tuned_eval.confusion, b.tuned_eval.confusion);
}

#[test]
fn invalid_config_fails_before_touching_data() {
    let dataset = synthetic_dataset(50);
    let config = PipelineConfig {
        test_fraction: 2.0,
        ..PipelineConfig::default()
    };
    assert!(pipeline::run(&dataset, &config).is_err());
}
