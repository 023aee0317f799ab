//! Integration tests for the cleaning stage (imputation, outlier removal).

use churnguard_pipeline::cleaning::{clean, drop_outliers, impute_missing};
use churnguard_pipeline::data::{CategoricalColumn, CustomerDataset, NumericColumn};

fn dataset_with(
    ages: Vec<f64>,
    gender: Vec<Option<String>>,
    location: Vec<Option<String>>,
) -> CustomerDataset {
    let n = ages.len();
    assert_eq!(gender.len(), n);
    assert_eq!(location.len(), n);
    CustomerDataset {
        customer_id: (1..=n as u32).collect(),
        name: (1..=n).map(|i| format!("Customer {}", i)).collect(),
        age: ages,
        gender,
        location,
        subscription_length_months: vec![12.0; n],
        monthly_bill: vec![50.0; n],
        total_usage_gb: vec![100.0; n],
        churn: (0..n).map(|i| (i % 2) as u8).collect(),
    }
}

fn some(s: &str) -> Option<String> {
    Some(s.to_string())
}

// ---------------------------------------------------------------------------
// Mode imputation
// ---------------------------------------------------------------------------

#[test]
fn imputation_fills_missing_with_most_frequent() {
    let dataset = dataset_with(
        vec![30.0, 31.0, 32.0, 33.0],
        vec![some("Female"), some("Female"), None, some("Male")],
        vec![some("Houston"); 4],
    );

    let imputed = impute_missing(&dataset).unwrap();

    assert_eq!(
        imputed.categorical(CategoricalColumn::Gender)[2],
        some("Female")
    );
    for value in imputed.categorical(CategoricalColumn::Gender) {
        assert!(value.is_some());
    }
}

#[test]
fn imputation_tie_breaks_on_first_encountered_value() {
    let dataset = dataset_with(
        vec![30.0, 31.0, 32.0, 33.0, 34.0],
        vec![some("Male"), some("Female"), some("Female"), some("Male"), None],
        vec![some("Houston"); 5],
    );

    let imputed = impute_missing(&dataset).unwrap();

    // Male and Female both appear twice; Male came first.
    assert_eq!(
        imputed.categorical(CategoricalColumn::Gender)[4],
        some("Male")
    );
}

#[test]
fn imputation_leaves_complete_columns_untouched() {
    let dataset = dataset_with(
        vec![30.0, 31.0],
        vec![some("Male"), some("Female")],
        vec![some("Houston"), some("Chicago")],
    );

    let imputed = impute_missing(&dataset).unwrap();
    assert_eq!(imputed.gender, dataset.gender);
    assert_eq!(imputed.location, dataset.location);
}

#[test]
fn imputation_errors_on_entirely_missing_column() {
    let dataset = dataset_with(
        vec![30.0, 31.0],
        vec![None, None],
        vec![some("Houston"), some("Chicago")],
    );

    let err = impute_missing(&dataset).unwrap_err();
    assert!(err.to_string().contains("Gender"), "got: {}", err);
}

// ---------------------------------------------------------------------------
// IQR outlier filtering
// ---------------------------------------------------------------------------

#[test]
fn outlier_rows_are_dropped() {
    // Ages 20..=29 plus one wild value: Q1 = 22.5, Q3 = 27.5, IQR = 5, so
    // the bounds are [15, 35] and only the wild value falls outside.
    let mut ages: Vec<f64> = (20..30).map(|a| a as f64).collect();
    ages.push(1000.0);
    let n = ages.len();
    let dataset = dataset_with(ages, vec![some("Male"); n], vec![some("Houston"); n]);

    let filtered = drop_outliers(&dataset).unwrap();

    assert_eq!(filtered.len(), 10);
    assert!(filtered.age.iter().all(|&a| a < 100.0));
}

#[test]
fn all_numeric_columns_within_bounds_after_cleaning() {
    // Re-derive the sequential bounds the same way the cleaner does and
    // check the survivors against them, column by column.
    let n = 40;
    let mut dataset = dataset_with(
        (0..n).map(|i| 20.0 + (i % 10) as f64).collect(),
        vec![some("Male"); n],
        vec![some("Houston"); n],
    );
    dataset.subscription_length_months = (0..n).map(|i| 1.0 + (i % 24) as f64).collect();
    dataset.monthly_bill = (0..n)
        .map(|i| if i == 7 { 5000.0 } else { 40.0 + (i % 30) as f64 })
        .collect();
    dataset.total_usage_gb = (0..n)
        .map(|i| if i == 11 { 9000.0 } else { 50.0 + (i % 40) as f64 })
        .collect();

    let cleaned = drop_outliers(&dataset).unwrap();

    assert!(cleaned.len() < n);
    for column in NumericColumn::ALL {
        let values = cleaned.numeric(column);
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let q1 = churnguard_pipeline::stats::quantile(&sorted, 0.25);
        let q3 = churnguard_pipeline::stats::quantile(&sorted, 0.75);
        let iqr = q3 - q1;
        if iqr == 0.0 {
            continue;
        }
        for &v in values {
            assert!(
                v >= q1 - 1.5 * iqr && v <= q3 + 1.5 * iqr,
                "{} value {} outside final bounds",
                column.name(),
                v
            );
        }
    }
}

#[test]
fn zero_iqr_column_is_skipped_not_collapsed() {
    // Subscription length is constant; filtering on it must not drop rows,
    // while the age outlier is still removed.
    let mut ages: Vec<f64> = (20..30).map(|a| a as f64).collect();
    ages.push(500.0);
    let n = ages.len();
    let dataset = dataset_with(ages, vec![some("Male"); n], vec![some("Houston"); n]);

    let filtered = drop_outliers(&dataset).unwrap();

    assert_eq!(filtered.len(), 10);
    // Constant columns survive untouched.
    assert!(filtered
        .subscription_length_months
        .iter()
        .all(|&m| m == 12.0));
}

// ---------------------------------------------------------------------------
// Full cleaning pass
// ---------------------------------------------------------------------------

#[test]
fn clean_leaves_no_missing_categoricals() {
    let mut ages: Vec<f64> = (20..32).map(|a| a as f64).collect();
    ages.push(800.0);
    let n = ages.len();
    let mut gender = vec![some("Female"); n];
    gender[3] = None;
    let mut location = vec![some("Chicago"); n];
    location[5] = None;
    let dataset = dataset_with(ages, gender, location);

    let cleaned = clean(&dataset).unwrap();

    for column in CategoricalColumn::ALL {
        assert!(cleaned.categorical(column).iter().all(|v| v.is_some()));
    }
    assert_eq!(cleaned.len(), n - 1);
}
