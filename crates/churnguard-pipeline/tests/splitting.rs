//! Integration tests for train/test splitting and stratified k-fold.

use std::collections::HashSet;

use churnguard_pipeline::cross_validation::StratifiedKFold;
use churnguard_pipeline::split::train_test_split;

// ---------------------------------------------------------------------------
// Train/test split
// ---------------------------------------------------------------------------

#[test]
fn split_sizes_match_fraction() {
    let split = train_test_split(1000, 0.2, 42).unwrap();
    assert_eq!(split.test_indices.len(), 200);
    assert_eq!(split.train_indices.len(), 800);
}

#[test]
fn split_is_disjoint_and_exhaustive() {
    let split = train_test_split(101, 0.2, 42).unwrap();

    let mut all: Vec<usize> = split
        .train_indices
        .iter()
        .chain(split.test_indices.iter())
        .copied()
        .collect();
    all.sort_unstable();
    assert_eq!(all, (0..101).collect::<Vec<_>>());

    let train: HashSet<usize> = split.train_indices.iter().copied().collect();
    assert!(split.test_indices.iter().all(|i| !train.contains(i)));
}

#[test]
fn split_is_idempotent_for_same_seed() {
    // Two invocations with identical inputs partition identically, which is
    // what lets the split survive feature-engineering changes to the table.
    let first = train_test_split(500, 0.2, 42).unwrap();
    let second = train_test_split(500, 0.2, 42).unwrap();
    assert_eq!(first, second);
}

#[test]
fn different_seeds_differ() {
    let a = train_test_split(500, 0.2, 42).unwrap();
    let b = train_test_split(500, 0.2, 43).unwrap();
    assert_ne!(a.test_indices, b.test_indices);
}

#[test]
fn invalid_fractions_rejected() {
    assert!(train_test_split(100, 0.0, 42).is_err());
    assert!(train_test_split(100, 1.0, 42).is_err());
    assert!(train_test_split(100, -0.5, 42).is_err());
}

#[test]
fn tiny_dataset_with_degenerate_fraction_rejected() {
    // One sample cannot be split into two non-empty groups.
    assert!(train_test_split(1, 0.5, 42).is_err());
}

// ---------------------------------------------------------------------------
// Stratified k-fold
// ---------------------------------------------------------------------------

fn labels(negatives: usize, positives: usize) -> Vec<u8> {
    let mut y = vec![0u8; negatives];
    y.extend(vec![1u8; positives]);
    y
}

#[test]
fn folds_preserve_class_proportion() {
    let y = labels(80, 20);
    let folds = StratifiedKFold::new(5, 42).split(&y).unwrap();

    assert_eq!(folds.len(), 5);
    for fold in &folds {
        let positives = fold.test_indices.iter().filter(|&&i| y[i] == 1).count();
        assert_eq!(fold.test_indices.len(), 20);
        assert_eq!(positives, 4, "fold {} lost stratification", fold.fold_idx);
    }
}

#[test]
fn folds_cover_every_index_once() {
    let y = labels(33, 17);
    let folds = StratifiedKFold::new(5, 42).split(&y).unwrap();

    let mut seen: Vec<usize> = folds
        .iter()
        .flat_map(|f| f.test_indices.iter().copied())
        .collect();
    seen.sort_unstable();
    assert_eq!(seen, (0..50).collect::<Vec<_>>());

    for fold in &folds {
        assert_eq!(fold.train_indices.len() + fold.test_indices.len(), 50);
    }
}

#[test]
fn folds_are_deterministic() {
    let y = labels(40, 20);
    let a = StratifiedKFold::new(4, 7).split(&y).unwrap();
    let b = StratifiedKFold::new(4, 7).split(&y).unwrap();
    for (fa, fb) in a.iter().zip(b.iter()) {
        assert_eq!(fa.test_indices, fb.test_indices);
    }
}

#[test]
fn scarce_class_fails_loudly() {
    // Three positives cannot stratify into five folds.
    let y = labels(50, 3);
    let err = StratifiedKFold::new(5, 42).split(&y).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("configuration"), "got: {}", msg);
    assert!(msg.contains("class 1"), "got: {}", msg);
}

#[test]
fn single_fold_rejected() {
    let y = labels(10, 10);
    assert!(StratifiedKFold::new(1, 42).split(&y).is_err());
}
