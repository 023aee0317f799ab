//! Small numeric helpers shared by the cleaning and reporting stages.

use std::collections::HashMap;

use statrs::statistics::Statistics;

/// Quantile of a sorted slice using linear interpolation between the two
/// nearest order statistics (the same method pandas uses by default).
///
/// The slice must be non-empty and sorted ascending; `q` must lie in [0, 1].
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    assert!(!sorted.is_empty(), "quantile requires a non-empty slice");
    assert!((0.0..=1.0).contains(&q), "quantile fraction out of range");

    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Most frequent value in `values`, ties broken by the value encountered
/// first. Returns `None` for an empty input.
pub fn mode<'a>(values: &[&'a str]) -> Option<&'a str> {
    if values.is_empty() {
        return None;
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for v in values {
        *counts.entry(v).or_insert(0) += 1;
    }
    let max_count = counts.values().copied().max().unwrap_or(0);

    // Scan in input order so a tie resolves to the first-encountered value.
    values
        .iter()
        .find(|v| counts[**v] == max_count)
        .copied()
}

/// Descriptive summary of one numeric column, mirroring the eight rows of a
/// pandas `describe()` table.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Summarize a numeric column. Standard deviation is the sample estimate
/// (n - 1 denominator); quartiles use linear interpolation.
pub fn describe(values: &[f64]) -> ColumnSummary {
    if values.is_empty() {
        return ColumnSummary {
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            q1: f64::NAN,
            median: f64::NAN,
            q3: f64::NAN,
            max: f64::NAN,
        };
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    ColumnSummary {
        count: values.len(),
        mean: values.iter().mean(),
        std: values.iter().std_dev(),
        min: sorted[0],
        q1: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q3: quantile(&sorted, 0.75),
        max: sorted[sorted.len() - 1],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantile_interpolates_linearly() {
        let v = vec![1.0, 2.0, 3.0, 4.0];
        assert!((quantile(&v, 0.25) - 1.75).abs() < 1e-12);
        assert!((quantile(&v, 0.5) - 2.5).abs() < 1e-12);
        assert!((quantile(&v, 0.75) - 3.25).abs() < 1e-12);
        assert_eq!(quantile(&v, 0.0), 1.0);
        assert_eq!(quantile(&v, 1.0), 4.0);
    }

    #[test]
    fn quantile_single_element() {
        assert_eq!(quantile(&[7.0], 0.25), 7.0);
    }

    #[test]
    fn mode_picks_most_frequent() {
        assert_eq!(mode(&["a", "b", "b", "c"]), Some("b"));
    }

    #[test]
    fn mode_tie_resolves_to_first_encountered() {
        assert_eq!(mode(&["b", "a", "a", "b"]), Some("b"));
    }

    #[test]
    fn mode_empty_is_none() {
        assert_eq!(mode(&[]), None);
    }

    #[test]
    fn describe_matches_hand_computed_values() {
        let summary = describe(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(summary.count, 5);
        assert!((summary.mean - 3.0).abs() < 1e-12);
        // Sample std of 1..=5 is sqrt(2.5)
        assert!((summary.std - 2.5f64.sqrt()).abs() < 1e-12);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.median, 3.0);
        assert_eq!(summary.max, 5.0);
    }
}
