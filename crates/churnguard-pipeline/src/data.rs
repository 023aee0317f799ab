//! Column-oriented storage for the customer table.
//!
//! `CustomerDataset` keeps each input column as its own row-aligned vector.
//! Cleaning and feature stages never mutate a dataset in place; they return
//! new values, with `filter` as the shared row-subsetting primitive.

use crate::stats::{self, ColumnSummary};

/// Numeric columns processed by the outlier filter, in filtering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericColumn {
    Age,
    SubscriptionLengthMonths,
    MonthlyBill,
    TotalUsageGb,
}

impl NumericColumn {
    pub const ALL: [NumericColumn; 4] = [
        NumericColumn::Age,
        NumericColumn::SubscriptionLengthMonths,
        NumericColumn::MonthlyBill,
        NumericColumn::TotalUsageGb,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            NumericColumn::Age => "Age",
            NumericColumn::SubscriptionLengthMonths => "Subscription_Length_Months",
            NumericColumn::MonthlyBill => "Monthly_Bill",
            NumericColumn::TotalUsageGb => "Total_Usage_GB",
        }
    }
}

/// Categorical columns subject to mode imputation and one-hot encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoricalColumn {
    Gender,
    Location,
}

impl CategoricalColumn {
    pub const ALL: [CategoricalColumn; 2] = [CategoricalColumn::Gender, CategoricalColumn::Location];

    pub fn name(&self) -> &'static str {
        match self {
            CategoricalColumn::Gender => "Gender",
            CategoricalColumn::Location => "Location",
        }
    }
}

/// One customer table: identifier, descriptive columns, and the binary churn
/// label (0 = Not Churn, 1 = Churn), all row-aligned.
#[derive(Debug, Clone, Default)]
pub struct CustomerDataset {
    pub customer_id: Vec<u32>,
    pub name: Vec<String>,
    pub age: Vec<f64>,
    pub gender: Vec<Option<String>>,
    pub location: Vec<Option<String>>,
    pub subscription_length_months: Vec<f64>,
    pub monthly_bill: Vec<f64>,
    pub total_usage_gb: Vec<f64>,
    pub churn: Vec<u8>,
}

impl CustomerDataset {
    pub fn len(&self) -> usize {
        self.customer_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customer_id.is_empty()
    }

    pub fn numeric(&self, column: NumericColumn) -> &[f64] {
        match column {
            NumericColumn::Age => &self.age,
            NumericColumn::SubscriptionLengthMonths => &self.subscription_length_months,
            NumericColumn::MonthlyBill => &self.monthly_bill,
            NumericColumn::TotalUsageGb => &self.total_usage_gb,
        }
    }

    pub fn categorical(&self, column: CategoricalColumn) -> &[Option<String>] {
        match column {
            CategoricalColumn::Gender => &self.gender,
            CategoricalColumn::Location => &self.location,
        }
    }

    pub fn categorical_mut(&mut self, column: CategoricalColumn) -> &mut Vec<Option<String>> {
        match column {
            CategoricalColumn::Gender => &mut self.gender,
            CategoricalColumn::Location => &mut self.location,
        }
    }

    /// New dataset keeping only rows where `mask[i]` is true.
    ///
    /// The mask must have one entry per row.
    pub fn filter(&self, mask: &[bool]) -> CustomerDataset {
        assert_eq!(mask.len(), self.len(), "filter mask length mismatch");

        let keep: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, &m)| if m { Some(i) } else { None })
            .collect();

        CustomerDataset {
            customer_id: keep.iter().map(|&i| self.customer_id[i]).collect(),
            name: keep.iter().map(|&i| self.name[i].clone()).collect(),
            age: keep.iter().map(|&i| self.age[i]).collect(),
            gender: keep.iter().map(|&i| self.gender[i].clone()).collect(),
            location: keep.iter().map(|&i| self.location[i].clone()).collect(),
            subscription_length_months: keep
                .iter()
                .map(|&i| self.subscription_length_months[i])
                .collect(),
            monthly_bill: keep.iter().map(|&i| self.monthly_bill[i]).collect(),
            total_usage_gb: keep.iter().map(|&i| self.total_usage_gb[i]).collect(),
            churn: keep.iter().map(|&i| self.churn[i]).collect(),
        }
    }

    /// Descriptive statistics for every numeric column plus the label.
    pub fn describe(&self) -> Vec<(&'static str, ColumnSummary)> {
        let mut rows: Vec<(&'static str, ColumnSummary)> = NumericColumn::ALL
            .iter()
            .map(|&col| (col.name(), stats::describe(self.numeric(col))))
            .collect();
        let churn_f64: Vec<f64> = self.churn.iter().map(|&c| c as f64).collect();
        rows.push(("Churn", stats::describe(&churn_f64)));
        rows
    }

    /// Count of missing entries per column, in input-schema order.
    pub fn null_counts(&self) -> Vec<(&'static str, usize)> {
        let missing = |col: &[Option<String>]| col.iter().filter(|v| v.is_none()).count();
        vec![
            ("CustomerID", 0),
            ("Name", 0),
            ("Age", 0),
            ("Gender", missing(&self.gender)),
            ("Location", missing(&self.location)),
            ("Subscription_Length_Months", 0),
            ("Monthly_Bill", 0),
            ("Total_Usage_GB", 0),
            ("Churn", 0),
        ]
    }

    /// Print shape, column types, descriptive statistics, and null counts to
    /// stdout. This is the textual exploration report the pipeline emits
    /// before any cleaning happens.
    pub fn print_summary(&self) {
        println!("----- Dataset Summary -----");
        println!("{} rows x 9 columns", self.len());
        println!();
        println!(
            "{:<28} {:>8} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
            "column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
        );
        for (name, s) in self.describe() {
            println!(
                "{:<28} {:>8} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2}",
                name, s.count, s.mean, s.std, s.min, s.q1, s.median, s.q3, s.max
            );
        }
        println!();
        println!("missing values per column:");
        for (name, count) in self.null_counts() {
            println!("  {:<28} {}", name, count);
        }
        println!("---------------------------");
    }
}
