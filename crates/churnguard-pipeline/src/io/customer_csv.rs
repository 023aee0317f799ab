//! Customer CSV reader.
use std::path::Path;

use csv::StringRecord;

use crate::data::CustomerDataset;
use crate::error::{PipelineError, Result};

/// Column headers the input file must provide. Matching is
/// case-insensitive; order does not matter.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "CustomerID",
    "Name",
    "Age",
    "Gender",
    "Location",
    "Subscription_Length_Months",
    "Monthly_Bill",
    "Total_Usage_GB",
    "Churn",
];

/// Read a customer table from a comma-separated file.
///
/// Empty cells in the Gender and Location columns load as missing values;
/// every other column must parse, and a file without data rows is rejected.
pub fn read_customer_csv<P: AsRef<Path>>(path: P) -> Result<CustomerDataset> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| PipelineError::Data(format!("failed to open {}: {}", path.display(), e)))?;

    let headers = reader
        .headers()
        .map_err(|e| PipelineError::Data(format!("failed to read header row: {}", e)))?
        .clone();

    let column_index = |name: &str| -> Result<usize> {
        find_column(&headers, name).ok_or_else(|| {
            PipelineError::Data(format!(
                "required column '{}' not found in {}",
                name,
                path.display()
            ))
        })
    };

    let id_idx = column_index("CustomerID")?;
    let name_idx = column_index("Name")?;
    let age_idx = column_index("Age")?;
    let gender_idx = column_index("Gender")?;
    let location_idx = column_index("Location")?;
    let subscription_idx = column_index("Subscription_Length_Months")?;
    let bill_idx = column_index("Monthly_Bill")?;
    let usage_idx = column_index("Total_Usage_GB")?;
    let churn_idx = column_index("Churn")?;

    let mut dataset = CustomerDataset::default();

    for (row_idx, record) in reader.records().enumerate() {
        let record = record
            .map_err(|e| PipelineError::Data(format!("failed to read row {}: {}", row_idx + 1, e)))?;

        dataset
            .customer_id
            .push(parse_field(&record, id_idx, "CustomerID", row_idx)?);
        dataset
            .name
            .push(get_field(&record, name_idx, "Name", row_idx)?.to_string());
        dataset
            .age
            .push(parse_field(&record, age_idx, "Age", row_idx)?);
        dataset
            .gender
            .push(optional_field(&record, gender_idx, "Gender", row_idx)?);
        dataset
            .location
            .push(optional_field(&record, location_idx, "Location", row_idx)?);
        dataset.subscription_length_months.push(parse_field(
            &record,
            subscription_idx,
            "Subscription_Length_Months",
            row_idx,
        )?);
        dataset
            .monthly_bill
            .push(parse_field(&record, bill_idx, "Monthly_Bill", row_idx)?);
        dataset
            .total_usage_gb
            .push(parse_field(&record, usage_idx, "Total_Usage_GB", row_idx)?);
        dataset
            .churn
            .push(parse_churn(&record, churn_idx, row_idx)?);
    }

    if dataset.is_empty() {
        return Err(PipelineError::Data(format!(
            "{} contains no data rows",
            path.display()
        )));
    }

    log::info!(
        "loaded {} customer rows from {}",
        dataset.len(),
        path.display()
    );

    Ok(dataset)
}

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.trim().eq_ignore_ascii_case(name))
}

fn get_field<'r>(
    record: &'r StringRecord,
    idx: usize,
    column: &str,
    row_idx: usize,
) -> Result<&'r str> {
    record.get(idx).map(str::trim).ok_or_else(|| {
        PipelineError::Data(format!("missing '{}' value at row {}", column, row_idx + 1))
    })
}

fn parse_field<T: std::str::FromStr>(
    record: &StringRecord,
    idx: usize,
    column: &str,
    row_idx: usize,
) -> Result<T> {
    let raw = get_field(record, idx, column, row_idx)?;
    raw.parse::<T>().map_err(|_| {
        PipelineError::Data(format!(
            "invalid '{}' value '{}' at row {}",
            column,
            raw,
            row_idx + 1
        ))
    })
}

fn optional_field(
    record: &StringRecord,
    idx: usize,
    column: &str,
    row_idx: usize,
) -> Result<Option<String>> {
    let raw = get_field(record, idx, column, row_idx)?;
    if raw.is_empty() {
        Ok(None)
    } else {
        Ok(Some(raw.to_string()))
    }
}

/// The churn label is binary-coded; anything other than 0 or 1 is malformed.
fn parse_churn(record: &StringRecord, idx: usize, row_idx: usize) -> Result<u8> {
    let value: f64 = parse_field(record, idx, "Churn", row_idx)?;
    if value == 0.0 {
        Ok(0)
    } else if value == 1.0 {
        Ok(1)
    } else {
        Err(PipelineError::Data(format!(
            "invalid 'Churn' value '{}' at row {}; expected 0 or 1",
            value,
            row_idx + 1
        )))
    }
}
