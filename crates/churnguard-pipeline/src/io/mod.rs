//! IO utilities for loading the customer table.

pub mod customer_csv;

pub use customer_csv::{read_customer_csv, REQUIRED_COLUMNS};
