//! Reporting and plotting helpers.
//!
//! This module converts evaluation results into `plotly::Plot` values; HTML
//! assembly and file writing belong to the CLI.
pub mod plots;
