//! Fiber Link Runner
//!
//! Everything around the `link-budget` engine that touches the outside
//! world: reading link tables from CSV, row validation, writing result
//! tables, the JSON analysis report, and seeded synthetic link tables.
//!
//! # Pipeline
//!
//! ```text
//! links.csv ──loader──▶ Vec<LinkInput> ──validate──▶ run_batch / run_sweep
//!                                                        │
//!                     report.json ◀──report── results.csv ◀──writer──┘
//! ```

use link_budget::BudgetError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub mod config;
pub mod generator;
pub mod loader;
pub mod report;
pub mod validate;
pub mod writer;

pub use config::{CsvOptions, CsvSchema, RunConfig};
pub use validate::ValidationOptions;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Budget(#[from] BudgetError),
    #[error("CSV schema validation failed: {}", join_row_errors(.0))]
    Schema(Vec<RowError>),
    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RunnerError>;

/// A problem with one cell of an input table.
///
/// Row 0 is the header; data rows count from 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    pub row: usize,
    pub field: String,
    pub message: String,
}

impl RowError {
    pub fn new(row: usize, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            row,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            write!(f, "row {}: {}", self.row, self.message)
        } else {
            write!(f, "row {} [{}]: {}", self.row, self.field, self.message)
        }
    }
}

fn join_row_errors(errors: &[RowError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_error_display() {
        let e = RowError::new(3, "fiber_length_km", "not a number");
        assert_eq!(e.to_string(), "row 3 [fiber_length_km]: not a number");

        let e = RowError::new(0, "", "empty file");
        assert_eq!(e.to_string(), "row 0: empty file");
    }

    #[test]
    fn test_schema_error_lists_columns() {
        let err = RunnerError::Schema(vec![
            RowError::new(0, "tx_power_dbm", "missing required column"),
            RowError::new(0, "other_loss_db", "missing required column"),
        ]);
        let text = err.to_string();
        assert!(text.contains("tx_power_dbm"));
        assert!(text.contains("other_loss_db"));
    }
}
