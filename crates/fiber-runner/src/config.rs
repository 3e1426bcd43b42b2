//! Run configuration
//!
//! Every setting has a default; a JSON file may override any subset and
//! command-line flags override the file.

use crate::validate::ValidationOptions;
use crate::{Result, RunnerError};
use link_budget::RunnerOptions;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// Default cap on `combinations × links` for a single sweep
pub const DEFAULT_MAX_COMBINATIONS: usize = 100_000;

/// Column contract for link input tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvSchema {
    /// Columns that must be present (after trimming and lower-casing)
    pub required_columns: Vec<String>,
    /// `(alias, canonical)` header pairs accepted in place of a required column
    pub column_aliases: Vec<(String, String)>,
}

impl Default for CsvSchema {
    fn default() -> Self {
        Self {
            required_columns: [
                "link_id",
                "scenario",
                "tx_power_dbm",
                "rx_sensitivity_dbm",
                "system_margin_db",
                "fiber_length_km",
                "fiber_att_db_per_km",
                "n_splice",
                "splice_loss_db",
                "n_connector",
                "connector_loss_db",
                "splitter_loss_db",
                "other_loss_db",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
            column_aliases: vec![(
                "engineering_margin_db".to_string(),
                "system_margin_db".to_string(),
            )],
        }
    }
}

/// CSV dialect and schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    /// Field delimiter (single ASCII character)
    pub delimiter: char,
    /// Accept `,` as the decimal separator in numeric cells
    pub decimal_comma: bool,
    pub schema: CsvSchema,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            decimal_comma: false,
            schema: CsvSchema::default(),
        }
    }
}

impl CsvOptions {
    /// Delimiter as the byte the csv crate expects
    pub fn delimiter_byte(&self) -> Result<u8> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(RunnerError::Config(format!(
                "delimiter {:?} is not a single ASCII character",
                self.delimiter
            )))
        }
    }
}

/// Everything a run needs besides its input paths
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub runner: RunnerOptions,
    pub csv: CsvOptions,
    pub validation: ValidationOptions,
    /// Upper bound on records a sweep may produce
    pub max_combinations: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            runner: RunnerOptions::default(),
            csv: CsvOptions::default(),
            validation: ValidationOptions::default(),
            max_combinations: DEFAULT_MAX_COMBINATIONS,
        }
    }
}

impl RunConfig {
    /// Load from a JSON file; missing keys keep their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading run configuration from {:?}", path);

        let file = File::open(path)?;
        let config: RunConfig = serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }
}
