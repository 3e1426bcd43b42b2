//! Synthetic link tables
//!
//! Seeded generation of plausible GPON-style links for demos, load tests
//! and sweep experiments. The same seed always yields the same table.

use crate::Result;
use link_budget::LinkInput;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Header of a generated table; margin is written under its legacy name
pub const GENERATED_COLUMNS: [&str; 13] = [
    "link_id",
    "scenario",
    "tx_power_dbm",
    "rx_sensitivity_dbm",
    "engineering_margin_db",
    "fiber_length_km",
    "fiber_att_db_per_km",
    "n_splice",
    "splice_loss_db",
    "n_connector",
    "connector_loss_db",
    "splitter_loss_db",
    "other_loss_db",
];

// ============================================================================
// Distributions
// ============================================================================

const FIBER_LENGTH_KM: (f64, f64) = (2.0, 40.0);
const FIBER_ATT_DB_PER_KM: [f64; 4] = [0.2, 0.3, 0.4, 0.5];
const TX_POWER_DBM: [f64; 4] = [2.0, 4.0, 6.0, 8.0];
const RX_SENSITIVITY_DBM: [f64; 4] = [-27.0, -28.0, -29.0, -20.0];
const SYSTEM_MARGIN_DB: [f64; 4] = [2.0, 3.0, 4.0, 5.0];
const SPLITTER_LOSS_DB: [f64; 4] = [0.5, 1.0, 1.5, 2.0];
const SPLICE_LOSS_DB: (f64, f64) = (0.05, 0.15);
const N_CONNECTOR: [u32; 4] = [2, 4, 6, 8];
const CONNECTOR_LOSS_DB: (f64, f64) = (0.2, 0.5);
const OTHER_LOSS_DB: (f64, f64) = (0.0, 2.5);

/// Roughly one splice every 3 km
const KM_PER_SPLICE: f64 = 3.0;

/// Generation settings
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub n_links: usize,
    pub seed: u64,
    pub scenario: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            n_links: 1000,
            seed: 42,
            scenario: "base".to_string(),
        }
    }
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn links(mut self, n: usize) -> Self {
        self.n_links = n;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn scenario(mut self, scenario: impl Into<String>) -> Self {
        self.scenario = scenario.into();
        self
    }
}

fn pick<T: Copy>(rng: &mut StdRng, options: &[T]) -> T {
    options[rng.random_range(0..options.len())]
}

fn uniform(rng: &mut StdRng, (low, high): (f64, f64), places: i32) -> f64 {
    round_to(rng.random_range(low..=high), places)
}

fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

// ============================================================================
// Generation
// ============================================================================

/// Generate `config.n_links` links named `link_00001`, `link_00002`, ...
pub fn generate_links(config: &GeneratorConfig) -> Vec<LinkInput> {
    let mut rng = StdRng::seed_from_u64(config.seed);

    (1..=config.n_links)
        .map(|i| {
            let fiber_length_km = uniform(&mut rng, FIBER_LENGTH_KM, 2);
            let tx_power_dbm = pick(&mut rng, &TX_POWER_DBM);
            let rx_sensitivity_dbm = pick(&mut rng, &RX_SENSITIVITY_DBM);
            let system_margin_db = pick(&mut rng, &SYSTEM_MARGIN_DB);
            let fiber_att_db_per_km = pick(&mut rng, &FIBER_ATT_DB_PER_KM);

            LinkInput {
                link_id: format!("link_{:05}", i),
                scenario: config.scenario.clone(),
                tx_power_dbm,
                rx_sensitivity_dbm,
                system_margin_db,
                fiber_length_km,
                fiber_att_db_per_km,
                n_splice: ((fiber_length_km / KM_PER_SPLICE).floor() as u32).max(1),
                splice_loss_db: uniform(&mut rng, SPLICE_LOSS_DB, 3),
                n_connector: pick(&mut rng, &N_CONNECTOR),
                connector_loss_db: uniform(&mut rng, CONNECTOR_LOSS_DB, 3),
                splitter_loss_db: pick(&mut rng, &SPLITTER_LOSS_DB),
                other_loss_db: uniform(&mut rng, OTHER_LOSS_DB, 2),
            }
        })
        .collect()
}

/// Generate a table and write it to `path`, creating parent directories
pub fn write_generated(
    path: impl AsRef<Path>,
    config: &GeneratorConfig,
    delimiter: u8,
) -> Result<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let links = generate_links(config);
    write_links_to(File::create(path)?, &links, delimiter)?;

    info!(
        "Generated {} links (seed {}) into {:?}",
        links.len(),
        config.seed,
        path
    );
    Ok(links.len())
}

/// Write links in input-table layout
pub fn write_links_to<W: Write>(writer: W, links: &[LinkInput], delimiter: u8) -> Result<()> {
    let mut csv_wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    csv_wtr.write_record(GENERATED_COLUMNS)?;

    for link in links {
        csv_wtr.write_record([
            link.link_id.clone(),
            link.scenario.clone(),
            link.tx_power_dbm.to_string(),
            link.rx_sensitivity_dbm.to_string(),
            link.system_margin_db.to_string(),
            link.fiber_length_km.to_string(),
            link.fiber_att_db_per_km.to_string(),
            link.n_splice.to_string(),
            link.splice_loss_db.to_string(),
            link.n_connector.to_string(),
            link.connector_loss_db.to_string(),
            link.splitter_loss_db.to_string(),
            link.other_loss_db.to_string(),
        ])?;
    }

    csv_wtr.flush()?;
    Ok(())
}
