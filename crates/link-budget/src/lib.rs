//! Fiber Link Budget Library
//!
//! Feasibility engine for passive fiber links (FTTH / point-to-point).
//! Every link is checked against two independent budgets:
//!
//! ```text
//! LPB:  total_loss = α·L + N_c·l_c + N_s·l_s + l_split + l_other
//!       P_rx       = P_tx − total_loss
//!       margin     = P_rx − S_rx − M_sys          (PASS iff margin ≥ 0)
//!
//! RTB:  t_sys      = t_tx + t_rx + L·D
//!       t_allowed  = 0.7 / B[Gbps] · 1000 ns      (PASS iff t_sys ≤ t_allowed)
//! ```
//!
//! | Module       | Role |
//! |--------------|------|
//! | `lpb`        | Link power budget |
//! | `rtb`        | Rise time budget |
//! | `ranking`    | Top-3 loss contributor ranking |
//! | `calculator` | Per-link orchestration, batch runs |
//! | `variation`  | `field=v1,v2,...` axis parsing and field dispatch |
//! | `sweep`      | Cartesian-product parameter sweeps |
//! | `summary`    | Per-scenario pass rates and margin statistics |

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub mod calculator;
pub mod lpb;
pub mod ranking;
pub mod rtb;
pub mod summary;
pub mod sweep;
pub mod variation;

pub use calculator::{compute_link, run_batch, RunnerOptions};
pub use sweep::{run_sweep, SweepOutcome};
pub use variation::{Variation, VariationField};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BudgetError {
    #[error("Invalid input: {field} = {value} ({reason})")]
    InvalidInput {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },
    #[error("Malformed variation spec {spec:?}: {reason}")]
    MalformedSpec { spec: String, reason: String },
    #[error("Unknown variation field: {0}")]
    UnknownField(String),
    #[error("Insufficient loss contributors: need {need}, have {have}")]
    InsufficientData { need: usize, have: usize },
    #[error("Link {link_id}: {source}")]
    LinkCompute {
        link_id: String,
        #[source]
        source: Box<BudgetError>,
    },
}

pub type Result<T> = std::result::Result<T, BudgetError>;

// ============================================================================
// Link records
// ============================================================================

/// One candidate fiber link, as delivered by the ingestion layer.
///
/// Treated as read-only once validated; sweeps work on clones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkInput {
    pub link_id: String,
    pub scenario: String,

    // Transmitter / receiver
    pub tx_power_dbm: f64,
    pub rx_sensitivity_dbm: f64,
    pub system_margin_db: f64,

    // Fiber plant
    pub fiber_length_km: f64,
    pub fiber_att_db_per_km: f64,

    // Passive components
    pub n_splice: u32,
    pub splice_loss_db: f64,
    pub n_connector: u32,
    pub connector_loss_db: f64,
    pub splitter_loss_db: f64,
    pub other_loss_db: f64,
}

impl LinkInput {
    /// Fiber attenuation over the full length (dB)
    pub fn fiber_loss_db(&self) -> f64 {
        self.fiber_length_km * self.fiber_att_db_per_km
    }

    /// Sum of all connector losses (dB)
    pub fn connector_total_db(&self) -> f64 {
        f64::from(self.n_connector) * self.connector_loss_db
    }

    /// Sum of all splice losses (dB)
    pub fn splice_total_db(&self) -> f64 {
        f64::from(self.n_splice) * self.splice_loss_db
    }
}

/// Link power budget verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LpbStatus {
    Pass,
    Fail,
}

impl LpbStatus {
    /// PASS iff the residual margin is non-negative. NaN fails.
    pub fn from_margin(margin_db: f64) -> Self {
        if margin_db >= 0.0 {
            LpbStatus::Pass
        } else {
            LpbStatus::Fail
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LpbStatus::Pass => "PASS",
            LpbStatus::Fail => "FAIL",
        }
    }
}

impl fmt::Display for LpbStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One computed report row, keyed by (link_id, scenario).
///
/// Field order is the egestion column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkOutput {
    pub link_id: String,
    pub scenario: String,

    // Loss breakdown
    pub fiber_loss_db: f64,
    pub splice_total_db: f64,
    pub connector_total_db: f64,
    pub total_loss_db: f64,

    // Link power budget
    pub rx_power_dbm: f64,
    pub margin_db: f64,
    pub lpb_status: LpbStatus,

    // Rise time budget (zero / false when not evaluated)
    pub system_rise_time_ns: f64,
    pub allowed_rise_time_ns: f64,
    #[serde(rename = "rtb_pass")]
    pub rtb_status: bool,

    // Explainability
    #[serde(rename = "top_contributor_1")]
    pub top_contributor1: String,
    #[serde(rename = "top_contributor_2")]
    pub top_contributor2: String,
    #[serde(rename = "top_contributor_3")]
    pub top_contributor3: String,
}

impl LinkOutput {
    /// Whether the rise time budget was evaluated for this record.
    ///
    /// An evaluated budget always has a positive allowed rise time, so the
    /// zero sentinel can never be confused with an evaluated FAIL.
    pub fn rtb_evaluated(&self) -> bool {
        self.allowed_rise_time_ns > 0.0
    }
}

/// Column names of a [`LinkOutput`] row, in egestion order.
pub const OUTPUT_COLUMNS: [&str; 15] = [
    "link_id",
    "scenario",
    "fiber_loss_db",
    "splice_total_db",
    "connector_total_db",
    "total_loss_db",
    "rx_power_dbm",
    "margin_db",
    "lpb_status",
    "system_rise_time_ns",
    "allowed_rise_time_ns",
    "rtb_pass",
    "top_contributor_1",
    "top_contributor_2",
    "top_contributor_3",
];


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lpb_status_threshold() {
        assert_eq!(LpbStatus::from_margin(0.0), LpbStatus::Pass);
        assert_eq!(LpbStatus::from_margin(0.5), LpbStatus::Pass);
        assert_eq!(LpbStatus::from_margin(-1e-12), LpbStatus::Fail);
        assert_eq!(LpbStatus::from_margin(f64::NAN), LpbStatus::Fail);
        assert_eq!(LpbStatus::Pass.to_string(), "PASS");
    }

    #[test]
    fn test_loss_breakdown() {
        let link = fixtures::reference_link();
        assert!((link.fiber_loss_db() - 3.5).abs() < 1e-9);
        assert!((link.connector_total_db() - 1.2).abs() < 1e-9);
        assert!((link.splice_total_db() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_link_compute_error_message() {
        let err = BudgetError::LinkCompute {
            link_id: "L7".to_string(),
            source: Box::new(BudgetError::InvalidInput {
                field: "bitrate_gbps",
                value: 0.0,
                reason: "must be greater than zero",
            }),
        };
        assert_eq!(
            err.to_string(),
            "Link L7: Invalid input: bitrate_gbps = 0 (must be greater than zero)"
        );
    }
}
