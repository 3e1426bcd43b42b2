//! Link Power Budget
//!
//! Optical loss accounting from transmitter to receiver:
//! fiber attenuation, connectors, splices, splitter and miscellaneous loss.
//! Connector and splice figures arrive as totals (count × per-unit loss).

use crate::{BudgetError, LpbStatus, Result};
use serde::{Deserialize, Serialize};

/// Inputs to the link power budget
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LpbInputs {
    pub tx_power_dbm: f64,
    pub rx_sensitivity_dbm: f64,
    pub fiber_att_db_per_km: f64,
    pub connector_total_db: f64,
    pub splice_total_db: f64,
    pub splitter_loss_db: f64,
    pub other_loss_db: f64,
    pub system_margin_db: f64,
    pub link_length_km: f64,
}

/// Link power budget result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LpbResult {
    pub total_loss_db: f64,
    pub rx_power_dbm: f64,
    pub margin_db: f64,
    pub status: LpbStatus,
}

/// Calculate the link power budget.
///
/// Only the attenuation coefficient is re-checked here; every other range
/// is the validator's job.
pub fn calculate_lpb(input: &LpbInputs) -> Result<LpbResult> {
    if input.fiber_att_db_per_km < 0.0 {
        return Err(BudgetError::InvalidInput {
            field: "fiber_att_db_per_km",
            value: input.fiber_att_db_per_km,
            reason: "attenuation coefficient cannot be negative",
        });
    }

    // Summed in reconciliation order: fiber, connector, splice, splitter, other
    let fiber_loss_db = input.link_length_km * input.fiber_att_db_per_km;
    let total_loss_db = fiber_loss_db
        + input.connector_total_db
        + input.splice_total_db
        + input.splitter_loss_db
        + input.other_loss_db;

    // P_rx = P_tx - total loss
    let rx_power_dbm = input.tx_power_dbm - total_loss_db;

    // Margin = received power - sensitivity - required margin
    let margin_db = rx_power_dbm - input.rx_sensitivity_dbm - input.system_margin_db;

    Ok(LpbResult {
        total_loss_db,
        rx_power_dbm,
        margin_db,
        status: LpbStatus::from_margin(margin_db),
    })
}
