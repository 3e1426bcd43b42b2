//! Row-level precondition checks on ingested links

use crate::RowError;
use link_budget::LinkInput;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Validation thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// Highest plausible fiber attenuation (dB/km)
    pub max_fiber_att_db_per_km: f64,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            max_fiber_att_db_per_km: 1.0,
        }
    }
}

/// Check every link, returning one error per violated rule.
///
/// Rows are numbered from 1 in slice order.
pub fn validate_links(links: &[LinkInput], options: &ValidationOptions) -> Vec<RowError> {
    let mut errors = Vec::new();

    for (i, link) in links.iter().enumerate() {
        let row = i + 1;

        if link.link_id.trim().is_empty() {
            errors.push(RowError::new(row, "link_id", "required"));
        }

        let numeric = [
            ("tx_power_dbm", link.tx_power_dbm),
            ("rx_sensitivity_dbm", link.rx_sensitivity_dbm),
            ("system_margin_db", link.system_margin_db),
            ("fiber_length_km", link.fiber_length_km),
            ("fiber_att_db_per_km", link.fiber_att_db_per_km),
            ("splice_loss_db", link.splice_loss_db),
            ("connector_loss_db", link.connector_loss_db),
            ("splitter_loss_db", link.splitter_loss_db),
            ("other_loss_db", link.other_loss_db),
        ];
        for (field, value) in numeric {
            if !value.is_finite() {
                errors.push(RowError::new(row, field, "must be a finite number"));
            }
        }

        if link.fiber_length_km < 0.0 {
            errors.push(RowError::new(row, "fiber_length_km", "must be zero or greater"));
        }
        if link.fiber_att_db_per_km <= 0.0
            || link.fiber_att_db_per_km > options.max_fiber_att_db_per_km
        {
            errors.push(RowError::new(
                row,
                "fiber_att_db_per_km",
                format!(
                    "must be greater than zero and at most {}",
                    options.max_fiber_att_db_per_km
                ),
            ));
        }

        let losses = [
            ("splice_loss_db", link.splice_loss_db),
            ("connector_loss_db", link.connector_loss_db),
            ("splitter_loss_db", link.splitter_loss_db),
            ("other_loss_db", link.other_loss_db),
        ];
        for (field, value) in losses {
            if value < 0.0 {
                errors.push(RowError::new(row, field, "must be zero or greater"));
            }
        }
    }

    info!(
        "Validated {} links ({} problems)",
        links.len(),
        errors.len()
    );

    errors
}
