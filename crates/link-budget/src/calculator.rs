//! Per-link orchestration
//!
//! Composes the power budget, the optional rise time budget and the
//! contributor ranking into one [`LinkOutput`] per link.

use crate::lpb::{calculate_lpb, LpbInputs};
use crate::ranking::{link_contributors, rank_contributors};
use crate::rtb::{calculate_rtb, RtbInputs};
use crate::{BudgetError, LinkInput, LinkOutput, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

// ============================================================================
// Configuration
// ============================================================================

/// Run-wide options, passed by value into every computation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerOptions {
    /// Evaluate the rise time budget
    pub rtb_enabled: bool,
    /// Line rate (Gbps)
    pub bitrate_gbps: f64,
    /// Transmitter 10-90% rise time (ns)
    pub tx_rise_time_ns: f64,
    /// Receiver 10-90% rise time (ns)
    pub rx_rise_time_ns: f64,
    /// Dispersion-induced rise time per km (ns/km)
    pub dispersion_ns_per_km: f64,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            rtb_enabled: false,
            bitrate_gbps: 2.5,
            tx_rise_time_ns: 0.2,
            rx_rise_time_ns: 0.2,
            dispersion_ns_per_km: 0.0,
        }
    }
}

impl RunnerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rtb(mut self, enabled: bool) -> Self {
        self.rtb_enabled = enabled;
        self
    }

    pub fn bitrate_gbps(mut self, gbps: f64) -> Self {
        self.bitrate_gbps = gbps;
        self
    }

    pub fn rise_times_ns(mut self, tx: f64, rx: f64) -> Self {
        self.tx_rise_time_ns = tx;
        self.rx_rise_time_ns = rx;
        self
    }

    pub fn dispersion_ns_per_km(mut self, ns_per_km: f64) -> Self {
        self.dispersion_ns_per_km = ns_per_km;
        self
    }
}

// ============================================================================
// Computation
// ============================================================================

/// Compute the report row for one link.
///
/// Any budget failure is returned as [`BudgetError::LinkCompute`] tagged
/// with the link id; the caller decides whether to skip or halt.
pub fn compute_link(link: &LinkInput, options: &RunnerOptions) -> Result<LinkOutput> {
    evaluate(link, options).map_err(|source| BudgetError::LinkCompute {
        link_id: link.link_id.clone(),
        source: Box::new(source),
    })
}

fn evaluate(link: &LinkInput, options: &RunnerOptions) -> Result<LinkOutput> {
    let fiber_loss_db = link.fiber_loss_db();
    let connector_total_db = link.connector_total_db();
    let splice_total_db = link.splice_total_db();

    let lpb = calculate_lpb(&LpbInputs {
        tx_power_dbm: link.tx_power_dbm,
        rx_sensitivity_dbm: link.rx_sensitivity_dbm,
        fiber_att_db_per_km: link.fiber_att_db_per_km,
        connector_total_db,
        splice_total_db,
        splitter_loss_db: link.splitter_loss_db,
        other_loss_db: link.other_loss_db,
        system_margin_db: link.system_margin_db,
        link_length_km: link.fiber_length_km,
    })?;

    let [top1, top2, top3] = rank_contributors(&link_contributors(link))?;

    // Not evaluated: zero rise times, rtb_status false
    let (system_rise_time_ns, allowed_rise_time_ns, rtb_status) = if options.rtb_enabled {
        let rtb = calculate_rtb(&RtbInputs {
            bitrate_gbps: options.bitrate_gbps,
            tx_rise_time_ns: options.tx_rise_time_ns,
            rx_rise_time_ns: options.rx_rise_time_ns,
            fiber_length_km: link.fiber_length_km,
            dispersion_ns_per_km: options.dispersion_ns_per_km,
        })?;
        (rtb.system_rise_time_ns, rtb.allowed_rise_time_ns, rtb.pass)
    } else {
        (0.0, 0.0, false)
    };

    debug!(
        link_id = %link.link_id,
        scenario = %link.scenario,
        margin_db = lpb.margin_db,
        "computed link"
    );

    Ok(LinkOutput {
        link_id: link.link_id.clone(),
        scenario: link.scenario.clone(),
        fiber_loss_db,
        splice_total_db,
        connector_total_db,
        total_loss_db: lpb.total_loss_db,
        rx_power_dbm: lpb.rx_power_dbm,
        margin_db: lpb.margin_db,
        lpb_status: lpb.status,
        system_rise_time_ns,
        allowed_rise_time_ns,
        rtb_status,
        top_contributor1: top1.to_string(),
        top_contributor2: top2.to_string(),
        top_contributor3: top3.to_string(),
    })
}

/// Compute every link in order, halting on the first failure.
///
/// Inputs are presumed validated, so a failure here points at a
/// validator/engine mismatch and is surfaced immediately.
pub fn run_batch(links: &[LinkInput], options: &RunnerOptions) -> Result<Vec<LinkOutput>> {
    let results = links
        .iter()
        .map(|link| compute_link(link, options))
        .collect::<Result<Vec<_>>>()?;

    info!("Computed {} links", results.len());
    Ok(results)
}


// ============================================================================
// Property-based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::LpbStatus;
    use proptest::prelude::*;

    // Strategy for physically plausible, validated links
    fn link_strategy() -> impl Strategy<Value = LinkInput> {
        (
            (-10.0f64..10.0, -40.0f64..-10.0, 0.0f64..10.0),
            (0.0f64..100.0, 0.01f64..1.0),
            (0u32..50, 0.0f64..0.5, 0u32..20, 0.0f64..1.0),
            (0.0f64..25.0, 0.0f64..5.0),
        )
            .prop_map(
                |((tx, rx, margin), (length, att), (ns, ls, nc, lc), (split, other))| LinkInput {
                    link_id: "fuzz".to_string(),
                    scenario: "base".to_string(),
                    tx_power_dbm: tx,
                    rx_sensitivity_dbm: rx,
                    system_margin_db: margin,
                    fiber_length_km: length,
                    fiber_att_db_per_km: att,
                    n_splice: ns,
                    splice_loss_db: ls,
                    n_connector: nc,
                    connector_loss_db: lc,
                    splitter_loss_db: split,
                    other_loss_db: other,
                },
            )
    }

    fn rtb_options_strategy() -> impl Strategy<Value = RunnerOptions> {
        (0.1f64..40.0, 0.0f64..50.0, 0.0f64..50.0, 0.0f64..2.0).prop_map(
            |(bitrate, tx, rx, disp)| {
                RunnerOptions::new()
                    .rtb(true)
                    .bitrate_gbps(bitrate)
                    .rise_times_ns(tx, rx)
                    .dispersion_ns_per_km(disp)
            },
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(2000))]

        // Total loss reconciles with its parts
        #[test]
        fn fuzz_total_loss_reconciles(link in link_strategy()) {
            let out = compute_link(&link, &RunnerOptions::default()).unwrap();
            let parts = out.fiber_loss_db
                + out.connector_total_db
                + out.splice_total_db
                + link.splitter_loss_db
                + link.other_loss_db;
            prop_assert!((out.total_loss_db - parts).abs() <= 1e-9 * parts.abs().max(1.0));
        }

        // Longer fiber always costs margin
        #[test]
        fn fuzz_margin_monotonic_in_length(link in link_strategy(), extra in 0.5f64..50.0) {
            let mut longer = link.clone();
            longer.fiber_length_km += extra;
            let options = RunnerOptions::default();
            let short = compute_link(&link, &options).unwrap();
            let long = compute_link(&longer, &options).unwrap();
            prop_assert!(long.margin_db < short.margin_db);
        }

        // Verdicts follow their thresholds exactly
        #[test]
        fn fuzz_thresholds(link in link_strategy(), options in rtb_options_strategy()) {
            let out = compute_link(&link, &options).unwrap();
            prop_assert_eq!(out.lpb_status == LpbStatus::Pass, out.margin_db >= 0.0);
            prop_assert_eq!(out.rtb_status, out.system_rise_time_ns <= out.allowed_rise_time_ns);
            prop_assert!(out.rtb_evaluated());
        }

        // Disabled RTB leaves the sentinel regardless of line rate
        #[test]
        fn fuzz_rtb_disabled_sentinel(link in link_strategy(), options in rtb_options_strategy()) {
            let out = compute_link(&link, &options.rtb(false)).unwrap();
            prop_assert_eq!(out.system_rise_time_ns, 0.0);
            prop_assert_eq!(out.allowed_rise_time_ns, 0.0);
            prop_assert!(!out.rtb_status);
        }
    }
}
