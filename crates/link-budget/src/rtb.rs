//! Rise Time Budget
//!
//! Checks that transmitter, receiver and fiber dispersion together keep
//! the pulse edge inside the NRZ bit period.

use crate::{BudgetError, Result};
use serde::{Deserialize, Serialize};

/// NRZ rise-time fraction of the bit period
pub const NRZ_RISE_FRACTION: f64 = 0.7;

/// 1 / Gbps expressed in ns
const NS_PER_INVERSE_GBPS: f64 = 1000.0;

/// Inputs to the rise time budget
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RtbInputs {
    pub bitrate_gbps: f64,
    pub tx_rise_time_ns: f64,
    pub rx_rise_time_ns: f64,
    pub fiber_length_km: f64,
    pub dispersion_ns_per_km: f64,
}

/// Rise time budget result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RtbResult {
    pub dispersion_ns: f64,
    pub system_rise_time_ns: f64,
    pub allowed_rise_time_ns: f64,
    pub pass: bool,
}

/// Calculate the rise time budget. Fails on a non-positive bitrate.
pub fn calculate_rtb(input: &RtbInputs) -> Result<RtbResult> {
    // `!(x > 0)` also catches NaN
    if !(input.bitrate_gbps > 0.0) {
        return Err(BudgetError::InvalidInput {
            field: "bitrate_gbps",
            value: input.bitrate_gbps,
            reason: "bitrate must be greater than zero",
        });
    }

    let dispersion_ns = input.fiber_length_km * input.dispersion_ns_per_km;
    let system_rise_time_ns = input.tx_rise_time_ns + input.rx_rise_time_ns + dispersion_ns;
    let allowed_rise_time_ns = NRZ_RISE_FRACTION / input.bitrate_gbps * NS_PER_INVERSE_GBPS;

    Ok(RtbResult {
        dispersion_ns,
        system_rise_time_ns,
        allowed_rise_time_ns,
        pass: system_rise_time_ns <= allowed_rise_time_ns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_rise_time() {
        let res = calculate_rtb(&RtbInputs {
            bitrate_gbps: 2.5,
            tx_rise_time_ns: 0.2,
            rx_rise_time_ns: 0.2,
            fiber_length_km: 20.0,
            dispersion_ns_per_km: 0.01,
        })
        .unwrap();
        assert!((res.allowed_rise_time_ns - 280.0).abs() < 1e-9);
        assert!((res.dispersion_ns - 0.2).abs() < 1e-12);
        assert!((res.system_rise_time_ns - 0.6).abs() < 1e-12);
        assert!(res.pass);
    }

    #[test]
    fn test_dispersion_limited_link_fails() {
        let res = calculate_rtb(&RtbInputs {
            bitrate_gbps: 10.0,
            tx_rise_time_ns: 20.0,
            rx_rise_time_ns: 20.0,
            fiber_length_km: 40.0,
            dispersion_ns_per_km: 1.0,
        })
        .unwrap();
        assert!((res.allowed_rise_time_ns - 70.0).abs() < 1e-9);
        assert!(!res.pass);
    }

    #[test]
    fn test_equal_rise_time_passes() {
        let res = calculate_rtb(&RtbInputs {
            bitrate_gbps: 1.0,
            tx_rise_time_ns: 350.0,
            rx_rise_time_ns: 350.0,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(res.system_rise_time_ns, res.allowed_rise_time_ns);
        assert!(res.pass);
    }

    #[test]
    fn test_non_positive_bitrate_rejected() {
        for bitrate in [0.0, -2.5, f64::NAN] {
            let err = calculate_rtb(&RtbInputs {
                bitrate_gbps: bitrate,
                ..Default::default()
            })
            .unwrap_err();
            assert!(matches!(
                err,
                BudgetError::InvalidInput { field: "bitrate_gbps", .. }
            ));
        }
    }
}
