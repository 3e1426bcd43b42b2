//! Parameter sweeps
//!
//! Enumerates the cartesian product of variation axes and evaluates every
//! base link under every combination. Order is fixed: the first axis is the
//! outermost loop, values are taken in the order given, and links in input
//! order within each combination.

use crate::calculator::compute_link;
use crate::variation::{Variation, VariationField};
use crate::{BudgetError, LinkInput, LinkOutput, Result, RunnerOptions};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Scenario label prefix shared by every swept record
pub const BASE_SCENARIO: &str = "base";

// ============================================================================
// Combination enumeration
// ============================================================================

/// Lazy iterator over every value combination of a set of axes.
///
/// Implemented as a multi-radix counter whose last digit turns fastest.
/// Cloning before the first `next` gives an independent restart.
#[derive(Debug, Clone)]
pub struct Combinations<'a> {
    axes: &'a [Variation],
    cursor: Vec<usize>,
    exhausted: bool,
}

impl<'a> Combinations<'a> {
    pub fn new(axes: &'a [Variation]) -> Self {
        Self {
            axes,
            cursor: vec![0; axes.len()],
            exhausted: axes.iter().any(|axis| axis.values.is_empty()),
        }
    }
}

impl Iterator for Combinations<'_> {
    type Item = Vec<f64>;

    fn next(&mut self) -> Option<Vec<f64>> {
        if self.exhausted {
            return None;
        }

        let current = self
            .axes
            .iter()
            .zip(&self.cursor)
            .map(|(axis, &i)| axis.values[i])
            .collect();

        // Carry from the last digit; wrapping past the first ends the run
        self.exhausted = true;
        for (digit, axis) in self.cursor.iter_mut().zip(self.axes).rev() {
            *digit += 1;
            if *digit < axis.values.len() {
                self.exhausted = false;
                break;
            }
            *digit = 0;
        }

        Some(current)
    }
}

/// Number of combinations the axes produce, `None` on overflow.
///
/// Zero axes is a single empty combination.
pub fn combination_count(axes: &[Variation]) -> Option<usize> {
    axes.iter()
        .try_fold(1usize, |acc, axis| acc.checked_mul(axis.values.len()))
}

/// `base_<field>=<value:.2>` for every axis, in axis order
pub fn scenario_label(axes: &[Variation], values: &[f64]) -> String {
    let mut label = String::from(BASE_SCENARIO);
    for (axis, value) in axes.iter().zip(values) {
        label.push_str(&format!("_{}={:.2}", axis.field, value));
    }
    label
}

// ============================================================================
// Sweep execution
// ============================================================================

/// A (link, combination) pair dropped from the results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedLink {
    pub link_id: String,
    pub scenario: String,
    pub reason: String,
}

/// Records produced by a sweep plus the pairs that failed to compute
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepOutcome {
    pub records: Vec<LinkOutput>,
    pub skipped: Vec<SkippedLink>,
}

impl SweepOutcome {
    pub fn skip_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Run a full sweep.
///
/// Every axis is checked before enumeration starts: an empty value list is
/// [`BudgetError::MalformedSpec`] and an unsupported field name is
/// [`BudgetError::UnknownField`]; both abort the whole sweep with no output.
/// A single link failing under one combination is recorded as a skip and
/// the sweep continues.
pub fn run_sweep(
    base: &[LinkInput],
    axes: &[Variation],
    options: &RunnerOptions,
) -> Result<SweepOutcome> {
    let targets = resolve_axes(axes)?;

    info!(
        "Sweeping {} links over {} axes ({} combinations)",
        base.len(),
        axes.len(),
        combination_count(axes).map_or_else(|| "overflowing".to_string(), |n| n.to_string())
    );

    let mut outcome = SweepOutcome::default();

    for values in Combinations::new(axes) {
        let scenario = scenario_label(axes, &values);
        debug!(scenario = %scenario, "evaluating combination");

        for link in base {
            let mut working = link.clone();
            working.scenario = scenario.clone();
            for (field, &value) in targets.iter().zip(&values) {
                field.apply(&mut working, value);
            }

            match compute_link(&working, options) {
                Ok(record) => outcome.records.push(record),
                Err(err) => {
                    warn!(link_id = %link.link_id, scenario = %scenario, "skipped: {}", err);
                    outcome.skipped.push(SkippedLink {
                        link_id: link.link_id.clone(),
                        scenario: scenario.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }
    }

    info!(
        "Sweep produced {} records ({} skipped)",
        outcome.records.len(),
        outcome.skip_count()
    );

    Ok(outcome)
}

fn resolve_axes(axes: &[Variation]) -> Result<Vec<VariationField>> {
    axes.iter()
        .map(|axis| {
            if axis.values.is_empty() {
                return Err(BudgetError::MalformedSpec {
                    spec: axis.field.clone(),
                    reason: "no values given".to_string(),
                });
            }
            axis.target()
        })
        .collect()
}


// ============================================================================
// Property-based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::fixtures::reference_link;
    use proptest::prelude::*;

    fn axis_strategy() -> impl Strategy<Value = Variation> {
        (
            prop::sample::select(vec![
                "system_margin_db",
                "fiber_length_km",
                "fiber_att_db_per_km",
                "splitter_loss_db",
            ]),
            prop::collection::vec(0.01f64..50.0, 1..4),
        )
            .prop_map(|(field, values)| Variation {
                field: field.to_string(),
                values,
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        // Output size is the axis product times the link count
        #[test]
        fn fuzz_sweep_cardinality(
            axes in prop::collection::vec(axis_strategy(), 0..4),
            n_links in 1usize..4,
        ) {
            let base: Vec<LinkInput> = (0..n_links)
                .map(|i| LinkInput { link_id: format!("L{}", i), ..reference_link() })
                .collect();
            let outcome = run_sweep(&base, &axes, &RunnerOptions::default()).unwrap();
            let expected = combination_count(&axes).unwrap() * n_links;
            prop_assert_eq!(outcome.records.len() + outcome.skip_count(), expected);
            prop_assert_eq!(outcome.skip_count(), 0);
            prop_assert_eq!(Combinations::new(&axes).count(), combination_count(&axes).unwrap());
        }
    }
}
