//! Scenario-level summaries of computed links
//!
//! Pass/fail rates and margin distribution per scenario, the worst links
//! by margin, and how often each loss term dominates.

use crate::{LinkOutput, LpbStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Margin statistics for one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub scenario: String,
    pub n_links: usize,
    pub pass_rate: f64,
    pub fail_rate: f64,
    pub margin_mean_db: f64,
    pub margin_median_db: f64,
    pub margin_p05_db: f64,
    pub margin_p95_db: f64,
    pub margin_min_db: f64,
    pub margin_max_db: f64,
}

/// One row of the worst-margin table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorstLink {
    pub link_id: String,
    pub scenario: String,
    pub margin_db: f64,
    pub lpb_status: LpbStatus,
}

/// Occurrences of a name as the top loss contributor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorCount {
    pub contributor: String,
    pub links: usize,
}

/// Summarize records per scenario.
///
/// Ordered by fail rate (highest first), then mean margin (lowest first),
/// then scenario name.
pub fn summarize_by_scenario(records: &[LinkOutput]) -> Vec<ScenarioSummary> {
    let mut groups: BTreeMap<&str, Vec<&LinkOutput>> = BTreeMap::new();
    for record in records {
        groups.entry(record.scenario.as_str()).or_default().push(record);
    }

    let mut summaries: Vec<ScenarioSummary> = groups
        .into_iter()
        .map(|(scenario, group)| summarize_group(scenario, &group))
        .collect();

    summaries.sort_by(|a, b| {
        b.fail_rate
            .total_cmp(&a.fail_rate)
            .then(a.margin_mean_db.total_cmp(&b.margin_mean_db))
            .then_with(|| a.scenario.cmp(&b.scenario))
    });
    summaries
}

fn summarize_group(scenario: &str, group: &[&LinkOutput]) -> ScenarioSummary {
    let n = group.len();
    let passed = group
        .iter()
        .filter(|r| r.lpb_status == LpbStatus::Pass)
        .count();

    let mut margins: Vec<f64> = group.iter().map(|r| r.margin_db).collect();
    margins.sort_by(f64::total_cmp);

    let pass_rate = passed as f64 / n as f64;

    ScenarioSummary {
        scenario: scenario.to_string(),
        n_links: n,
        pass_rate,
        fail_rate: 1.0 - pass_rate,
        margin_mean_db: margins.iter().sum::<f64>() / n as f64,
        margin_median_db: quantile(&margins, 0.5),
        margin_p05_db: quantile(&margins, 0.05),
        margin_p95_db: quantile(&margins, 0.95),
        margin_min_db: margins[0],
        margin_max_db: margins[n - 1],
    }
}

/// Linear-interpolated quantile of ascending, non-empty data
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = (sorted.len() - 1) as f64 * q;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (pos - lo as f64) * (sorted[hi] - sorted[lo])
}

/// The `n` records with the lowest margin, lowest first
pub fn worst_links(records: &[LinkOutput], n: usize) -> Vec<WorstLink> {
    let mut ordered: Vec<&LinkOutput> = records.iter().collect();
    ordered.sort_by(|a, b| a.margin_db.total_cmp(&b.margin_db));

    ordered
        .into_iter()
        .take(n)
        .map(|r| WorstLink {
            link_id: r.link_id.clone(),
            scenario: r.scenario.clone(),
            margin_db: r.margin_db,
            lpb_status: r.lpb_status,
        })
        .collect()
}

/// Count first-ranked contributors, most frequent first
pub fn contributor_counts(records: &[LinkOutput]) -> Vec<ContributorCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        *counts.entry(record.top_contributor1.as_str()).or_default() += 1;
    }

    let mut ranked: Vec<ContributorCount> = counts
        .into_iter()
        .map(|(name, links)| ContributorCount {
            contributor: name.to_string(),
            links,
        })
        .collect();
    // BTreeMap already yields names in order; the stable sort keeps it for ties
    ranked.sort_by(|a, b| b.links.cmp(&a.links));
    ranked
}
