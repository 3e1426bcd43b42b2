//! JSON analysis report over a result table

use crate::Result;
use link_budget::summary::{
    contributor_counts, summarize_by_scenario, worst_links, ContributorCount, ScenarioSummary,
    WorstLink,
};
use link_budget::{LinkOutput, LpbStatus};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Default length of the worst-margin table
pub const DEFAULT_WORST_N: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub metadata: ReportMetadata,
    pub scenarios: Vec<ScenarioSummary>,
    pub worst_links: Vec<WorstLink>,
    pub top_contributors: Vec<ContributorCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub source: String,
    pub total_records: usize,
    pub total_pass: usize,
    pub total_fail: usize,
    pub generated_at: String,
}

impl AnalysisReport {
    pub fn build(source: &str, records: &[LinkOutput], worst_n: usize) -> Self {
        let total_pass = records
            .iter()
            .filter(|r| r.lpb_status == LpbStatus::Pass)
            .count();

        Self {
            metadata: ReportMetadata {
                source: source.to_string(),
                total_records: records.len(),
                total_pass,
                total_fail: records.len() - total_pass,
                generated_at: chrono::Utc::now().to_rfc3339(),
            },
            scenarios: summarize_by_scenario(records),
            worst_links: worst_links(records, worst_n),
            top_contributors: contributor_counts(records),
        }
    }

    /// Write as pretty-printed JSON
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        info!("Writing analysis report to {:?}", path);

        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}
