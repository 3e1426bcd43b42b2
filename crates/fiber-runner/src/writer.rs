//! Result table output (and read-back for summaries)

use crate::Result;
use link_budget::{LinkOutput, OUTPUT_COLUMNS};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

/// Decimal places for every float column
const FLOAT_PRECISION: usize = 6;

/// Write results to a CSV file, creating or truncating it
pub fn write_results(path: impl AsRef<Path>, results: &[LinkOutput], delimiter: u8) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_results_to(file, results, delimiter)?;

    info!("Wrote {} results to {:?}", results.len(), path);
    Ok(())
}

/// Write results to any writer, header first
pub fn write_results_to<W: Write>(writer: W, results: &[LinkOutput], delimiter: u8) -> Result<()> {
    let mut csv_wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    csv_wtr.write_record(OUTPUT_COLUMNS)?;

    let float = |x: f64| format!("{:.*}", FLOAT_PRECISION, x);
    for res in results {
        csv_wtr.write_record([
            res.link_id.clone(),
            res.scenario.clone(),
            float(res.fiber_loss_db),
            float(res.splice_total_db),
            float(res.connector_total_db),
            float(res.total_loss_db),
            float(res.rx_power_dbm),
            float(res.margin_db),
            res.lpb_status.to_string(),
            float(res.system_rise_time_ns),
            float(res.allowed_rise_time_ns),
            res.rtb_status.to_string(),
            res.top_contributor1.clone(),
            res.top_contributor2.clone(),
            res.top_contributor3.clone(),
        ])?;
    }

    csv_wtr.flush()?;
    Ok(())
}

/// Read a result table written by [`write_results`]
pub fn read_results(path: impl AsRef<Path>, delimiter: u8) -> Result<Vec<LinkOutput>> {
    let path = path.as_ref();
    info!("Reading results from {:?}", path);

    let file = File::open(path)?;
    read_results_from(file, delimiter)
}

pub fn read_results_from<R: Read>(reader: R, delimiter: u8) -> Result<Vec<LinkOutput>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let results = csv_reader
        .deserialize::<LinkOutput>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(results)
}
