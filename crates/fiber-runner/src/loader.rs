//! Link table loading from CSV files

use crate::config::{CsvOptions, CsvSchema};
use crate::{Result, RowError, RunnerError};
use link_budget::LinkInput;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// Parsed links plus the rows that could not be parsed
#[derive(Debug, Clone, Default)]
pub struct LoadedLinks {
    pub links: Vec<LinkInput>,
    pub row_errors: Vec<RowError>,
}

/// Load a link table from a CSV file
pub fn load_links(path: impl AsRef<Path>, options: &CsvOptions) -> Result<LoadedLinks> {
    let path = path.as_ref();
    info!("Loading links from {:?}", path);

    let file = File::open(path)?;
    read_links(file, options)
}

/// Read a link table from any reader.
///
/// Missing required columns fail the whole read. Rows with the wrong
/// number of fields or an unparsable cell are reported in `row_errors`
/// and skipped.
pub fn read_links<R: Read>(reader: R, options: &CsvOptions) -> Result<LoadedLinks> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter_byte()?)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let columns = map_columns(&headers, &options.schema)?;

    let mut loaded = LoadedLinks::default();

    for (i, record) in csv_reader.records().enumerate() {
        let record = record?;
        if record.len() != headers.len() {
            let e = RowError::new(
                i + 1,
                "",
                format!("expected {} fields, found {}", headers.len(), record.len()),
            );
            warn!("Skipping {}", e);
            loaded.row_errors.push(e);
            continue;
        }

        let row = Row {
            record: &record,
            columns: &columns,
            index: i + 1,
            decimal_comma: options.decimal_comma,
        };
        match row.parse() {
            Ok(link) => loaded.links.push(link),
            Err(e) => {
                warn!("Skipping {}", e);
                loaded.row_errors.push(e);
            }
        }
    }

    info!(
        "Loaded {} links ({} rows rejected)",
        loaded.links.len(),
        loaded.row_errors.len()
    );

    Ok(loaded)
}

/// Header name → column index, with aliases folded onto canonical names
fn map_columns(headers: &csv::StringRecord, schema: &CsvSchema) -> Result<HashMap<String, usize>> {
    let mut columns: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_lowercase(), i))
        .collect();

    for (alias, canonical) in &schema.column_aliases {
        if !columns.contains_key(canonical) {
            if let Some(&idx) = columns.get(alias) {
                columns.insert(canonical.clone(), idx);
            }
        }
    }

    let missing: Vec<RowError> = schema
        .required_columns
        .iter()
        .filter(|c| !columns.contains_key(c.as_str()))
        .map(|c| RowError::new(0, c.as_str(), "missing required column"))
        .collect();

    if missing.is_empty() {
        Ok(columns)
    } else {
        Err(RunnerError::Schema(missing))
    }
}

struct Row<'a> {
    record: &'a csv::StringRecord,
    columns: &'a HashMap<String, usize>,
    index: usize,
    decimal_comma: bool,
}

impl Row<'_> {
    fn cell(&self, name: &str) -> &str {
        self.columns
            .get(name)
            .and_then(|&i| self.record.get(i))
            .unwrap_or("")
            .trim()
    }

    /// Empty cells read as zero
    fn float(&self, name: &str) -> std::result::Result<f64, RowError> {
        let raw = self.cell(name);
        if raw.is_empty() {
            return Ok(0.0);
        }
        let parsed = if self.decimal_comma {
            raw.replace(',', ".").parse::<f64>()
        } else {
            raw.parse::<f64>()
        };
        parsed.map_err(|_| RowError::new(self.index, name, "not a number"))
    }

    fn count(&self, name: &str) -> std::result::Result<u32, RowError> {
        let raw = self.cell(name);
        if raw.is_empty() {
            return Ok(0);
        }
        let value: i64 = raw
            .parse()
            .map_err(|_| RowError::new(self.index, name, "not an integer value"))?;
        u32::try_from(value).map_err(|_| RowError::new(self.index, name, "must be zero or greater"))
    }

    fn parse(&self) -> std::result::Result<LinkInput, RowError> {
        Ok(LinkInput {
            link_id: self.cell("link_id").to_string(),
            scenario: self.cell("scenario").to_string(),
            tx_power_dbm: self.float("tx_power_dbm")?,
            rx_sensitivity_dbm: self.float("rx_sensitivity_dbm")?,
            system_margin_db: self.float("system_margin_db")?,
            fiber_length_km: self.float("fiber_length_km")?,
            fiber_att_db_per_km: self.float("fiber_att_db_per_km")?,
            n_splice: self.count("n_splice")?,
            splice_loss_db: self.float("splice_loss_db")?,
            n_connector: self.count("n_connector")?,
            connector_loss_db: self.float("connector_loss_db")?,
            splitter_loss_db: self.float("splitter_loss_db")?,
            other_loss_db: self.float("other_loss_db")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "link_id,scenario,tx_power_dbm,rx_sensitivity_dbm,system_margin_db,\
fiber_length_km,fiber_att_db_per_km,n_splice,splice_loss_db,n_connector,connector_loss_db,\
splitter_loss_db,other_loss_db";

    #[test]
    fn test_load_links() {
        let csv = format!(
            "{}\nlink_00001,base,0,-28,3,10,0.35,2,0.1,4,0.3,7,0.5\nlink_00002,base,2,-27,3,5,0.3,,,2,0.5,3.5,\n",
            HEADER
        );

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(csv.as_bytes()).unwrap();

        let loaded = load_links(file.path(), &CsvOptions::default()).unwrap();
        assert!(loaded.row_errors.is_empty());
        assert_eq!(loaded.links.len(), 2);

        let first = &loaded.links[0];
        assert_eq!(first.link_id, "link_00001");
        assert_eq!(first.n_splice, 2);
        assert_eq!(first.n_connector, 4);
        assert_eq!(first.other_loss_db, 0.5);

        // Empty cells read as zero
        let second = &loaded.links[1];
        assert_eq!(second.n_splice, 0);
        assert_eq!(second.splice_loss_db, 0.0);
        assert_eq!(second.other_loss_db, 0.0);
    }

    #[test]
    fn test_header_normalized_and_aliased() {
        let csv = " LINK_ID ,Scenario,tx_power_dbm,rx_sensitivity_dbm,engineering_margin_db,\
fiber_length_km,fiber_att_db_per_km,n_splice,splice_loss_db,n_connector,connector_loss_db,\
splitter_loss_db,other_loss_db\nL1,base,0,-28,4.5,10,0.35,2,0.1,4,0.3,7,0\n";

        let loaded = read_links(csv.as_bytes(), &CsvOptions::default()).unwrap();
        assert_eq!(loaded.links[0].link_id, "L1");
        assert_eq!(loaded.links[0].system_margin_db, 4.5);
    }

    #[test]
    fn test_missing_columns_fail_schema() {
        let csv = "link_id,scenario,tx_power_dbm\nL1,base,0\n";
        match read_links(csv.as_bytes(), &CsvOptions::default()) {
            Err(RunnerError::Schema(missing)) => {
                assert_eq!(missing.len(), 10);
                assert!(missing.iter().all(|e| e.row == 0));
                assert_eq!(missing[0].field, "rx_sensitivity_dbm");
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_rows_reported_and_skipped() {
        let csv = format!(
            "{}\nL1,base,zero,-28,3,10,0.35,2,0.1,4,0.3,7,0\nL2,base,0,-28,3,10,0.35,1.5,0.1,4,0.3,7,0\n\
L3,base,0,-28,3,10,0.35,-2,0.1,4,0.3,7,0\nL4,base,0,-28,3,10,0.35,2,0.1,4,0.3,7,0\n",
            HEADER
        );

        let loaded = read_links(csv.as_bytes(), &CsvOptions::default()).unwrap();
        assert_eq!(loaded.links.len(), 1);
        assert_eq!(loaded.links[0].link_id, "L4");
        assert_eq!(
            loaded.row_errors,
            vec![
                RowError::new(1, "tx_power_dbm", "not a number"),
                RowError::new(2, "n_splice", "not an integer value"),
                RowError::new(3, "n_splice", "must be zero or greater"),
            ]
        );
    }

    #[test]
    fn test_truncated_and_overlong_rows_rejected() {
        let csv = format!(
            "{}\nL1,base,0,-28,3,10,0.35\nL2,base,0,-28,3,10,0.35,2,0.1,4,0.3,7,0,9\n\
L3,base,0,-28,3,10,0.35,2,0.1,4,0.3,7,0\n",
            HEADER
        );

        let loaded = read_links(csv.as_bytes(), &CsvOptions::default()).unwrap();
        assert_eq!(loaded.links.len(), 1);
        assert_eq!(loaded.links[0].link_id, "L3");
        assert_eq!(
            loaded.row_errors,
            vec![
                RowError::new(1, "", "expected 13 fields, found 7"),
                RowError::new(2, "", "expected 13 fields, found 14"),
            ]
        );
    }

    #[test]
    fn test_semicolon_with_decimal_comma() {
        let csv = format!(
            "{}\nL1;base;0;-28;3;12,5;0,35;2;0,1;4;0,3;7;0\n",
            HEADER.replace(',', ";")
        );
        let options = CsvOptions {
            delimiter: ';',
            decimal_comma: true,
            ..Default::default()
        };

        let loaded = read_links(csv.as_bytes(), &options).unwrap();
        assert!(loaded.row_errors.is_empty());
        assert_eq!(loaded.links[0].fiber_length_km, 12.5);
        assert_eq!(loaded.links[0].fiber_att_db_per_km, 0.35);
    }

    #[test]
    fn test_custom_schema() {
        let csv = "link_id,scenario\nL1,base\n";
        let mut options = CsvOptions::default();
        options.schema.required_columns = vec!["link_id".to_string()];

        let loaded = read_links(csv.as_bytes(), &options).unwrap();
        assert_eq!(loaded.links.len(), 1);
        assert_eq!(loaded.links[0].fiber_length_km, 0.0);
    }
}
