//! Results table parsing: distinct processes and total dataflows.

use crate::error::{MetricsError, Result};
use crate::models::ResultCounts;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

/// Parse a comma-separated results table with a header row.
///
/// The first column is the grouping key. An empty or header-only table
/// yields zero counts rather than missing values.
pub fn parse_results(path: &Path) -> Result<ResultCounts> {
    let file = std::fs::File::open(path).map_err(|e| MetricsError::io(path, e))?;
    count_rows(file).map_err(|source| MetricsError::Csv {
        path: path.to_path_buf(),
        source,
    })
}

/// Count rows and distinct first-column keys from any reader.
pub fn count_rows<R: Read>(reader: R) -> std::result::Result<ResultCounts, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut keys: HashSet<String> = HashSet::new();
    let mut rows = 0u64;

    for record in reader.records() {
        let record = record?;
        if is_blank(&record) {
            continue;
        }
        rows += 1;

        if let Some(key) = record.get(0).filter(|k| !k.is_empty()) {
            if !keys.contains(key) {
                keys.insert(key.to_string());
            }
        }
    }

    Ok(ResultCounts {
        distinct_keys: keys.len() as u64,
        rows,
    })
}

fn is_blank(record: &csv::StringRecord) -> bool {
    record.iter().all(str::is_empty) && record.len() <= 1
}
