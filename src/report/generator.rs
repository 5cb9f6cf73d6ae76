//! Metrics table generation.
//!
//! This module assembles metric records into a table with a fixed column
//! order and renders it as CSV, TSV or JSON.

use crate::models::{MetricRecord, MetricValue, REPO_COLUMN};
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::path::Path;

/// Output format, chosen from the output file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableFormat {
    /// Comma-separated values (default)
    #[default]
    Csv,
    /// Tab-separated values
    Tsv,
    /// JSON array of row objects
    Json,
}

impl TableFormat {
    /// Pick a format from the extension of `path`.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("tsv") => TableFormat::Tsv,
            Some("json") => TableFormat::Json,
            _ => TableFormat::Csv,
        }
    }
}

/// Records indexed by repository, with one uniform column set.
#[derive(Debug, Clone, Default)]
pub struct MetricsTable {
    columns: Vec<String>,
    rows: Vec<MetricRecord>,
}

impl MetricsTable {
    /// Create an empty table with the given metric columns.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, record: MetricRecord) {
        self.rows.push(record);
    }

    #[cfg(test)]
    pub fn rows(&self) -> &[MetricRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Values of `record` in column order. Keys outside the column set are
    /// dropped and absent columns read as missing, so every row renders the
    /// same shape.
    fn row_values<'a>(
        &'a self,
        record: &'a MetricRecord,
    ) -> impl Iterator<Item = MetricValue> + 'a {
        self.columns
            .iter()
            .map(move |column| record.get(column).unwrap_or_default())
    }
}

/// Render the table in `format`.
pub fn generate_table(table: &MetricsTable, format: TableFormat) -> Result<Vec<u8>> {
    match format {
        TableFormat::Csv => generate_delimited(table, b','),
        TableFormat::Tsv => generate_delimited(table, b'\t'),
        TableFormat::Json => generate_json(table).map(String::into_bytes),
    }
}

/// Render a delimited table: header row, then one row per repository.
pub fn generate_delimited(table: &MetricsTable, delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    let header = std::iter::once(REPO_COLUMN).chain(table.columns.iter().map(String::as_str));
    writer.write_record(header)?;

    for record in &table.rows {
        let cells = std::iter::once(record.repo.clone())
            .chain(table.row_values(record).map(|value| value.to_string()));
        writer.write_record(cells)?;
    }

    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush table: {}", e.error()))
}

/// Render a JSON array of row objects, keys in column order.
pub fn generate_json(table: &MetricsTable) -> Result<String> {
    let rows: Vec<Value> = table
        .rows
        .iter()
        .map(|record| -> Result<Value> {
            let mut row = Map::new();
            row.insert(REPO_COLUMN.to_string(), Value::String(record.repo.clone()));
            for (column, value) in table.columns.iter().zip(table.row_values(record)) {
                row.insert(column.clone(), serde_json::to_value(value)?);
            }
            Ok(Value::Object(row))
        })
        .collect::<Result<_>>()?;

    let mut json = serde_json::to_string_pretty(&rows)?;
    json.push('\n');
    Ok(json)
}

/// Write the table to `path`, in the format its extension selects.
pub fn write_table(table: &MetricsTable, path: &Path) -> Result<()> {
    let content = generate_table(table, TableFormat::from_path(path))?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write metrics table to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog_columns;

    fn create_test_table() -> MetricsTable {
        let mut table = MetricsTable::new(vec![
            "Normal Total (s)".to_string(),
            "# Code Files".to_string(),
        ]);

        let mut alpha = MetricRecord::new("alpha");
        alpha.insert("Normal Total (s)", MetricValue::Real(12.5));
        alpha.insert("# Code Files", MetricValue::Count(10));
        table.push(alpha);

        let mut beta = MetricRecord::new("beta");
        beta.insert("Normal Total (s)", MetricValue::Missing);
        beta.insert("# Code Files", MetricValue::Count(3));
        table.push(beta);

        table
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(TableFormat::from_path(Path::new("out.csv")), TableFormat::Csv);
        assert_eq!(TableFormat::from_path(Path::new("out.TSV")), TableFormat::Tsv);
        assert_eq!(TableFormat::from_path(Path::new("out.json")), TableFormat::Json);
        assert_eq!(TableFormat::from_path(Path::new("out")), TableFormat::Csv);
    }

    #[test]
    fn test_generate_csv() {
        let csv =
            String::from_utf8(generate_delimited(&create_test_table(), b',').unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Repo,Normal Total (s),# Code Files");
        assert_eq!(lines[1], "alpha,12.5,10");
        assert_eq!(lines[2], "beta,,3");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_generate_tsv() {
        let tsv =
            String::from_utf8(generate_table(&create_test_table(), TableFormat::Tsv).unwrap())
                .unwrap();
        assert!(tsv.starts_with("Repo\tNormal Total (s)\t# Code Files"));
        assert!(tsv.contains("beta\t\t3"));
    }

    #[test]
    fn test_generate_json() {
        let json = generate_json(&create_test_table()).unwrap();
        let parsed: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed[0]["Repo"], "alpha");
        assert_eq!(parsed[0]["Normal Total (s)"], 12.5);
        assert!(parsed[1]["Normal Total (s)"].is_null());
        assert_eq!(parsed[1]["# Code Files"], 3);
        assert!(json.find("\"Repo\"").unwrap() < json.find("\"Normal Total (s)\"").unwrap());
    }

    #[test]
    fn test_rows_share_column_set() {
        let mut table = MetricsTable::new(catalog_columns(""));
        let mut partial = MetricRecord::new("partial");
        partial.insert("Build Max Cpu", MetricValue::Real(99.0));
        table.push(partial);
        table.push(MetricRecord::new("bare"));

        let csv = String::from_utf8(generate_delimited(&table, b',').unwrap()).unwrap();
        let widths: Vec<usize> = csv.lines().map(|l| l.split(',').count()).collect();
        assert_eq!(widths, vec![22, 22, 22]);
    }

    #[test]
    fn test_empty_table_has_header() {
        let table = MetricsTable::new(catalog_columns("V2_"));
        let csv = String::from_utf8(generate_delimited(&table, b',').unwrap()).unwrap();
        assert_eq!(csv.lines().count(), 1);
        assert!(csv.starts_with("Repo,V2_Normal Total (s)"));
    }

    #[test]
    fn test_write_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.csv");
        write_table(&create_test_table(), &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("alpha,12.5,10"));
    }
}
