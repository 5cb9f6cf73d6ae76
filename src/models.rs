//! Data models for metric extraction.
//!
//! This module contains the values produced by the log parsers, the
//! per-repository [`MetricRecord`] and the fixed metric catalog that
//! determines the column set of the final table.

use serde::Serialize;
use std::fmt;

/// Column holding the repository name in the final table.
pub const REPO_COLUMN: &str = "Repo";

/// Metric names in table order, before any namespace prefix is applied.
pub const METRIC_CATALOG: [&str; 21] = [
    "Normal Total (s)",
    "Build Avg Cpu",
    "Build Max Cpu",
    "Build Median Cpu",
    "Build Avg Mem",
    "Build Max Mem",
    "Build Median Mem",
    "Analysis Total (s)",
    "Analysis Database (s)",
    "Analysis Query (s)",
    "Analysis Decode (s)",
    "Analysis Avg Cpu",
    "Analysis Max Cpu",
    "Analysis Median Cpu",
    "Analysis Avg Mem",
    "Analysis Max Mem",
    "Analysis Median Mem",
    "# Code Files",
    "# Code Lines",
    "# Result Processes",
    "# Result Dataflows",
];

pub const METRIC_COUNT: usize = METRIC_CATALOG.len();

/// Catalog column names with `prefix` applied, in table order.
pub fn catalog_columns(prefix: &str) -> Vec<String> {
    METRIC_CATALOG
        .iter()
        .map(|name| format!("{}{}", prefix, name))
        .collect()
}

/// A single metric value, explicitly distinguishing "absent" from zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    /// The input was absent or the pattern did not match.
    #[default]
    Missing,
    /// A real-valued measurement (seconds, percent, megabytes).
    Real(f64),
    /// An integer count (files, lines, rows).
    Count(u64),
}

impl MetricValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, MetricValue::Missing)
    }
}

impl From<Option<f64>> for MetricValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(MetricValue::Missing, MetricValue::Real)
    }
}

impl From<Option<u64>> for MetricValue {
    fn from(value: Option<u64>) -> Self {
        value.map_or(MetricValue::Missing, MetricValue::Count)
    }
}

/// Renders the table cell text. Missing values become an empty cell.
impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MetricValue::Missing => Ok(()),
            MetricValue::Real(v) if v.is_finite() && v.fract() == 0.0 => {
                write!(f, "{:.1}", v)
            }
            MetricValue::Real(v) => write!(f, "{}", v),
            MetricValue::Count(v) => write!(f, "{}", v),
        }
    }
}

/// One line of a resource-sampling log.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceSample {
    /// Seconds since sampling started.
    #[allow(dead_code)] // Not part of the summary statistics
    pub elapsed: Option<f64>,
    /// CPU utilization in percent.
    pub cpu_percent: f64,
    /// Resident memory in megabytes.
    pub memory_mb: f64,
}

/// Summary statistics over a resource-sampling log.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResourceSummary {
    pub avg_cpu: Option<f64>,
    pub max_cpu: Option<f64>,
    pub median_cpu: Option<f64>,
    pub avg_mem: Option<f64>,
    pub max_mem: Option<f64>,
    pub median_mem: Option<f64>,
}

impl ResourceSummary {
    /// Values in catalog order (avg, max, median for cpu, then memory).
    pub fn values(&self) -> [MetricValue; 6] {
        [
            self.avg_cpu.into(),
            self.max_cpu.into(),
            self.median_cpu.into(),
            self.avg_mem.into(),
            self.max_mem.into(),
            self.median_mem.into(),
        ]
    }
}

/// Phase durations of one static-analysis run, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnalysisTimings {
    pub total: Option<f64>,
    pub database: Option<f64>,
    pub query: Option<f64>,
    pub decode: Option<f64>,
}

/// Size counters for the language of interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodeCount {
    pub files: Option<u64>,
    pub lines: Option<u64>,
}

/// Cardinality summary of an analysis results table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResultCounts {
    /// Distinct non-empty values in the first column.
    pub distinct_keys: u64,
    /// Number of data rows (header excluded).
    pub rows: u64,
}

/// All metrics extracted for one repository.
///
/// Metrics are kept in insertion order, which the aggregator fills in
/// catalog order, so every record built from the same passes has the
/// same keys in the same order.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRecord {
    /// Repository identifier (the directory name).
    pub repo: String,
    metrics: Vec<(String, MetricValue)>,
}

impl MetricRecord {
    pub fn new(repo: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            metrics: Vec::with_capacity(METRIC_COUNT),
        }
    }

    /// Set a metric, replacing any earlier value for the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: MetricValue) {
        let name = name.into();
        match self.metrics.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.metrics.push((name, value)),
        }
    }

    /// Append all metrics of `other`, keeping this record's identifier.
    pub fn merge(&mut self, other: MetricRecord) {
        for (name, value) in other.metrics {
            self.insert(name, value);
        }
    }

    pub fn get(&self, name: &str) -> Option<MetricValue> {
        self.metrics
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| *value)
    }

    #[cfg(test)]
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.metrics.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    /// Number of metrics that carry a value.
    pub fn present_count(&self) -> usize {
        self.metrics.iter().filter(|(_, v)| !v.is_missing()).count()
    }
}
