//! Error types for log parsing and repository aggregation.
//!
//! Parsers never swallow failures: anything that goes wrong while reading
//! an existing input file surfaces as a [`MetricsError`] and travels up to
//! the batch driver, which isolates it to a single repository.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while extracting metrics from one repository.
#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid table in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("expected a JSON object at the top level of {}", .path.display())]
    NotAnObject { path: PathBuf },

    #[error("required input is missing: {}", .path.display())]
    MissingInput { path: PathBuf },
}

impl MetricsError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, MetricsError>;
