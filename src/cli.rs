//! Command-line interface argument parsing.
//!
//! This module handles CLI argument parsing using clap, including
//! validation of the top-level directory.

use clap::Parser;
use std::path::PathBuf;

/// extract-metrics - consolidate build and analysis logs into one table
///
/// Every immediate subdirectory of TOP_DIRECTORY is treated as one
/// repository. Its build/ and measure/ logs, cloc.json summary and
/// results.csv table are reduced to a single row of the output table.
///
/// Examples:
///   extract-metrics ./runs
///   extract-metrics ./runs -o metrics.tsv
///   RUST_LOG=debug extract-metrics ./runs --output metrics.json
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Top-level folder containing one subfolder per repository
    #[arg(value_name = "TOP_DIRECTORY")]
    pub top_directory: PathBuf,

    /// Output file for the aggregated table
    ///
    /// Defaults to aggregated_metrics.csv, or the `output` value from
    /// .extract-metrics.toml. The extension picks the format: .csv, .tsv or .json.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if !self.top_directory.exists() {
            return Err(format!(
                "Top directory does not exist: {}",
                self.top_directory.display()
            ));
        }

        if !self.top_directory.is_dir() {
            return Err(format!(
                "Top directory is not a directory: {}",
                self.top_directory.display()
            ));
        }

        if let Some(ref output) = self.output {
            if output.as_os_str().is_empty() {
                return Err("Output path must not be empty".to_string());
            }
            if output.is_dir() {
                return Err(format!("Output path is a directory: {}", output.display()));
            }
        }

        Ok(())
    }
}
