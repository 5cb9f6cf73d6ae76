//! Batch driver.
//!
//! Runs the aggregator over every repository under the top-level
//! directory, one at a time. A failing pass is reported and its columns are
//! left missing; a repository where every pass fails is left out of the
//! table. Neither aborts the rest of the batch.

use crate::analysis::{Aggregator, PassFailure};
use crate::error::MetricsError;
use crate::report::{write_table, MetricsTable};
use crate::scanner::{RepoDir, RepoScanner};
use anyhow::Result;
use std::path::Path;
use tracing::{debug, info, warn};

/// A pass that could not be aggregated for one repository.
#[derive(Debug)]
pub struct RepoFailure {
    pub repo: String,
    /// Column prefix of the failed pass.
    pub pass: String,
    pub error: MetricsError,
    /// Whether the repository was left out of the table.
    pub skipped: bool,
}

/// Result of a batch run.
#[derive(Debug)]
pub struct BatchOutcome {
    pub table: MetricsTable,
    pub failures: Vec<RepoFailure>,
}

impl BatchOutcome {
    pub fn processed(&self) -> usize {
        self.table.len()
    }

    /// Number of repositories left out of the table.
    pub fn skipped(&self) -> usize {
        let mut repos: Vec<&str> = self
            .failures
            .iter()
            .filter(|f| f.skipped)
            .map(|f| f.repo.as_str())
            .collect();
        repos.dedup();
        repos.len()
    }
}

fn record_failures(
    failures: &mut Vec<RepoFailure>,
    repo: &str,
    failed: Vec<PassFailure>,
    skipped: bool,
) {
    for PassFailure { prefix, error } in failed {
        failures.push(RepoFailure {
            repo: repo.to_string(),
            pass: prefix,
            error,
            skipped,
        });
    }
}

/// Aggregate every repository in `repos`, in order.
pub fn process_repositories(repos: &[RepoDir], aggregator: &Aggregator) -> BatchOutcome {
    let mut table = MetricsTable::new(aggregator.columns());
    let mut failures = Vec::new();

    for repo in repos {
        info!(repo = %repo.name, "processing repository");

        match aggregator.aggregate(&repo.path) {
            Ok(aggregation) => {
                let record = aggregation.record;
                debug!(
                    repo = %repo.name,
                    present = record.present_count(),
                    columns = record.len(),
                    "aggregated repository"
                );
                for failure in &aggregation.failed_passes {
                    warn!(
                        repo = %repo.name,
                        pass = %failure.prefix,
                        error = %failure.error,
                        "pass failed, columns left missing"
                    );
                }
                record_failures(&mut failures, &repo.name, aggregation.failed_passes, false);
                table.push(record);
            }
            Err(failed) => {
                for failure in &failed {
                    warn!(
                        repo = %repo.name,
                        pass = %failure.prefix,
                        error = %failure.error,
                        "skipping repository"
                    );
                }
                record_failures(&mut failures, &repo.name, failed, true);
            }
        }
    }

    BatchOutcome { table, failures }
}

/// Scan `top_dir`, aggregate every repository and write the table to `output`.
///
/// Only batch-level problems (unreadable top directory, unwritable output)
/// are returned as errors.
pub fn run_batch(top_dir: &Path, output: &Path, aggregator: &Aggregator) -> Result<BatchOutcome> {
    let repos = RepoScanner::new(top_dir.to_path_buf()).scan()?;
    info!(count = repos.len(), top_dir = %top_dir.display(), "found repositories");

    let outcome = process_repositories(&repos, aggregator);
    write_table(&outcome.table, output)?;

    Ok(outcome)
}
