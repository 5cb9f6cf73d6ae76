//! Repository aggregation.
//!
//! An [`Aggregator`] turns one repository directory into one
//! [`MetricRecord`] by running every configured [`AggregationPass`] against
//! the conventional layout:
//!
//! ```text
//! <repo>/
//!   build/output.log      build/psrecord.log
//!   measure/output.log    measure/psrecord.log    measure/cloc.json
//!   results.csv
//! ```
//!
//! Absent optional inputs become missing values. Absent required inputs and
//! any existing input that fails to parse fail the pass. A failed pass leaves
//! its columns missing; the repository only fails when every pass does.

use crate::config::{Config, LayoutConfig, PassConfig, PolicyPreset};
use crate::error::{MetricsError, Result};
use crate::models::{catalog_columns, MetricRecord, MetricValue, METRIC_CATALOG};
use crate::parsers;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The six per-repository inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Input {
    BuildLog,
    BuildSampling,
    AnalysisLog,
    AnalysisSampling,
    CodeCount,
    ResultsTable,
}

impl Input {
    pub const ALL: [Input; 6] = [
        Input::BuildLog,
        Input::BuildSampling,
        Input::AnalysisLog,
        Input::AnalysisSampling,
        Input::CodeCount,
        Input::ResultsTable,
    ];

    /// Number of catalog columns this input feeds.
    pub fn width(&self) -> usize {
        match self {
            Input::BuildLog => 1,
            Input::BuildSampling | Input::AnalysisSampling => 6,
            Input::AnalysisLog => 4,
            Input::CodeCount | Input::ResultsTable => 2,
        }
    }

    fn index(&self) -> usize {
        match self {
            Input::BuildLog => 0,
            Input::BuildSampling => 1,
            Input::AnalysisLog => 2,
            Input::AnalysisSampling => 3,
            Input::CodeCount => 4,
            Input::ResultsTable => 5,
        }
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::BuildLog => write!(f, "build log"),
            Input::BuildSampling => write!(f, "build sampling log"),
            Input::AnalysisLog => write!(f, "analysis log"),
            Input::AnalysisSampling => write!(f, "analysis sampling log"),
            Input::CodeCount => write!(f, "code-count summary"),
            Input::ResultsTable => write!(f, "results table"),
        }
    }
}

/// Which inputs must exist for a pass to succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputPolicy {
    required: [bool; 6],
}

impl InputPolicy {
    /// Every input optional.
    pub fn permissive() -> Self {
        Self {
            required: [false; 6],
        }
    }

    /// Build log, build sampling log and code-count summary required.
    pub fn strict() -> Self {
        Self::permissive()
            .require(Input::BuildLog)
            .require(Input::BuildSampling)
            .require(Input::CodeCount)
    }

    pub fn require(mut self, input: Input) -> Self {
        self.required[input.index()] = true;
        self
    }

    pub fn is_required(&self, input: Input) -> bool {
        self.required[input.index()]
    }
}

impl From<PolicyPreset> for InputPolicy {
    fn from(preset: PolicyPreset) -> Self {
        match preset {
            PolicyPreset::Permissive => InputPolicy::permissive(),
            PolicyPreset::Strict => InputPolicy::strict(),
        }
    }
}

/// One aggregation pass: a column prefix and an input policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationPass {
    pub prefix: String,
    pub policy: InputPolicy,
}

impl From<&PassConfig> for AggregationPass {
    fn from(config: &PassConfig) -> Self {
        Self {
            prefix: config.prefix.clone(),
            policy: config.policy.into(),
        }
    }
}

/// A pass that failed for one repository.
#[derive(Debug)]
pub struct PassFailure {
    pub prefix: String,
    pub error: MetricsError,
}

/// Merged record of the passes that succeeded, plus the ones that did not.
#[derive(Debug)]
pub struct Aggregation {
    pub record: MetricRecord,
    pub failed_passes: Vec<PassFailure>,
}

/// Builds metric records for repository directories.
#[derive(Debug, Clone)]
pub struct Aggregator {
    layout: LayoutConfig,
    language: String,
    passes: Vec<AggregationPass>,
}

impl Aggregator {
    pub fn new(layout: LayoutConfig, language: String, passes: Vec<AggregationPass>) -> Self {
        Self {
            layout,
            language,
            passes,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.layout.clone(),
            config.code_count.language.clone(),
            config.passes.iter().map(AggregationPass::from).collect(),
        )
    }

    /// Column names every record from this aggregator carries, in order.
    pub fn columns(&self) -> Vec<String> {
        self.passes
            .iter()
            .flat_map(|pass| catalog_columns(&pass.prefix))
            .collect()
    }

    /// Location of `input` inside `repo`.
    pub fn input_path(&self, repo: &Path, input: Input) -> PathBuf {
        let layout = &self.layout;
        match input {
            Input::BuildLog => repo.join(&layout.build_dir).join(&layout.output_log),
            Input::BuildSampling => repo.join(&layout.build_dir).join(&layout.psrecord_log),
            Input::AnalysisLog => repo.join(&layout.measure_dir).join(&layout.output_log),
            Input::AnalysisSampling => repo.join(&layout.measure_dir).join(&layout.psrecord_log),
            Input::CodeCount => repo.join(&layout.measure_dir).join(&layout.cloc_json),
            Input::ResultsTable => repo.join(&layout.results_csv),
        }
    }

    /// Run every pass against `repo` and merge the results into one record.
    ///
    /// Returns `Err` with the failures when no pass succeeded.
    pub fn aggregate(
        &self,
        repo: &Path,
    ) -> std::result::Result<Aggregation, Vec<PassFailure>> {
        let mut record = MetricRecord::new(repo_name(repo));
        let mut failed_passes = Vec::new();

        for pass in &self.passes {
            match self.aggregate_pass(repo, pass) {
                Ok(pass_record) => record.merge(pass_record),
                Err(error) => {
                    debug!(prefix = %pass.prefix, error = %error, "pass failed");
                    for column in catalog_columns(&pass.prefix) {
                        record.insert(column, MetricValue::Missing);
                    }
                    failed_passes.push(PassFailure {
                        prefix: pass.prefix.clone(),
                        error,
                    });
                }
            }
        }

        if !failed_passes.is_empty() && failed_passes.len() == self.passes.len() {
            return Err(failed_passes);
        }
        Ok(Aggregation {
            record,
            failed_passes,
        })
    }

    /// Build the record for a single pass.
    pub fn aggregate_pass(&self, repo: &Path, pass: &AggregationPass) -> Result<MetricRecord> {
        let mut values: Vec<MetricValue> = Vec::with_capacity(METRIC_CATALOG.len());

        for input in Input::ALL {
            match self.resolve(repo, input, &pass.policy)? {
                Some(path) => values.extend(self.extract(&path, input)?),
                None => {
                    values.extend(std::iter::repeat(MetricValue::Missing).take(input.width()))
                }
            }
        }

        let mut record = MetricRecord::new(repo_name(repo));
        for (name, value) in catalog_columns(&pass.prefix).into_iter().zip(values) {
            record.insert(name, value);
        }
        Ok(record)
    }

    /// `Some(path)` when the input exists, `None` when it is optional and absent.
    fn resolve(
        &self,
        repo: &Path,
        input: Input,
        policy: &InputPolicy,
    ) -> Result<Option<PathBuf>> {
        let path = self.input_path(repo, input);
        if path.exists() {
            return Ok(Some(path));
        }

        if policy.is_required(input) {
            return Err(MetricsError::MissingInput { path });
        }

        debug!(input = %input, path = %path.display(), "optional input absent");
        Ok(None)
    }

    /// Parse one input into its catalog values.
    fn extract(&self, path: &Path, input: Input) -> Result<Vec<MetricValue>> {
        let values: Vec<MetricValue> = match input {
            Input::BuildLog => vec![parsers::parse_build_log(path)?.into()],
            Input::BuildSampling | Input::AnalysisSampling => {
                parsers::parse_psrecord(path)?.values().to_vec()
            }
            Input::AnalysisLog => {
                let timings = parsers::parse_analysis_log(path)?;
                vec![
                    timings.total.into(),
                    timings.database.into(),
                    timings.query.into(),
                    timings.decode.into(),
                ]
            }
            Input::CodeCount => {
                let counts = parsers::parse_cloc(path, &self.language)?;
                vec![counts.files.into(), counts.lines.into()]
            }
            Input::ResultsTable => {
                let counts = parsers::parse_results(path)?;
                vec![
                    MetricValue::Count(counts.distinct_keys),
                    MetricValue::Count(counts.rows),
                ]
            }
        };
        debug!(input = %input, path = %path.display(), "parsed input");
        Ok(values)
    }
}

/// Repository identifier: the final path component.
pub fn repo_name(repo: &Path) -> String {
    repo.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| repo.display().to_string())
}
