//! Configuration file handling.
//!
//! This module handles loading `.extract-metrics.toml` files and merging
//! them with command-line arguments.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".extract-metrics.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Where inputs live inside each repository directory.
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Code-count summary settings.
    #[serde(default)]
    pub code_count: CodeCountConfig,

    /// Aggregation passes, each contributing one block of columns.
    #[serde(default = "default_passes")]
    pub passes: Vec<PassConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            layout: LayoutConfig::default(),
            code_count: CodeCountConfig::default(),
            passes: default_passes(),
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Default log filter, overridden by `RUST_LOG`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            log_level: default_log_level(),
        }
    }
}

fn default_output() -> String {
    "aggregated_metrics.csv".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Per-repository file layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Folder holding the build log and its sampling log.
    #[serde(default = "default_build_dir")]
    pub build_dir: String,

    /// Folder holding the analysis log, its sampling log and the code count.
    #[serde(default = "default_measure_dir")]
    pub measure_dir: String,

    /// Name of the text log inside both folders.
    #[serde(default = "default_output_log")]
    pub output_log: String,

    /// Name of the resource-sampling log inside both folders.
    #[serde(default = "default_psrecord_log")]
    pub psrecord_log: String,

    /// Name of the code-count summary inside the measure folder.
    #[serde(default = "default_cloc_json")]
    pub cloc_json: String,

    /// Name of the results table at the repository root.
    #[serde(default = "default_results_csv")]
    pub results_csv: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            build_dir: default_build_dir(),
            measure_dir: default_measure_dir(),
            output_log: default_output_log(),
            psrecord_log: default_psrecord_log(),
            cloc_json: default_cloc_json(),
            results_csv: default_results_csv(),
        }
    }
}

fn default_build_dir() -> String {
    "build".to_string()
}

fn default_measure_dir() -> String {
    "measure".to_string()
}

fn default_output_log() -> String {
    "output.log".to_string()
}

fn default_psrecord_log() -> String {
    "psrecord.log".to_string()
}

fn default_cloc_json() -> String {
    "cloc.json".to_string()
}

fn default_results_csv() -> String {
    "results.csv".to_string()
}

/// Code-count summary settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeCountConfig {
    /// Language key to look up in the summary.
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for CodeCountConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
        }
    }
}

fn default_language() -> String {
    "C#".to_string()
}

/// How strictly a pass treats absent inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyPreset {
    /// Every input is optional.
    #[default]
    Permissive,
    /// Build log, build sampling log and code count must exist.
    Strict,
}

/// One aggregation pass.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PassConfig {
    /// Prepended to every column name produced by this pass.
    #[serde(default)]
    pub prefix: String,

    /// Which inputs must be present.
    #[serde(default)]
    pub policy: PolicyPreset,
}

fn default_passes() -> Vec<PassConfig> {
    vec![PassConfig::default()]
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.extract-metrics.toml` from `dir`.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Check invariants serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.passes.is_empty() {
            bail!("at least one [[passes]] entry is required");
        }

        let mut seen = HashSet::new();
        for pass in &self.passes {
            if !seen.insert(pass.prefix.as_str()) {
                bail!("duplicate pass prefix {:?}", pass.prefix);
            }
        }

        if self.code_count.language.is_empty() {
            bail!("code_count.language must not be empty");
        }

        Ok(())
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.general.output = output.to_string_lossy().into_owned();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;
    use std::path::PathBuf;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.output, "aggregated_metrics.csv");
        assert_eq!(config.layout.build_dir, "build");
        assert_eq!(config.code_count.language, "C#");
        assert_eq!(config.passes, vec![PassConfig::default()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_file_yields_single_permissive_pass() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.passes, vec![PassConfig::default()]);
        assert_eq!(config.passes[0].policy, PolicyPreset::Permissive);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "metrics.tsv"
log_level = "debug"

[layout]
measure_dir = "analysis"

[code_count]
language = "Java"

[[passes]]
policy = "strict"

[[passes]]
prefix = "V2_"
policy = "permissive"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, "metrics.tsv");
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.layout.measure_dir, "analysis");
        assert_eq!(config.layout.build_dir, "build");
        assert_eq!(config.code_count.language, "Java");
        assert_eq!(config.passes.len(), 2);
        assert_eq!(config.passes[0].prefix, "");
        assert_eq!(config.passes[0].policy, PolicyPreset::Strict);
        assert_eq!(config.passes[1].prefix, "V2_");
    }

    #[test]
    fn test_duplicate_prefix_rejected() {
        let toml_content = r#"
[[passes]]
prefix = "A_"

[[passes]]
prefix = "A_"
"#;
        let config: Config = toml::from_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let toml_content = r#"
[[passes]]
policy = "lenient"
"#;
        assert!(toml::from_str::<Config>(toml_content).is_err());
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[general]\noutput = \"out.json\"\n",
        )
        .unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.general.output, "out.json");
        assert_eq!(config.passes.len(), 1);
    }

    #[test]
    fn test_load_invalid_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[general\n").unwrap();
        assert!(Config::load_from_dir(dir.path()).is_err());
    }

    #[test]
    fn test_merge_with_args_overrides_output() {
        let mut config: Config = toml::from_str("").unwrap();
        let mut args = Args {
            top_directory: PathBuf::from("repos"),
            output: None,
        };
        config.merge_with_args(&args);
        assert_eq!(config.general.output, "aggregated_metrics.csv");

        args.output = Some(PathBuf::from("custom.csv"));
        config.merge_with_args(&args);
        assert_eq!(config.general.output, "custom.csv");
    }
}
