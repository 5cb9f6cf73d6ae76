//! Resource-sampling log parsing (psrecord format).
//!
//! ```text
//! # Elapsed time   CPU (%)     Real (MB)   Virtual (MB)
//!        0.000        0.000       12.309      230.148
//!        0.503       98.900      150.770      612.004
//! ```

use super::read_text;
use crate::error::Result;
use crate::models::{ResourceSample, ResourceSummary};
use std::path::Path;

/// Minimum number of whitespace-separated fields in a data line.
const MIN_FIELDS: usize = 4;

/// Parse a sampling log and summarize CPU and memory usage.
pub fn parse_psrecord(path: &Path) -> Result<ResourceSummary> {
    let text = read_text(path)?;
    Ok(summarize(&parse_samples(&text)))
}

/// Collect every well-formed sample; malformed lines are skipped.
pub fn parse_samples(text: &str) -> Vec<ResourceSample> {
    text.lines().filter_map(parse_sample_line).collect()
}

fn parse_sample_line(line: &str) -> Option<ResourceSample> {
    let line = line.trim_start();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < MIN_FIELDS {
        return None;
    }

    let cpu_percent = parse_finite(fields[1])?;
    let memory_mb = parse_finite(fields[2])?;
    Some(ResourceSample {
        elapsed: parse_finite(fields[0]),
        cpu_percent,
        memory_mb,
    })
}

fn parse_finite(field: &str) -> Option<f64> {
    field.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Mean, max and median of CPU and memory over `samples`.
pub fn summarize(samples: &[ResourceSample]) -> ResourceSummary {
    let mut cpu: Vec<f64> = samples.iter().map(|s| s.cpu_percent).collect();
    let mut mem: Vec<f64> = samples.iter().map(|s| s.memory_mb).collect();

    ResourceSummary {
        avg_cpu: mean(&cpu),
        max_cpu: max(&cpu),
        median_cpu: median(&mut cpu),
        avg_mem: mean(&mem),
        max_mem: max(&mem),
        median_mem: median(&mut mem),
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// Median; an even count averages the two middle values.
fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);

    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}
