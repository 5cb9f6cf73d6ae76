//! Analysis log parsing: total duration plus the three CodeQL phases.
//!
//! The analysis harness prints one line per phase, either in German
//! (`Erstelle CodeQL-Datenbank gestartet bei <ts> ... Dauer: 8123 ms`) or in
//! English (`Create CodeQL database started at <ts> ... Duration: 8123 ms`).
//! Each phase is matched on its own; a missing phase never hides the others.

use super::build_log::process_finished_seconds;
use super::read_text;
use crate::error::Result;
use crate::models::AnalysisTimings;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// A timed phase of an analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Database,
    Query,
    Decode,
}

impl Phase {
    fn pattern(&self) -> &'static Regex {
        match self {
            Phase::Database => &*DATABASE,
            Phase::Query => &*QUERY,
            Phase::Decode => &*DECODE,
        }
    }
}

fn phase_regex(german: &str, english: &str) -> Regex {
    Regex::new(&format!(
        r"(?:{german} gestartet bei|{english} started at) .+? (?:Dauer|Duration): (\d+) ms"
    ))
    .expect("valid phase regex")
}

static DATABASE: LazyLock<Regex> =
    LazyLock::new(|| phase_regex("Erstelle CodeQL-Datenbank", "Create CodeQL database"));

static QUERY: LazyLock<Regex> = LazyLock::new(|| phase_regex("Führe Query aus", "Run query"));

static DECODE: LazyLock<Regex> =
    LazyLock::new(|| phase_regex("Dekodiere Ergebnisse nach CSV", "Decode results to CSV"));

/// Parse an analysis log into its timing breakdown.
pub fn parse_analysis_log(path: &Path) -> Result<AnalysisTimings> {
    let text = read_text(path)?;
    Ok(analysis_timings(&text))
}

/// Extract all four timings from log text.
pub fn analysis_timings(text: &str) -> AnalysisTimings {
    AnalysisTimings {
        total: process_finished_seconds(text),
        database: phase_seconds(text, Phase::Database),
        query: phase_seconds(text, Phase::Query),
        decode: phase_seconds(text, Phase::Decode),
    }
}

/// Duration of `phase` in seconds, if its marker is present.
pub fn phase_seconds(text: &str, phase: Phase) -> Option<f64> {
    phase
        .pattern()
        .captures(text)
        .and_then(|caps| caps[1].parse::<u64>().ok())
        .map(|ms| ms as f64 / 1000.0)
}
