//! Build log parsing: total build duration.

use super::read_text;
use crate::error::Result;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static PROCESS_FINISHED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Process finished \((\d+(?:\.\d+)?) seconds\)").expect("valid duration regex")
});

/// Parse a build log and return the total duration in seconds.
///
/// Returns `Ok(None)` when the log has no `Process finished` line.
pub fn parse_build_log(path: &Path) -> Result<Option<f64>> {
    let text = read_text(path)?;
    Ok(process_finished_seconds(&text))
}

/// Find the first `Process finished (<n> seconds)` marker in `text`.
pub fn process_finished_seconds(text: &str) -> Option<f64> {
    PROCESS_FINISHED
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fractional_seconds() {
        let text = "compiling...\nProcess finished (12.5 seconds)\n";
        assert_eq!(process_finished_seconds(text), Some(12.5));
    }

    #[test]
    fn test_integer_seconds() {
        assert_eq!(
            process_finished_seconds("Process finished (300 seconds)"),
            Some(300.0)
        );
    }

    #[test]
    fn test_first_marker_wins() {
        let text = "Process finished (1.0 seconds)\nProcess finished (2.0 seconds)\n";
        assert_eq!(process_finished_seconds(text), Some(1.0));
    }

    #[test]
    fn test_no_marker() {
        assert_eq!(process_finished_seconds("Process failed after 3 seconds"), None);
        assert_eq!(process_finished_seconds(""), None);
    }

    #[test]
    fn test_parse_build_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.log");
        std::fs::write(&path, "dotnet build\nProcess finished (42.25 seconds)\n").unwrap();

        assert_eq!(parse_build_log(&path).unwrap(), Some(42.25));
    }

    #[test]
    fn test_unreadable_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(parse_build_log(&dir.path().join("missing.log")).is_err());
    }
}
