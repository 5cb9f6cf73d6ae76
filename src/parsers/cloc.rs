//! Code-count summary parsing (`cloc --json` output).

use super::read_text;
use crate::error::{MetricsError, Result};
use crate::models::CodeCount;
use serde_json::Value;
use std::path::Path;

/// Parse a cloc JSON summary and return the counts for `language`.
///
/// A missing language entry or missing count fields yield `None` counts.
/// Invalid JSON, or a document that is not an object, is an error.
pub fn parse_cloc(path: &Path, language: &str) -> Result<CodeCount> {
    let text = read_text(path)?;
    let data: Value = serde_json::from_str(&text).map_err(|source| MetricsError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    if !data.is_object() {
        return Err(MetricsError::NotAnObject {
            path: path.to_path_buf(),
        });
    }

    Ok(code_count(&data, language))
}

/// Look up `language` in an already-parsed summary.
pub fn code_count(data: &Value, language: &str) -> CodeCount {
    let entry = data.get(language).and_then(Value::as_object);

    CodeCount {
        files: entry.and_then(|e| e.get("nFiles")).and_then(as_count),
        lines: entry.and_then(|e| e.get("code")).and_then(as_count),
    }
}

fn as_count(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|v| *v >= 0.0 && v.fract() == 0.0 && *v < u64::MAX as f64)
            .map(|v| v as u64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_language_present() {
        let data = json!({
            "header": { "cloc_version": "1.98", "n_files": 12 },
            "C#": { "nFiles": 10, "blank": 120, "comment": 40, "code": 1500 },
            "XML": { "nFiles": 2, "code": 80 },
            "SUM": { "nFiles": 12, "code": 1580 }
        });
        let counts = code_count(&data, "C#");
        assert_eq!(counts.files, Some(10));
        assert_eq!(counts.lines, Some(1500));
    }

    #[test]
    fn test_language_absent_gives_missing() {
        let data = json!({ "Python": { "nFiles": 3, "code": 90 } });
        assert_eq!(code_count(&data, "C#"), CodeCount::default());
    }

    #[test]
    fn test_partial_fields() {
        let data = json!({ "C#": { "nFiles": 4 } });
        let counts = code_count(&data, "C#");
        assert_eq!(counts.files, Some(4));
        assert_eq!(counts.lines, None);
    }

    #[test]
    fn test_whole_float_counts_accepted() {
        let data = json!({ "C#": { "nFiles": 4.0, "code": 12.5 } });
        let counts = code_count(&data, "C#");
        assert_eq!(counts.files, Some(4));
        assert_eq!(counts.lines, None);
    }

    #[test]
    fn test_out_of_range_float_counts_missing() {
        let data = json!({ "C#": { "nFiles": 1e20, "code": -3.0 } });
        let counts = code_count(&data, "C#");
        assert_eq!(counts.files, None);
        assert_eq!(counts.lines, None);
    }

    #[test]
    fn test_non_object_language_entry_gives_missing() {
        let data = json!({ "C#": 17 });
        assert_eq!(code_count(&data, "C#"), CodeCount::default());
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cloc.json");
        std::fs::write(&path, "{ \"C#\": { \"nFiles\": ").unwrap();

        let err = parse_cloc(&path, "C#").unwrap_err();
        assert!(matches!(err, MetricsError::Json { .. }));
    }

    #[test]
    fn test_top_level_array_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cloc.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        let err = parse_cloc(&path, "C#").unwrap_err();
        assert!(matches!(err, MetricsError::NotAnObject { .. }));
    }

    #[test]
    fn test_parse_cloc_file_without_language() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cloc.json");
        std::fs::write(&path, r#"{"header": {"n_files": 0}}"#).unwrap();

        assert_eq!(parse_cloc(&path, "C#").unwrap(), CodeCount::default());
    }
}
