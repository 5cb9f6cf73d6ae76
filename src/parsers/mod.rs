//! Log parsers.
//!
//! Each parser is a stateless function specialized to one input format.
//! Parsers read their file fully, release it, and return either the
//! extracted values or a [`MetricsError`](crate::error::MetricsError).
//! A pattern that does not match is not an error; it yields a missing value.

pub mod analysis_log;
pub mod build_log;
pub mod cloc;
pub mod psrecord;
pub mod results;

pub use analysis_log::parse_analysis_log;
pub use build_log::parse_build_log;
pub use cloc::parse_cloc;
pub use psrecord::parse_psrecord;
pub use results::parse_results;

use crate::error::{MetricsError, Result};
use std::path::Path;

/// Read a whole UTF-8 text file.
pub(crate) fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| MetricsError::io(path, e))
}
