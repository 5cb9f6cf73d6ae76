//! Repository discovery.
//!
//! Every immediate subdirectory of the top-level directory is one
//! repository. Regular files next to them are ignored.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::debug;
use walkdir::WalkDir;

/// A repository directory found by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoDir {
    /// Directory name, used as the row identifier.
    pub name: String,
    /// Full path to the directory.
    pub path: PathBuf,
}

/// Scanner for repository directories under a top-level folder.
pub struct RepoScanner {
    top_dir: PathBuf,
}

impl RepoScanner {
    /// Create a new scanner.
    pub fn new(top_dir: PathBuf) -> Self {
        Self { top_dir }
    }

    /// List repositories, sorted by name so runs are reproducible.
    ///
    /// Failing to read the top-level directory is fatal for the batch.
    pub fn scan(&self) -> Result<Vec<RepoDir>> {
        let walker = WalkDir::new(&self.top_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        let mut repos = Vec::new();
        for entry in walker {
            let entry = entry.with_context(|| {
                format!("Failed to read directory: {}", self.top_dir.display())
            })?;

            // Follows symlinks, unlike entry.file_type().
            if !entry.path().is_dir() {
                debug!(path = %entry.path().display(), "skipping non-directory entry");
                continue;
            }

            repos.push(RepoDir {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: entry.into_path(),
            });
        }

        Ok(repos)
    }
}
