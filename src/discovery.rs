//! Project file discovery.
//!
//! Walks a project directory and yields every file as a [`FileEntry`] for the
//! asset registry. Directories themselves are never entries.

use glob::{glob_with, MatchOptions, Pattern};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::registry::{FileEntry, FileHandle};

/// Default recursion limit below the project root.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Error acquiring the project directory.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AcquireError {
    /// The directory could not be opened; the user can pick another one
    #[error("couldn't open '{}'; pick a project folder and try again", .0.display())]
    Aborted(PathBuf),
    /// Invalid glob pattern built from the root path
    #[error("invalid project path '{0}': {1}")]
    InvalidPattern(String, glob::PatternError),
}

impl AcquireError {
    /// Aborted acquisition is informational, not a failure.
    pub fn is_aborted(&self) -> bool {
        matches!(self, AcquireError::Aborted(_))
    }

    /// An aborted acquisition can simply be tried again.
    pub fn is_retryable(&self) -> bool {
        self.is_aborted()
    }
}

/// Check that `root` can be opened as a directory.
fn acquire(root: &Path) -> Result<(), AcquireError> {
    // Any failure to open the root means nothing was acquired
    std::fs::read_dir(root).map(|_| ()).map_err(|e| {
        debug!(root = %root.display(), error = %e, "project directory unavailable");
        AcquireError::Aborted(root.to_path_buf())
    })
}

/// `root` without `.` components, matching how glob spells the paths it yields.
///
/// The current directory normalizes to an empty path.
fn glob_root(root: &Path) -> PathBuf {
    root.components().filter(|c| !matches!(c, Component::CurDir)).collect()
}

/// Number of directories between `root` and `path`'s parent, or `None` if
/// `path` is not below `root`.
fn depth_below(root: &Path, path: &Path) -> Option<usize> {
    path.strip_prefix(root).ok().map(|rel| rel.components().count().saturating_sub(1))
}

/// Discover every file under `root`, at most `max_depth` directories deep.
///
/// A depth of 0 only lists the files directly in `root`. Unreadable entries
/// are skipped with a warning.
pub fn discover_files(root: &Path, max_depth: usize) -> Result<Vec<PathBuf>, AcquireError> {
    acquire(root)?;

    let base = glob_root(root);
    let pattern = if base.as_os_str().is_empty() {
        "**/*".to_string()
    } else {
        format!("{}/**/*", Pattern::escape(&base.to_string_lossy()))
    };
    let options = MatchOptions { require_literal_leading_dot: false, ..MatchOptions::new() };
    let paths = glob_with(&pattern, options)
        .map_err(|e| AcquireError::InvalidPattern(root.display().to_string(), e))?;

    let mut files = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) => {
                if !path.is_file() {
                    continue;
                }
                match depth_below(&base, &path) {
                    Some(depth) if depth <= max_depth => files.push(path),
                    Some(_) => {}
                    None => warn!(path = %path.display(), "skipping path outside project root"),
                }
            }
            Err(e) => {
                // Log but continue on glob errors
                warn!(error = %e, "error reading path");
            }
        }
    }
    Ok(files)
}

/// Discover files under `root` as classified registry entries.
pub fn discover_entries(root: &Path, max_depth: usize) -> Result<Vec<FileEntry>, AcquireError> {
    let files = discover_files(root, max_depth)?;
    debug!(root = %root.display(), count = files.len(), "discovered project files");
    Ok(files.into_iter().map(|path| FileEntry::new(FileHandle::from_path(path))).collect())
}
