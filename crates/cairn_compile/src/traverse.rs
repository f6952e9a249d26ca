//! Source discovery.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use tracing::warn;
use walkdir::WalkDir;

use crate::error::CompileError;

/// Lists every file under `root` whose path relative to `root` matches `pattern`.
///
/// If `root` is itself a file it is returned when its file name matches.
/// Directories are followed through symbolic links. Entries that cannot
/// be read, such as symlink loops, are logged and skipped. The result is sorted so
/// that log output is stable; callers must not rely on the order otherwise.
pub fn traverse(root: &Path, pattern: &str) -> Result<Vec<PathBuf>, CompileError> {
    if !root.exists() {
        return Err(CompileError::NotFound {
            path: root.to_path_buf(),
        });
    }
    let matcher = compile_pattern(pattern)?;

    if root.is_file() {
        let matched = root
            .file_name()
            .map(|name| matcher.is_match(Path::new(name)))
            .unwrap_or(false);
        return Ok(if matched {
            vec![root.to_path_buf()]
        } else {
            Vec::new()
        });
    }

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(root = %root.display(), error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .strip_prefix(root)
                .map(|rel| matcher.is_match(rel))
                .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    Ok(files)
}

fn compile_pattern(pattern: &str) -> Result<GlobMatcher, CompileError> {
    Glob::new(pattern)
        .map(|g| g.compile_matcher())
        .map_err(|e| CompileError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}
