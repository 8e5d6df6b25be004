//! File discovery
//!
//! Walks the tree, applies include/exclude glob patterns and produces the
//! classified `FileRecord` set the rename executor operates on. Per-file read
//! failures are recorded and skipped; only a failure to scan the root itself
//! is surfaced as an error.

use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use ngshift_foundation::{FileError, FileRecord, NgshiftError, NgshiftResult};
use tracing::{debug, warn};

use crate::fs::Vfs;
use crate::services::classify;

/// Extensions considered part of the project source set.
const SOURCE_EXTENSIONS: &[&str] = &[
    "ts", "tsx", "js", "mjs", "html", "css", "scss", "sass", "less",
];

fn build_globset(patterns: &[String], root: &Path) -> NgshiftResult<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|e| NgshiftError::scan(format!("invalid glob '{}': {}", pattern, e), root))?;
        builder.add(glob);
    }
    let set = builder
        .build()
        .map_err(|e| NgshiftError::scan(format!("failed to build glob set: {}", e), root))?;
    Ok(Some(set))
}

/// Discover and classify all candidate files under `root`.
pub fn discover_files(
    fs: &dyn Vfs,
    root: &Path,
    include: &[String],
    exclude: &[String],
) -> NgshiftResult<(Vec<FileRecord>, Vec<FileError>)> {
    let include_set = build_globset(include, root)?;
    let exclude_set = build_globset(exclude, root)?;

    let paths = fs
        .walk_files(root)
        .map_err(|e| NgshiftError::scan(e.to_string(), root))?;

    let mut records = Vec::new();
    let mut errors = Vec::new();

    for path in paths {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if !SOURCE_EXTENSIONS.contains(&ext) {
            continue;
        }

        // Globs match against the root-relative path with forward slashes
        let relative = path
            .strip_prefix(root)
            .unwrap_or(&path)
            .to_string_lossy()
            .replace('\\', "/");
        if let Some(include_set) = &include_set {
            if !include_set.is_match(&relative) {
                continue;
            }
        }
        if let Some(exclude_set) = &exclude_set {
            if exclude_set.is_match(&relative) {
                continue;
            }
        }

        let content = match fs.read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unreadable file");
                errors.push(FileError {
                    file_path: path,
                    message: e.to_string(),
                });
                continue;
            }
        };

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let category = classify::classify_file(&file_name, &content);
        debug!(path = %path.display(), ?category, "Discovered file");

        records.push(FileRecord {
            path,
            content,
            category,
        });
    }

    Ok((records, errors))
}
