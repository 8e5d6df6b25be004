//! Reference scanner and rewriter
//!
//! Runs once, strictly after the rename phase has fully committed. Walks
//! every candidate source file under the (re-rooted) tree, finds each textual
//! reference that resolves to a renamed file and splices in the new name,
//! preserving the reference's quote character, extension presence and
//! relative-vs-absolute import style.

pub mod patterns;

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use ngshift_foundation::{ContentChange, FileError, RenameOperation};
use tracing::{debug, info, warn};

use crate::fs::Vfs;
use crate::services::naming_policy::split_extension;
use patterns::RefCandidate;

/// Outcome of the reference pass.
#[derive(Debug, Default)]
pub struct UpdateOutcome {
    pub changes: Vec<ContentChange>,
    pub errors: Vec<FileError>,
}

/// Scoring weights for best-mapping selection. A filename match with the
/// explicit extension outranks one without; locality and self-import
/// adjustments are large enough to dominate the specificity bonus.
const TIER_WITH_EXTENSION: i64 = 1000;
const TIER_WITHOUT_EXTENSION: i64 = 500;
const SAME_DIRECTORY_BONUS: i64 = 250;
const SELF_IMPORT_PENALTY: i64 = 10_000;

/// Update every reference to a renamed file under `search_root`.
///
/// One unreadable or unwritable file is recorded and skipped; it never aborts
/// the pass.
pub fn update_references(
    fs: &dyn Vfs,
    rename_ops: &[RenameOperation],
    search_root: &Path,
    project_scope: Option<&str>,
) -> UpdateOutcome {
    let mut outcome = UpdateOutcome::default();
    if rename_ops.is_empty() {
        return outcome;
    }

    let root = discover_search_root(fs, search_root);
    debug!(
        requested = %search_root.display(),
        effective = %root.display(),
        "Discovered search root"
    );

    let files = match fs.walk_files(&root) {
        Ok(files) => files,
        Err(e) => {
            outcome.errors.push(FileError {
                file_path: root.clone(),
                message: e.to_string(),
            });
            return outcome;
        }
    };

    let mappings: Vec<Mapping> = rename_ops.iter().filter_map(Mapping::from_op).collect();

    let mut updated_count = 0usize;
    for file in files {
        let is_source = file
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| matches!(ext, "ts" | "tsx"))
            .unwrap_or(false);
        if !is_source {
            continue;
        }
        match rewrite_file(fs, &file, &root, &mappings, project_scope) {
            Ok(changes) => {
                if !changes.is_empty() {
                    updated_count += 1;
                }
                outcome.changes.extend(changes);
            }
            Err(message) => {
                warn!(file = %file.display(), %message, "Reference rewrite failed for file");
                outcome.errors.push(FileError {
                    file_path: file,
                    message,
                });
            }
        }
    }

    info!(
        files_updated = updated_count,
        changes_count = outcome.changes.len(),
        error_count = outcome.errors.len(),
        "Reference pass complete"
    );
    outcome
}

/// Walk upward from `start` looking for the conventional source root (a
/// directory literally named `src`) or a project boundary marker
/// (`angular.json` / `package.json`). A rename performed deep in a subtree
/// can be referenced from files above it; re-rooting the scan keeps those
/// references from being silently missed.
pub fn discover_search_root(fs: &dyn Vfs, start: &Path) -> PathBuf {
    let mut cursor = Some(start);
    while let Some(dir) = cursor {
        if dir.file_name().map(|n| n == "src").unwrap_or(false) {
            return dir.to_path_buf();
        }
        if fs.exists(&dir.join("angular.json")) || fs.exists(&dir.join("package.json")) {
            let src = dir.join("src");
            return if fs.exists(&src) { src } else { dir.to_path_buf() };
        }
        cursor = dir.parent();
    }
    start.to_path_buf()
}

/// One rename projected for lookup: the old path is registered both with and
/// without its extension so references written either way resolve.
struct Mapping {
    old_path: PathBuf,
    old_path_no_ext: PathBuf,
    old_name: String,
    old_stem: String,
    new_path: PathBuf,
    new_name: String,
    new_stem: String,
}

impl Mapping {
    fn from_op(op: &RenameOperation) -> Option<Self> {
        let old_name = op.old_path.file_name()?.to_str()?.to_string();
        let new_name = op.new_path.file_name()?.to_str()?.to_string();
        let (old_stem, _) = split_extension(&old_name);
        let (new_stem, _) = split_extension(&new_name);
        Some(Self {
            old_path: op.old_path.clone(),
            old_path_no_ext: op.old_path.with_file_name(old_stem),
            old_name: old_name.clone(),
            old_stem: old_stem.to_string(),
            new_path: op.new_path.clone(),
            new_name: new_name.clone(),
            new_stem: new_stem.to_string(),
        })
    }
}

fn rewrite_file(
    fs: &dyn Vfs,
    file: &Path,
    root: &Path,
    mappings: &[Mapping],
    project_scope: Option<&str>,
) -> Result<Vec<ContentChange>, String> {
    let content = fs.read_to_string(file).map_err(|e| e.to_string())?;
    let dir = file.parent().unwrap_or_else(|| Path::new(""));

    let mut accepted: Vec<(RefCandidate, String)> = Vec::new();
    for candidate in patterns::find_reference_candidates(&content) {
        if patterns::is_external_specifier(&candidate.text, candidate.kind, project_scope) {
            continue;
        }
        let Some((mapping, with_ext)) = select_mapping(&candidate, file, dir, root, mappings)
        else {
            continue;
        };
        let Some(replacement) = build_replacement(&candidate, mapping, with_ext, dir, root) else {
            continue;
        };
        if replacement != candidate.text {
            accepted.push((candidate, replacement));
        }
    }

    if accepted.is_empty() {
        return Ok(Vec::new());
    }

    // Splice last match first so earlier offsets stay valid
    let mut new_content = content.clone();
    for (candidate, replacement) in accepted.iter().rev() {
        new_content.replace_range(candidate.start..candidate.end, replacement);
    }

    fs.write(file, &new_content).map_err(|e| e.to_string())?;

    // Replacements never contain a newline, so line numbering is stable
    let old_lines: Vec<&str> = content.lines().collect();
    let new_lines: Vec<&str> = new_content.lines().collect();
    let touched_lines: BTreeSet<usize> = accepted
        .iter()
        .map(|(candidate, _)| line_index_of(&content, candidate.start))
        .collect();

    let changes = touched_lines
        .into_iter()
        .filter(|&line| old_lines.get(line) != new_lines.get(line))
        .map(|line| ContentChange {
            file_path: file.to_path_buf(),
            line: line + 1,
            old_content: old_lines.get(line).unwrap_or(&"").to_string(),
            new_content: new_lines.get(line).unwrap_or(&"").to_string(),
            reason: "path reference updated after file rename".to_string(),
        })
        .collect();
    Ok(changes)
}

fn line_index_of(content: &str, offset: usize) -> usize {
    content[..offset].bytes().filter(|b| *b == b'\n').count()
}

/// Pick the best rename mapping for one reference, or `None` to leave it
/// untouched. A raw reference names only its last path segment, so mappings
/// are scored: extension-exact filename match over extension-less match, a
/// specificity bonus for longer stems, a strong locality preference for
/// same-directory renames, and a strong penalty for any mapping that would
/// turn the reference into a self-import.
fn select_mapping<'m>(
    candidate: &RefCandidate,
    scanned_file: &Path,
    scanned_dir: &Path,
    root: &Path,
    mappings: &'m [Mapping],
) -> Option<(&'m Mapping, bool)> {
    let ref_file_name = candidate.text.rsplit('/').next().unwrap_or(&candidate.text);
    let resolved = resolve_reference(&candidate.text, scanned_dir, root);

    let mut best: Option<(i64, &Mapping, bool)> = None;
    for mapping in mappings {
        let (tier, with_ext) = if ref_file_name == mapping.old_name {
            (TIER_WITH_EXTENSION, true)
        } else if ref_file_name == mapping.old_stem {
            (TIER_WITHOUT_EXTENSION, false)
        } else {
            continue;
        };

        // When the reference's directory portion resolves cleanly it must
        // agree with the mapping; a same-named file elsewhere is not a match.
        if let Some(resolved) = &resolved {
            if *resolved != mapping.old_path && *resolved != mapping.old_path_no_ext {
                continue;
            }
        }

        let mut score = tier + mapping.old_stem.len() as i64;
        if mapping.old_path.parent() == Some(scanned_dir) {
            score += SAME_DIRECTORY_BONUS;
        }
        if mapping.new_path == scanned_file {
            score -= SELF_IMPORT_PENALTY;
        }

        if best.map(|(s, _, _)| score > s).unwrap_or(true) {
            best = Some((score, mapping, with_ext));
        }
    }

    best.filter(|(score, _, _)| *score > 0)
        .map(|(_, mapping, with_ext)| (mapping, with_ext))
}

/// Resolve a reference string to an absolute path: relative references
/// against the scanned file's directory, absolute project-relative ones
/// against the source root. Returns `None` when the text cannot be resolved
/// textually (the scanner is best-effort, not a parser).
fn resolve_reference(text: &str, scanned_dir: &Path, root: &Path) -> Option<PathBuf> {
    let joined = if text.starts_with("./") || text.starts_with("../") {
        scanned_dir.join(text)
    } else if text.contains('/') && !text.starts_with('@') {
        root.join(text)
    } else {
        return None;
    };
    normalize(&joined)
}

/// Lexical normalization: strips `.` and folds `..`, without touching disk.
fn normalize(path: &Path) -> Option<PathBuf> {
    let mut parts: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                match parts.last() {
                    Some(Component::Normal(_)) => {
                        parts.pop();
                    }
                    _ => return None,
                };
            }
            other => parts.push(other),
        }
    }
    Some(parts.iter().collect())
}

/// Build the replacement path text for an accepted candidate, preserving the
/// original's import style and extension presence.
fn build_replacement(
    candidate: &RefCandidate,
    mapping: &Mapping,
    with_ext: bool,
    scanned_dir: &Path,
    root: &Path,
) -> Option<String> {
    let new_segment = if with_ext {
        mapping.new_name.clone()
    } else {
        mapping.new_stem.clone()
    };

    let is_absolute_style = candidate.kind.is_module_clause()
        && !candidate.text.starts_with('.')
        && candidate.text.contains('/');

    let replacement = if candidate.text.starts_with('@') {
        // A scoped alias path cannot be resolved against the filesystem, so
        // its directory prefix is kept verbatim; only the filename segment
        // changes. Renames never move a file across directories.
        let (prefix, _) = candidate.text.rsplit_once('/')?;
        format!("{}/{}", prefix, new_segment)
    } else if is_absolute_style {
        // Re-express the new location relative to the project source root
        let relative = mapping.new_path.strip_prefix(root).ok()?;
        let mut text = to_forward_slashes(relative);
        if !with_ext {
            text = strip_last_extension(&text);
        }
        text
    } else {
        // Conventional relative path via path algebra, never string
        // concatenation; a same-directory target keeps its './' marker.
        let relative =
            pathdiff::diff_paths(&mapping.new_path, scanned_dir).unwrap_or_else(|| {
                PathBuf::from(&mapping.new_name)
            });
        let mut text = to_forward_slashes(&relative);
        if !with_ext {
            text = strip_last_extension(&text);
        }
        if !text.starts_with("./") && !text.starts_with("../") {
            text = format!("./{}", text);
        }
        text
    };

    // Reference paths must never contain backslashes, on any host platform
    debug_assert!(!replacement.contains('\\'));
    Some(replacement)
}

fn to_forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn strip_last_extension(text: &str) -> String {
    match text.rsplit_once('/') {
        Some((prefix, name)) => {
            let (stem, _) = split_extension(name);
            format!("{}/{}", prefix, stem)
        }
        None => split_extension(text).0.to_string(),
    }
}
