//! Sibling artifact association
//!
//! A source file's template, stylesheet and spec siblings share its stem
//! (`user-list.component.ts` / `.html` / `.scss` / `.spec.ts`). The
//! association is built once at discovery time as an explicit lookup keyed by
//! (directory, shared stem) instead of being re-derived during conflict
//! resolution.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ngshift_foundation::{FileCategory, FileRecord, RenameOperation};

#[derive(Debug, Default)]
pub struct SiblingIndex {
    map: HashMap<(PathBuf, String), Vec<PathBuf>>,
}

/// The stem a sibling artifact shares with its owning source file.
fn owner_stem(path: &Path, category: FileCategory) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    match category {
        FileCategory::Spec => name.strip_suffix(".spec.ts").map(str::to_string),
        FileCategory::Template | FileCategory::Stylesheet => {
            name.rsplit_once('.').map(|(stem, _)| stem.to_string())
        }
        _ => None,
    }
}

impl SiblingIndex {
    /// Build the index from the discovered file set.
    pub fn build(records: &[FileRecord]) -> Self {
        let mut map: HashMap<(PathBuf, String), Vec<PathBuf>> = HashMap::new();
        for record in records {
            if let Some(stem) = owner_stem(&record.path, record.category) {
                let dir = record
                    .path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_default();
                map.entry((dir, stem)).or_default().push(record.path.clone());
            }
        }
        for paths in map.values_mut() {
            paths.sort();
        }
        Self { map }
    }

    /// Sibling artifact paths for the file at `dir` with the given stem.
    pub fn siblings_of(&self, dir: &Path, stem: &str) -> &[PathBuf] {
        self.map
            .get(&(dir.to_path_buf(), stem.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Rename operations carrying the siblings of a source file along with
    /// its stem change. Siblings keep everything after the shared stem
    /// (`.html`, `.scss`, `.spec.ts`) verbatim.
    pub fn carry_renames(
        &self,
        dir: &Path,
        old_stem: &str,
        new_stem: &str,
        reason: &str,
    ) -> Vec<RenameOperation> {
        self.siblings_of(dir, old_stem)
            .iter()
            .filter_map(|sibling| {
                let name = sibling.file_name()?.to_str()?;
                let rest = name.strip_prefix(old_stem)?;
                let new_path = dir.join(format!("{}{}", new_stem, rest));
                if new_path == *sibling {
                    return None;
                }
                Some(RenameOperation {
                    old_path: sibling.clone(),
                    new_path,
                    reason: reason.to_string(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(path: &str, category: FileCategory) -> FileRecord {
        FileRecord {
            path: PathBuf::from(path),
            content: String::new(),
            category,
        }
    }

    #[test]
    fn indexes_template_stylesheet_and_spec_by_shared_stem() {
        let records = vec![
            record("/p/src/nav.component.ts", FileCategory::Component),
            record("/p/src/nav.component.html", FileCategory::Template),
            record("/p/src/nav.component.scss", FileCategory::Stylesheet),
            record("/p/src/nav.component.spec.ts", FileCategory::Spec),
            record("/p/src/other.component.html", FileCategory::Template),
        ];
        let index = SiblingIndex::build(&records);
        let siblings = index.siblings_of(Path::new("/p/src"), "nav.component");
        assert_eq!(
            siblings,
            &[
                PathBuf::from("/p/src/nav.component.html"),
                PathBuf::from("/p/src/nav.component.scss"),
                PathBuf::from("/p/src/nav.component.spec.ts"),
            ]
        );
    }

    #[test]
    fn carry_renames_preserves_trailing_markers() {
        let records = vec![
            record("/p/src/nav.component.html", FileCategory::Template),
            record("/p/src/nav.component.spec.ts", FileCategory::Spec),
        ];
        let index = SiblingIndex::build(&records);
        let renames = index.carry_renames(Path::new("/p/src"), "nav.component", "nav", "follows");
        let new_paths: Vec<_> = renames.iter().map(|r| r.new_path.clone()).collect();
        assert_eq!(
            new_paths,
            vec![
                PathBuf::from("/p/src/nav.html"),
                PathBuf::from("/p/src/nav.spec.ts"),
            ]
        );
    }
}
