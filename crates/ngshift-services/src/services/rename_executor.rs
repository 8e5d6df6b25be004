//! Rename execution
//!
//! Drives the naming policy and conflict resolver across the discovered file
//! set and performs the physical renames through the `Vfs`. Occupant renames
//! land first, then the primary rename, then the sibling artifacts, each
//! emitting its own `RenameOperation`. The executor commits every rename
//! before the reference pass starts; the two phases never interleave.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use ngshift_foundation::{
    ConflictType, FileCategory, FileError, FileRecord, ManualReviewItem, RenameOperation,
};
use tracing::{debug, info, warn};

use crate::fs::Vfs;
use crate::services::classify;
use crate::services::conflict_resolver::{self, Resolution};
use crate::services::naming_policy;
use crate::services::siblings::SiblingIndex;

/// Outcome of the rename phase.
#[derive(Debug, Default)]
pub struct RenameOutcome {
    pub renames: Vec<RenameOperation>,
    pub manual_review: Vec<ManualReviewItem>,
    pub errors: Vec<FileError>,
}

/// Apply the naming policy to every record, resolving conflicts as they
/// arise. `records` paths are updated in place as renames land.
pub fn execute_renames(fs: &dyn Vfs, records: &mut [FileRecord]) -> RenameOutcome {
    let sibling_index = SiblingIndex::build(records);
    let record_paths: HashSet<PathBuf> = records.iter().map(|r| r.path.clone()).collect();
    let mut outcome = RenameOutcome::default();
    // Old paths consumed by an earlier rename (siblings, displaced occupants)
    let mut consumed: HashSet<PathBuf> = HashSet::new();

    for index in 0..records.len() {
        let record = records[index].clone();
        if consumed.contains(&record.path) {
            continue;
        }
        if is_sibling_driven_spec(&record, &record_paths) {
            continue;
        }

        let Some(base_name) = record.path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let domain_suffix = if record.category == FileCategory::Service {
            classify::infer_domain_suffix(&record.content)
        } else {
            None
        };
        let Some(new_name) = naming_policy::propose(base_name, record.category, domain_suffix)
        else {
            debug!(path = %record.path.display(), "Name already conforms");
            continue;
        };

        let dir = record
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let candidate = dir.join(&new_name);

        let additional_renames =
            match conflict_resolver::resolve(fs, &candidate, &record, &sibling_index) {
                Resolution::Proceed { additional_renames } => additional_renames,
                Resolution::Abandon(item) => {
                    outcome.manual_review.push(item);
                    continue;
                }
            };

        // Carry template/stylesheet/spec siblings along with the stem change
        let old_stem = stem_of(base_name);
        let new_stem = stem_of(&new_name);
        let sibling_renames = sibling_index.carry_renames(
            &dir,
            old_stem,
            new_stem,
            "sibling artifact follows source rename",
        );

        // A carried sibling must never land on a live file. Targets the
        // occupant relocation vacates first are fine; anything else
        // surrenders the whole group before a single rename is applied.
        let vacated: HashSet<&Path> = additional_renames
            .iter()
            .map(|op| op.old_path.as_path())
            .collect();
        if let Some(blocked) = sibling_renames
            .iter()
            .find(|op| fs.exists(&op.new_path) && !vacated.contains(op.new_path.as_path()))
        {
            outcome.manual_review.push(ManualReviewItem {
                file_path: record.path.clone(),
                desired_new_path: candidate.clone(),
                reason: format!(
                    "sibling rename target {} is already occupied",
                    blocked.new_path.display()
                ),
                conflict_type: ConflictType::SiblingTargetOccupied,
            });
            continue;
        }

        // Move the occupant (and its siblings) out of the way first
        let mut occupant_failed = false;
        for op in additional_renames {
            if !apply_rename(fs, op, records, &mut outcome, &mut consumed) {
                occupant_failed = true;
                break;
            }
        }
        if occupant_failed {
            warn!(
                path = %record.path.display(),
                "Skipping rename after occupant relocation failed"
            );
            continue;
        }

        let primary = RenameOperation {
            old_path: record.path.clone(),
            new_path: candidate.clone(),
            reason: rename_reason(record.category, domain_suffix),
        };
        if !apply_rename(fs, primary, records, &mut outcome, &mut consumed) {
            continue;
        }

        for op in sibling_renames {
            apply_rename(fs, op, records, &mut outcome, &mut consumed);
        }
    }

    info!(
        renamed_count = outcome.renames.len(),
        manual_review_count = outcome.manual_review.len(),
        error_count = outcome.errors.len(),
        "Rename phase complete"
    );
    outcome
}

/// A spec file whose owning source file is in the run is renamed as that
/// file's sibling, never directly.
fn is_sibling_driven_spec(record: &FileRecord, record_paths: &HashSet<PathBuf>) -> bool {
    if record.category != FileCategory::Spec {
        return false;
    }
    let Some(name) = record.path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let Some(owner_stem) = name.strip_suffix(".spec.ts") else {
        return false;
    };
    let Some(dir) = record.path.parent() else {
        return false;
    };
    record_paths.contains(&dir.join(format!("{}.ts", owner_stem)))
}

fn stem_of(name: &str) -> &str {
    name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(name)
}

fn rename_reason(category: FileCategory, domain_suffix: Option<&str>) -> String {
    match (category, domain_suffix) {
        (FileCategory::Service, Some(suffix)) => format!(
            "service suffix replaced with inferred '{}' domain suffix",
            suffix
        ),
        (category, _) => match category.suffix_token() {
            Some(token) => format!("'{}' suffix normalized per naming convention", token),
            None => "name normalized per naming convention".to_string(),
        },
    }
}

/// Perform one rename through the `Vfs`, recording it and updating the
/// affected record's mutable path identity. Returns false on failure.
fn apply_rename(
    fs: &dyn Vfs,
    op: RenameOperation,
    records: &mut [FileRecord],
    outcome: &mut RenameOutcome,
    consumed: &mut HashSet<PathBuf>,
) -> bool {
    if let Err(e) = fs.rename(&op.old_path, &op.new_path) {
        warn!(
            old = %op.old_path.display(),
            new = %op.new_path.display(),
            error = %e,
            "Rename failed"
        );
        outcome.errors.push(FileError {
            file_path: op.old_path.clone(),
            message: format!("rename to {} failed: {}", op.new_path.display(), e),
        });
        return false;
    }

    if let Some(record) = records.iter_mut().find(|r| r.path == op.old_path) {
        record.path = op.new_path.clone();
    }
    consumed.insert(op.old_path.clone());
    debug!(
        old = %op.old_path.display(),
        new = %op.new_path.display(),
        reason = %op.reason,
        "Renamed"
    );
    outcome.renames.push(op);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemFs;
    use crate::services::discovery;
    use pretty_assertions::assert_eq;

    fn run(fs: &MemFs) -> (Vec<FileRecord>, RenameOutcome) {
        let (mut records, _) =
            discovery::discover_files(fs, Path::new("/p"), &[], &[]).unwrap();
        let outcome = execute_renames(fs, &mut records);
        (records, outcome)
    }

    #[test]
    fn renames_component_with_siblings() {
        let fs = MemFs::new();
        fs.seed("/p/src/nav.component.ts", "@Component({})\nexport class Nav {}");
        fs.seed("/p/src/nav.component.html", "<nav></nav>");
        fs.seed("/p/src/nav.component.scss", "nav {}");
        fs.seed("/p/src/nav.component.spec.ts", "describe('Nav', () => {});");

        let (_, outcome) = run(&fs);

        assert_eq!(outcome.renames.len(), 4);
        assert!(fs.exists(Path::new("/p/src/nav.ts")));
        assert!(fs.exists(Path::new("/p/src/nav.html")));
        assert!(fs.exists(Path::new("/p/src/nav.scss")));
        assert!(fs.exists(Path::new("/p/src/nav.spec.ts")));
        assert!(!fs.exists(Path::new("/p/src/nav.component.ts")));
    }

    #[test]
    fn displaces_plain_data_occupant() {
        let fs = MemFs::new();
        fs.seed("/p/src/user.ts", "export interface User { id: number; }");
        fs.seed("/p/src/user.service.ts", "export class UserService {}");

        let (_, outcome) = run(&fs);

        assert!(outcome.manual_review.is_empty());
        assert_eq!(
            fs.read_to_string(Path::new("/p/src/user-model.ts")).unwrap(),
            "export interface User { id: number; }"
        );
        assert_eq!(
            fs.read_to_string(Path::new("/p/src/user.ts")).unwrap(),
            "export class UserService {}"
        );
        // Occupant rename is ordered before the primary rename
        assert_eq!(outcome.renames[0].new_path, PathBuf::from("/p/src/user-model.ts"));
        assert_eq!(outcome.renames[1].new_path, PathBuf::from("/p/src/user.ts"));
    }

    #[test]
    fn blocked_rename_is_surrendered_to_manual_review() {
        let fs = MemFs::new();
        fs.seed("/p/src/user.ts", "@Injectable()\nexport class Other {}");
        fs.seed("/p/src/user.service.ts", "export class UserService {}");

        let (_, outcome) = run(&fs);

        assert!(outcome.renames.is_empty());
        assert_eq!(outcome.manual_review.len(), 1);
        assert!(fs.exists(Path::new("/p/src/user.service.ts")));
    }

    #[test]
    fn sibling_carry_never_overwrites_an_existing_file() {
        let fs = MemFs::new();
        fs.seed("/p/src/nav.component.ts", "@Component({})\nexport class Nav {}");
        fs.seed("/p/src/nav.component.html", "<nav>component template</nav>");
        fs.seed("/p/src/nav.html", "<nav>standalone</nav>");

        let (_, outcome) = run(&fs);

        assert!(outcome.renames.is_empty());
        assert_eq!(outcome.manual_review.len(), 1);
        assert_eq!(
            outcome.manual_review[0].conflict_type,
            ConflictType::SiblingTargetOccupied
        );
        // The whole group is surrendered; nothing was touched
        assert!(fs.exists(Path::new("/p/src/nav.component.ts")));
        assert_eq!(
            fs.read_to_string(Path::new("/p/src/nav.html")).unwrap(),
            "<nav>standalone</nav>"
        );
    }

    #[test]
    fn carry_target_vacated_by_occupant_relocation_proceeds() {
        let fs = MemFs::new();
        fs.seed("/p/src/nav.ts", "export interface NavItem { label: string; }");
        fs.seed("/p/src/nav.html", "<nav>data template</nav>");
        fs.seed("/p/src/nav.component.ts", "@Component({})\nexport class Nav {}");
        fs.seed("/p/src/nav.component.html", "<nav>component</nav>");

        let (_, outcome) = run(&fs);

        assert!(outcome.manual_review.is_empty());
        assert_eq!(outcome.renames.len(), 4);
        // The occupant family moved to -model, the component family took its place
        assert_eq!(
            fs.read_to_string(Path::new("/p/src/nav-model.ts")).unwrap(),
            "export interface NavItem { label: string; }"
        );
        assert_eq!(
            fs.read_to_string(Path::new("/p/src/nav-model.html")).unwrap(),
            "<nav>data template</nav>"
        );
        assert_eq!(
            fs.read_to_string(Path::new("/p/src/nav.ts")).unwrap(),
            "@Component({})\nexport class Nav {}"
        );
        assert_eq!(
            fs.read_to_string(Path::new("/p/src/nav.html")).unwrap(),
            "<nav>component</nav>"
        );
    }

    #[test]
    fn second_run_is_a_noop() {
        let fs = MemFs::new();
        fs.seed("/p/src/auth.guard.ts", "export const authGuard = () => true;");
        let (_, first) = run(&fs);
        assert_eq!(first.renames.len(), 1);
        let (_, second) = run(&fs);
        assert!(second.renames.is_empty());
    }
}
