//! Conflict resolution for occupied rename targets
//!
//! When a proposed target path already names an existing file, the occupant
//! is read and judged. Only a plain data shape (model-like file with no
//! framework markers) is moved aside automatically, to a deterministic
//! `-model` fallback name; anything else is surrendered to manual review.
//! Conflict resolution never fails the run.

use std::path::Path;

use ngshift_foundation::{
    ConflictType, FileRecord, ManualReviewItem, RenameOperation,
};
use tracing::{debug, info};

use crate::fs::Vfs;
use crate::services::classify::{self, ContentShape};
use crate::services::siblings::SiblingIndex;

/// Fixed disambiguation suffix appended to a displaced occupant's stem.
const FALLBACK_SUFFIX: &str = "-model";

/// Outcome of consulting the resolver for one occupied target.
#[derive(Debug)]
pub enum Resolution {
    /// The rename may proceed; `additional_renames` (occupant plus its
    /// sibling artifacts) must be applied first.
    Proceed {
        additional_renames: Vec<RenameOperation>,
    },
    /// The rename is abandoned for this run.
    Abandon(ManualReviewItem),
}

/// Decide whether the file blocking `candidate_new_path` can be relocated out
/// of the way of `record`'s rename.
pub fn resolve(
    fs: &dyn Vfs,
    candidate_new_path: &Path,
    record: &FileRecord,
    siblings: &SiblingIndex,
) -> Resolution {
    if !fs.exists(candidate_new_path) {
        return Resolution::Proceed {
            additional_renames: Vec::new(),
        };
    }

    let occupant_content = match fs.read_to_string(candidate_new_path) {
        Ok(content) => content,
        Err(e) => {
            return abandon(
                record,
                candidate_new_path,
                format!(
                    "could not read blocking file {}: {}",
                    candidate_new_path.display(),
                    e
                ),
                ConflictType::ReadFailure,
            );
        }
    };

    match classify::classify_shape(&occupant_content) {
        ContentShape::AngularArtifact(category) => {
            // Renaming two colliding semantic files automatically risks
            // choosing a worse name for the more important one.
            abandon(
                record,
                candidate_new_path,
                format!(
                    "rename target is occupied by an existing {:?} file; a human should decide",
                    category
                ),
                ConflictType::BlockedByCategorizedFile,
            )
        }
        ContentShape::Indeterminate => abandon(
            record,
            candidate_new_path,
            format!(
                "could not determine the domain of blocking file {}",
                candidate_new_path.display()
            ),
            ConflictType::BlockedByUnclassifiableFile,
        ),
        ContentShape::PlainData => relocate_occupant(fs, candidate_new_path, record, siblings),
    }
}

fn relocate_occupant(
    fs: &dyn Vfs,
    occupant: &Path,
    record: &FileRecord,
    siblings: &SiblingIndex,
) -> Resolution {
    let Some((stem, ext)) = occupant
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.rsplit_once('.'))
    else {
        return abandon(
            record,
            occupant,
            format!("blocking file {} has no usable name", occupant.display()),
            ConflictType::BlockedByUnclassifiableFile,
        );
    };

    let dir = occupant.parent().unwrap_or_else(|| Path::new(""));
    let fallback_stem = format!("{}{}", stem, FALLBACK_SUFFIX);
    let fallback_path = dir.join(format!("{}.{}", fallback_stem, ext));

    // Mandatory availability check before committing the fallback name
    if fs.exists(&fallback_path) {
        return abandon(
            record,
            occupant,
            format!(
                "proposed fallback name {} already exists",
                fallback_path.display()
            ),
            ConflictType::FallbackNameTaken,
        );
    }

    // The occupant's siblings move to the fallback stem too; each of those
    // targets gets the same availability check as the fallback itself
    let carried = siblings.carry_renames(
        dir,
        stem,
        &fallback_stem,
        "sibling artifact follows displaced data file",
    );
    if let Some(blocked) = carried.iter().find(|op| fs.exists(&op.new_path)) {
        return abandon(
            record,
            occupant,
            format!(
                "proposed fallback name {} already exists",
                blocked.new_path.display()
            ),
            ConflictType::FallbackNameTaken,
        );
    }

    let mut additional_renames = vec![RenameOperation {
        old_path: occupant.to_path_buf(),
        new_path: fallback_path,
        reason: "plain data file moved aside for an incoming rename".to_string(),
    }];
    additional_renames.extend(carried);

    info!(
        occupant = %occupant.display(),
        renames = additional_renames.len(),
        "Relocating plain data occupant"
    );
    Resolution::Proceed { additional_renames }
}

fn abandon(
    record: &FileRecord,
    candidate_new_path: &Path,
    reason: String,
    conflict_type: ConflictType,
) -> Resolution {
    debug!(
        file = %record.path.display(),
        target = %candidate_new_path.display(),
        %reason,
        "Abandoning rename for manual review"
    );
    Resolution::Abandon(ManualReviewItem {
        file_path: record.path.clone(),
        desired_new_path: candidate_new_path.to_path_buf(),
        reason,
        conflict_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemFs;
    use ngshift_foundation::FileCategory;
    use std::path::PathBuf;

    fn service_record(path: &str) -> FileRecord {
        FileRecord {
            path: PathBuf::from(path),
            content: "export class UserService {}".to_string(),
            category: FileCategory::Service,
        }
    }

    #[test]
    fn free_target_proceeds_without_side_effects() {
        let fs = MemFs::new();
        fs.seed("/p/src/user.service.ts", "");
        let record = service_record("/p/src/user.service.ts");
        let siblings = SiblingIndex::default();
        match resolve(&fs, Path::new("/p/src/user.ts"), &record, &siblings) {
            Resolution::Proceed { additional_renames } => assert!(additional_renames.is_empty()),
            other => panic!("expected Proceed, got {:?}", other),
        }
    }

    #[test]
    fn plain_data_occupant_is_moved_to_model_name() {
        let fs = MemFs::new();
        fs.seed("/p/src/user.ts", "export interface User { id: number; }");
        let record = service_record("/p/src/user.service.ts");
        let siblings = SiblingIndex::default();
        match resolve(&fs, Path::new("/p/src/user.ts"), &record, &siblings) {
            Resolution::Proceed { additional_renames } => {
                assert_eq!(additional_renames.len(), 1);
                assert_eq!(
                    additional_renames[0].new_path,
                    PathBuf::from("/p/src/user-model.ts")
                );
            }
            other => panic!("expected Proceed, got {:?}", other),
        }
    }

    #[test]
    fn categorized_occupant_goes_to_manual_review() {
        let fs = MemFs::new();
        fs.seed("/p/src/user.ts", "@Component({})\nexport class User {}");
        let record = service_record("/p/src/user.service.ts");
        let siblings = SiblingIndex::default();
        match resolve(&fs, Path::new("/p/src/user.ts"), &record, &siblings) {
            Resolution::Abandon(item) => {
                assert_eq!(item.conflict_type, ConflictType::BlockedByCategorizedFile);
                assert!(item.reason.contains("Component"));
            }
            other => panic!("expected Abandon, got {:?}", other),
        }
    }

    #[test]
    fn indeterminate_occupant_goes_to_manual_review() {
        let fs = MemFs::new();
        fs.seed("/p/src/user.ts", "const x = 1;");
        let record = service_record("/p/src/user.service.ts");
        let siblings = SiblingIndex::default();
        match resolve(&fs, Path::new("/p/src/user.ts"), &record, &siblings) {
            Resolution::Abandon(item) => {
                assert_eq!(
                    item.conflict_type,
                    ConflictType::BlockedByUnclassifiableFile
                );
            }
            other => panic!("expected Abandon, got {:?}", other),
        }
    }

    #[test]
    fn taken_sibling_fallback_name_abandons() {
        let fs = MemFs::new();
        fs.seed("/p/src/user.ts", "export interface User {}");
        fs.seed("/p/src/user.html", "<p>user</p>");
        fs.seed("/p/src/user-model.html", "<p>existing</p>");
        let record = service_record("/p/src/user.service.ts");
        let siblings = SiblingIndex::build(&[FileRecord {
            path: PathBuf::from("/p/src/user.html"),
            content: String::new(),
            category: FileCategory::Template,
        }]);
        match resolve(&fs, Path::new("/p/src/user.ts"), &record, &siblings) {
            Resolution::Abandon(item) => {
                assert_eq!(item.conflict_type, ConflictType::FallbackNameTaken);
                assert!(item.reason.contains("user-model.html"));
            }
            other => panic!("expected Abandon, got {:?}", other),
        }
        // Nothing moved
        assert_eq!(
            fs.read_to_string(Path::new("/p/src/user-model.html")).unwrap(),
            "<p>existing</p>"
        );
    }

    #[test]
    fn taken_fallback_name_abandons() {
        let fs = MemFs::new();
        fs.seed("/p/src/user.ts", "export interface User {}");
        fs.seed("/p/src/user-model.ts", "export interface UserModel {}");
        let record = service_record("/p/src/user.service.ts");
        let siblings = SiblingIndex::default();
        match resolve(&fs, Path::new("/p/src/user.ts"), &record, &siblings) {
            Resolution::Abandon(item) => {
                assert_eq!(item.conflict_type, ConflictType::FallbackNameTaken);
            }
            other => panic!("expected Abandon, got {:?}", other),
        }
    }
}
