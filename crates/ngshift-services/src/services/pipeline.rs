//! Refactoring pipeline
//!
//! Orchestrates discovery, rename execution and the reference pass into one
//! run and aggregates everything into a `RefactorResult`. The pipeline never
//! returns an error: even a root that cannot be scanned produces a
//! well-formed (empty) result carrying the failure as a recorded error.
//!
//! Dry-run executes the identical pipeline against an `OverlayFs`, so the
//! report is exactly what a real run would do, and the underlying tree is
//! never touched.

use std::path::{Path, PathBuf};

use ngshift_foundation::{FileError, RefactorResult};
use tracing::{info, instrument, warn};

use crate::fs::{OverlayFs, Vfs};
use crate::services::{discovery, reference_updater, rename_executor};

/// Knobs for one refactoring run.
#[derive(Debug, Clone, Default)]
pub struct RefactorOptions {
    /// Include glob patterns, matched root-relative. Empty means all.
    pub include: Vec<String>,
    /// Exclude glob patterns, matched root-relative.
    pub exclude: Vec<String>,
    /// Compute the full report without mutating the tree.
    pub dry_run: bool,
    /// The project's own `@scope` package prefix, if it has one. Imports
    /// under this scope are treated as project-local.
    pub project_scope: Option<String>,
}

/// The whole engine behind one entry point.
pub struct RefactorPipeline<'a> {
    fs: &'a dyn Vfs,
    options: RefactorOptions,
}

impl<'a> RefactorPipeline<'a> {
    pub fn new(fs: &'a dyn Vfs, options: RefactorOptions) -> Self {
        Self { fs, options }
    }

    /// Run the pipeline against `root`. Infallible by contract: per-file
    /// failures are carried inside the result.
    #[instrument(skip(self), fields(root = %root.display(), dry_run = self.options.dry_run))]
    pub fn run(&self, root: &Path) -> RefactorResult {
        if self.options.dry_run {
            let overlay = OverlayFs::new(self.fs);
            self.run_on(&overlay, root)
        } else {
            self.run_on(self.fs, root)
        }
    }

    fn run_on(&self, fs: &dyn Vfs, root: &Path) -> RefactorResult {
        let mut result = RefactorResult::default();

        let (mut records, read_errors) = match discovery::discover_files(
            fs,
            root,
            &self.options.include,
            &self.options.exclude,
        ) {
            Ok(discovered) => discovered,
            Err(e) => {
                warn!(error = %e, "Scan failed; producing empty result");
                result.errors.push(FileError {
                    file_path: root.to_path_buf(),
                    message: e.to_string(),
                });
                return result;
            }
        };
        result.errors.extend(read_errors);
        result.processed_files = records.iter().map(|r| r.path.clone()).collect();
        info!(count = records.len(), "Discovery complete");

        let rename_outcome = rename_executor::execute_renames(fs, &mut records);
        result.manual_review_required = rename_outcome.manual_review;
        result.errors.extend(rename_outcome.errors);

        // The reference pass starts only after every rename has committed
        if !rename_outcome.renames.is_empty() {
            let update_outcome = reference_updater::update_references(
                fs,
                &rename_outcome.renames,
                root,
                self.options.project_scope.as_deref(),
            );
            result.content_changes = update_outcome.changes;
            result.errors.extend(update_outcome.errors);
        }
        result.renamed_files = rename_outcome.renames;

        info!(
            renamed = result.renamed_files.len(),
            changes = result.content_changes.len(),
            manual_review = result.manual_review_required.len(),
            errors = result.errors.len(),
            "Run complete"
        );
        result
    }
}

/// Convenience entry point mirroring [`RefactorPipeline::run`].
pub fn run_refactor(fs: &dyn Vfs, root: &Path, options: RefactorOptions) -> RefactorResult {
    RefactorPipeline::new(fs, options).run(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemFs;
    use pretty_assertions::assert_eq;

    #[test]
    fn unscannable_root_yields_well_formed_result() {
        let fs = MemFs::new();
        let result = run_refactor(&fs, Path::new("/missing"), RefactorOptions::default());
        assert!(result.is_noop());
        assert!(result.processed_files.is_empty());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].file_path, PathBuf::from("/missing"));
    }

    #[test]
    fn dry_run_reports_without_mutating() {
        let fs = MemFs::new();
        fs.seed("/p/src/user.service.ts", "export class UserService {}");
        fs.seed(
            "/p/src/main.ts",
            "import { UserService } from './user.service';\n",
        );

        let options = RefactorOptions {
            dry_run: true,
            ..Default::default()
        };
        let result = run_refactor(&fs, Path::new("/p/src"), options);

        assert_eq!(result.renamed_files.len(), 1);
        assert_eq!(result.content_changes.len(), 1);
        // The real tree is untouched
        assert!(fs.exists(Path::new("/p/src/user.service.ts")));
        assert!(!fs.exists(Path::new("/p/src/user.ts")));
        assert_eq!(
            fs.read_to_string(Path::new("/p/src/main.ts")).unwrap(),
            "import { UserService } from './user.service';\n"
        );
    }

    #[test]
    fn dry_run_and_real_run_report_identically() {
        let seed = |fs: &MemFs| {
            fs.seed("/p/src/auth.guard.ts", "export const authGuard = () => true;");
            fs.seed(
                "/p/src/app.module.ts",
                "import { authGuard } from './auth.guard';\n",
            );
        };

        let dry_fs = MemFs::new();
        seed(&dry_fs);
        let dry = run_refactor(
            &dry_fs,
            Path::new("/p/src"),
            RefactorOptions {
                dry_run: true,
                ..Default::default()
            },
        );

        let real_fs = MemFs::new();
        seed(&real_fs);
        let real = run_refactor(&real_fs, Path::new("/p/src"), RefactorOptions::default());

        assert_eq!(dry.renamed_files, real.renamed_files);
        assert_eq!(dry.content_changes, real.content_changes);
        assert_eq!(dry.manual_review_required, real.manual_review_required);
    }

    #[test]
    fn exclude_patterns_reach_discovery() {
        let fs = MemFs::new();
        fs.seed("/p/src/user.service.ts", "export class UserService {}");
        let options = RefactorOptions {
            exclude: vec!["**/*.service.ts".to_string()],
            ..Default::default()
        };
        let result = run_refactor(&fs, Path::new("/p/src"), options);
        assert!(result.is_noop());
        assert!(fs.exists(Path::new("/p/src/user.service.ts")));
    }
}
