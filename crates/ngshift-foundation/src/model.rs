//! Data model for the rename-and-reference-rewrite engine
//!
//! These types flow between the engine services and out to the presentation
//! layer. `RefactorResult` is the sole hand-off surface: the CLI (or a JSON
//! emitter) consumes it read-only.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Discrete classification tag assigned to a file at discovery time.
///
/// The category drives which naming rule applies and is immutable for the
/// duration of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileCategory {
    Component,
    Service,
    Directive,
    Pipe,
    Module,
    Guard,
    Interceptor,
    Resolver,
    Spec,
    Template,
    Stylesheet,
    Other,
}

impl FileCategory {
    /// The dotted filename token this category contributes (`user.service.ts`
    /// carries `"service"`). Categories that are not name-driven have none.
    pub fn suffix_token(&self) -> Option<&'static str> {
        match self {
            FileCategory::Component => Some("component"),
            FileCategory::Service => Some("service"),
            FileCategory::Directive => Some("directive"),
            FileCategory::Pipe => Some("pipe"),
            FileCategory::Module => Some("module"),
            FileCategory::Guard => Some("guard"),
            FileCategory::Interceptor => Some("interceptor"),
            FileCategory::Resolver => Some("resolver"),
            FileCategory::Spec | FileCategory::Template | FileCategory::Stylesheet
            | FileCategory::Other => None,
        }
    }

    /// All tokens that can appear as a dotted category suffix in a filename.
    pub fn all_suffix_tokens() -> &'static [&'static str] {
        &[
            "component",
            "service",
            "directive",
            "pipe",
            "module",
            "guard",
            "interceptor",
            "resolver",
        ]
    }
}

/// One file under consideration.
///
/// `path` is the single mutable identity of the file through its lifecycle in
/// one run: the rename executor updates it in place as renames are applied.
/// The filesystem remains the source of truth after each write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    /// Absolute filesystem path
    pub path: PathBuf,
    /// Full text content
    pub content: String,
    /// Category assigned once at discovery time
    pub category: FileCategory,
}

/// A completed (or dry-run recorded) rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameOperation {
    pub old_path: PathBuf,
    pub new_path: PathBuf,
    /// Human-readable justification
    pub reason: String,
}

/// One line-level textual edit.
///
/// Append-only audit trail; never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentChange {
    pub file_path: PathBuf,
    /// 1-based line number
    pub line: usize,
    pub old_content: String,
    pub new_content: String,
    pub reason: String,
}

/// Why a conflict could not be resolved automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictType {
    /// The blocking file is itself a recognizable source-category file
    BlockedByCategorizedFile,
    /// No structural signal found in the blocking file
    BlockedByUnclassifiableFile,
    /// The deterministic fallback name is also taken
    FallbackNameTaken,
    /// A carried sibling rename would land on a live file
    SiblingTargetOccupied,
    /// The blocking file could not be read for classification
    ReadFailure,
}

/// A conflict the engine declines to resolve automatically.
///
/// Terminal for this policy pass: once emitted, no further automatic action
/// is taken on the file in the same run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualReviewItem {
    pub file_path: PathBuf,
    pub desired_new_path: PathBuf,
    pub reason: String,
    pub conflict_type: ConflictType,
}

/// A recoverable per-file failure, keyed by the offending path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileError {
    pub file_path: PathBuf,
    pub message: String,
}

/// Aggregated outcome of one refactoring run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefactorResult {
    pub processed_files: Vec<PathBuf>,
    pub renamed_files: Vec<RenameOperation>,
    pub content_changes: Vec<ContentChange>,
    pub manual_review_required: Vec<ManualReviewItem>,
    pub errors: Vec<FileError>,
}

impl RefactorResult {
    /// True when the run performed (or would perform) no work at all.
    pub fn is_noop(&self) -> bool {
        self.renamed_files.is_empty() && self.content_changes.is_empty()
    }
}
