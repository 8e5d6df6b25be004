//! Engine services for ngshift
//!
//! The rename-and-reference-rewrite engine: naming policy, conflict
//! resolution, rename execution and the reference scanner/rewriter, plus the
//! filesystem abstraction they all run against.

pub mod fs;
pub mod services;

pub use services::pipeline::{run_refactor, RefactorOptions, RefactorPipeline};
