//! Foundation layer - core types and error handling for ngshift
//!
//! This crate provides the building blocks shared by the engine and the CLI:
//! - The refactoring data model (file records, rename operations, audit trail)
//! - The error enum and result aliases

pub mod error;
pub mod model;

// Re-export commonly used types for convenience
pub use error::*;
pub use model::*;
