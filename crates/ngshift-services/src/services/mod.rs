//! Engine services
//!
//! Components in dependency order: classification and discovery feed the
//! naming policy and conflict resolver, the rename executor drives both, and
//! the reference updater runs last over the finalized rename list.

pub mod classify;
pub mod conflict_resolver;
pub mod discovery;
pub mod naming_policy;
pub mod pipeline;
pub mod reference_updater;
pub mod rename_executor;
pub mod siblings;
