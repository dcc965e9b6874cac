//! Assignment persistence.
//!
//! The resolver hands its output to an [`AssignmentStore`]. The file-backed store keeps one YAML
//! document per assignment in a sharded directory tree below the configured data directory.

pub mod assignments;
mod helpers;

pub use assignments::{AssignmentStore, FileAssignmentStore};
