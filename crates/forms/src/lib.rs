//! Wire boundary for assignment question lists.
//!
//! This crate turns the editor's loosely-typed question JSON into domain drafts and defines the
//! shape of finalised questions:
//! - [`Drafts`] parses the submitted list into [`QuestionDraft`]s
//! - [`ConditionalLink`] models the nested and legacy conditional shapes as one tagged union
//! - [`normalise_options`] canonicalises option lists
//! - [`ResolvedQuestion`] is the stored form of a question
//!
//! Identifier resolution, ordering and numbering live in `assess-core`; nothing here generates
//! identifiers.

pub mod conditional;
pub mod draft;
pub mod options;
pub mod resolved;

pub use conditional::{Conditional, ConditionalLink, ConditionalValue};
pub use draft::{Drafts, QuestionDraft};
pub use options::{normalise_options, QuestionOption};
pub use resolved::ResolvedQuestion;

/// Errors returned by the `forms` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum FormsError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Type alias for Results that can fail with a [`FormsError`].
pub type FormsResult<T> = Result<T, FormsError>;
