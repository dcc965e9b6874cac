//! Identifier utilities for assignment storage and question resolution.
//!
//! Two concerns live here:
//! - [`ShardableUuid`], the canonical identifier used for stored assignment documents, together
//!   with the sharded directory layout derived from it.
//! - [`IdGenerator`], the collaborator that mints permanent question identifiers. The resolver
//!   never generates identifiers itself, so tests can inject a fixed sequence
//!   ([`SequenceIdGenerator`]) while production uses random UUIDs ([`UuidIdGenerator`]).
//!
//! ## Canonical UUID form
//! - Length: 32
//! - Characters: `0-9` and `a-f` only
//! - Example: `550e8400e29b41d4a716446655440000`
//!
//! ## Sharded directory layout
//! For a canonical UUID `u`, documents are stored under:
//! `parent_dir/<u[0..2]>/<u[2..4]>/<u>/`
//!
//! Example:
//! `assignment_data/assignments/55/0e/550e8400e29b41d4a716446655440000/`

mod generator;
mod service;

pub use generator::{IdGenerator, SequenceIdGenerator, UuidIdGenerator};
pub use service::{ShardableUuid, Uuid};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The generator has no identifiers left to hand out
    #[error("identifier generator exhausted")]
    Exhausted,

    /// The generator failed outright
    #[error("identifier generation failed: {0}")]
    Generation(String),
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
