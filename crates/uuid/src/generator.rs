//! Identifier generators used to mint permanent question identifiers.

use crate::{ShardableUuid, UuidError, UuidResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Source of permanent identifiers.
///
/// Implementations must accept a request for zero identifiers. [`generate_ids`] is allowed to
/// return fewer identifiers than requested; callers that need a total function fall back to
/// [`generate_id`] for the missing ones.
///
/// [`generate_ids`]: IdGenerator::generate_ids
/// [`generate_id`]: IdGenerator::generate_id
pub trait IdGenerator {
    /// Pre-generates up to `count` identifiers.
    fn generate_ids(&self, count: usize) -> UuidResult<Vec<String>>;

    /// Generates a single identifier on demand.
    fn generate_id(&self) -> UuidResult<String> {
        self.generate_ids(1)?.pop().ok_or(UuidError::Exhausted)
    }
}

impl<T: IdGenerator + ?Sized> IdGenerator for &T {
    fn generate_ids(&self, count: usize) -> UuidResult<Vec<String>> {
        (**self).generate_ids(count)
    }

    fn generate_id(&self) -> UuidResult<String> {
        (**self).generate_id()
    }
}

impl<T: IdGenerator + ?Sized> IdGenerator for Box<T> {
    fn generate_ids(&self, count: usize) -> UuidResult<Vec<String>> {
        (**self).generate_ids(count)
    }

    fn generate_id(&self) -> UuidResult<String> {
        (**self).generate_id()
    }
}

impl<T: IdGenerator + ?Sized> IdGenerator for Arc<T> {
    fn generate_ids(&self, count: usize) -> UuidResult<Vec<String>> {
        (**self).generate_ids(count)
    }

    fn generate_id(&self) -> UuidResult<String> {
        (**self).generate_id()
    }
}

/// Production generator: every identifier is a fresh canonical v4 UUID.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidIdGenerator;

impl UuidIdGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl IdGenerator for UuidIdGenerator {
    fn generate_ids(&self, count: usize) -> UuidResult<Vec<String>> {
        Ok((0..count)
            .map(|_| ShardableUuid::new().to_string())
            .collect())
    }

    fn generate_id(&self) -> UuidResult<String> {
        Ok(ShardableUuid::new().to_string())
    }
}

/// Deterministic generator that hands out a fixed list of identifiers in order.
///
/// Batches are truncated once the list runs out, and [`IdGenerator::generate_id`] then reports
/// [`UuidError::Exhausted`]. The cursor is shared, so a pre-generated batch and later on-demand
/// requests never return the same identifier twice.
#[derive(Debug)]
pub struct SequenceIdGenerator {
    ids: Vec<String>,
    next: AtomicUsize,
}

impl SequenceIdGenerator {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
            next: AtomicUsize::new(0),
        }
    }

    /// Convenience constructor producing `"{prefix}1"`, `"{prefix}2"`, ... up to `count`.
    pub fn numbered(prefix: &str, count: usize) -> Self {
        Self::new((1..=count).map(|n| format!("{prefix}{n}")))
    }

    /// Number of identifiers not yet handed out.
    pub fn remaining(&self) -> usize {
        self.ids
            .len()
            .saturating_sub(self.next.load(Ordering::SeqCst))
    }
}

impl IdGenerator for SequenceIdGenerator {
    fn generate_ids(&self, count: usize) -> UuidResult<Vec<String>> {
        let start = self.next.fetch_add(count, Ordering::SeqCst).min(self.ids.len());
        let end = start.saturating_add(count).min(self.ids.len());
        Ok(self.ids[start..end].to_vec())
    }
}
