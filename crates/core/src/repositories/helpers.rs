//! Directory allocation for stored assignments.

use crate::{AssignmentError, AssignmentResult};
use assess_uuid::ShardableUuid;
use std::{
    fs,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

/// Attempts made to allocate a fresh assignment directory.
const MAX_DIR_ALLOCATION_ATTEMPTS: usize = 5;

/// Creates a unique sharded directory within `base_dir`.
///
/// Identifiers come from `uuid_source`; a candidate whose directory already exists is skipped.
///
/// # Errors
///
/// Returns [`AssignmentError::AssignmentDirCreation`] if:
/// - no free directory was found after 5 attempts,
/// - a parent directory cannot be created.
pub(crate) fn create_unique_shared_dir(
    base_dir: &Path,
    mut uuid_source: impl FnMut() -> ShardableUuid,
) -> AssignmentResult<(ShardableUuid, PathBuf)> {
    for _attempt in 0..MAX_DIR_ALLOCATION_ATTEMPTS {
        let uuid = uuid_source();
        let candidate = uuid.sharded_dir(base_dir);

        if candidate.exists() {
            continue;
        }

        if let Some(parent) = candidate.parent() {
            fs::create_dir_all(parent).map_err(AssignmentError::AssignmentDirCreation)?;
        }

        match fs::create_dir(&candidate) {
            Ok(()) => return Ok((uuid, candidate)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(AssignmentError::AssignmentDirCreation(e)),
        }
    }

    Err(AssignmentError::AssignmentDirCreation(io::Error::new(
        ErrorKind::AlreadyExists,
        format!(
            "failed to allocate a unique assignment directory after {} attempts",
            MAX_DIR_ALLOCATION_ATTEMPTS
        ),
    )))
}
