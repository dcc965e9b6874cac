//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services as an
//! `Arc<CoreConfig>`. Request handling never reads process-wide environment variables, which
//! keeps the resolver deterministic under test harnesses and multi-threaded callers.

use crate::constants::{ASSIGNMENTS_DIR_NAME, DEFAULT_ASSIGNMENT_DATA_DIR, DEFAULT_TEMP_ID_PREFIXES};
use crate::validation::validate_temp_id_prefix;
use crate::{AssignmentError, AssignmentResult};
use assess_types::NonEmptyText;
use std::path::{Path, PathBuf};

/// Prefixes marking an identifier as temporary ("new, unsaved").
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TempIdPrefixes(Vec<NonEmptyText>);

impl TempIdPrefixes {
    /// Builds a validated prefix set.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentError::InvalidInput`] if `prefixes` is empty or any prefix fails
    /// [`validate_temp_id_prefix`].
    pub fn new(prefixes: Vec<NonEmptyText>) -> AssignmentResult<Self> {
        if prefixes.is_empty() {
            return Err(AssignmentError::InvalidInput(
                "at least one temporary id prefix is required".into(),
            ));
        }
        for prefix in &prefixes {
            validate_temp_id_prefix(prefix.as_str())?;
        }
        Ok(Self(prefixes))
    }

    /// True when `identifier` is a client-side placeholder.
    pub fn is_temporary(&self, identifier: &str) -> bool {
        self.0.iter().any(|p| identifier.starts_with(p.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(NonEmptyText::as_str)
    }
}

impl Default for TempIdPrefixes {
    fn default() -> Self {
        Self(
            DEFAULT_TEMP_ID_PREFIXES
                .iter()
                .filter_map(NonEmptyText::try_new)
                .collect(),
        )
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    assignment_data_dir: PathBuf,
    temp_id_prefixes: TempIdPrefixes,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    pub fn new(
        assignment_data_dir: PathBuf,
        temp_id_prefixes: TempIdPrefixes,
    ) -> AssignmentResult<Self> {
        if assignment_data_dir.as_os_str().is_empty() {
            return Err(AssignmentError::InvalidInput(
                "assignment_data_dir cannot be empty".into(),
            ));
        }

        Ok(Self {
            assignment_data_dir,
            temp_id_prefixes,
        })
    }

    pub fn assignment_data_dir(&self) -> &Path {
        &self.assignment_data_dir
    }

    pub fn assignments_dir(&self) -> PathBuf {
        self.assignment_data_dir.join(ASSIGNMENTS_DIR_NAME)
    }

    pub fn temp_id_prefixes(&self) -> &TempIdPrefixes {
        &self.temp_id_prefixes
    }
}

/// Resolve the data directory from an optional string value.
///
/// `None` or a blank value falls back to [`DEFAULT_ASSIGNMENT_DATA_DIR`].
pub fn assignment_data_dir_from_env_value(value: Option<String>) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSIGNMENT_DATA_DIR))
}

/// Parse temporary-id prefixes from an optional comma-separated value.
///
/// If `value` is `None` or blank, returns the default prefixes. Blank list entries are ignored.
pub fn temp_id_prefixes_from_env_value(value: Option<String>) -> AssignmentResult<TempIdPrefixes> {
    let prefixes: Vec<NonEmptyText> = value
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .filter_map(NonEmptyText::try_new)
        .collect();

    if prefixes.is_empty() {
        return Ok(TempIdPrefixes::default());
    }
    TempIdPrefixes::new(prefixes)
}
