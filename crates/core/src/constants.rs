//! Constants used throughout the assess core crate.

/// Directory name for stored assignments, below the data directory.
pub const ASSIGNMENTS_DIR_NAME: &str = "assignments";

/// Default data directory when none is configured.
pub const DEFAULT_ASSIGNMENT_DATA_DIR: &str = "assignment_data";

/// Filename of the stored assignment document.
pub const ASSIGNMENT_FILENAME: &str = "assignment.yaml";

/// Prefixes that mark an identifier as a client-side placeholder.
pub const DEFAULT_TEMP_ID_PREFIXES: &[&str] = &["new-", "new_", "temp-", "temp_", "tmp-"];

/// Page a question lands on when the draft does not say.
pub const DEFAULT_PAGE_NUMBER: u32 = 1;

/// Parent number used when a conditional question's parent has not been numbered yet.
pub const ORPHAN_PARENT_NUMBER: &str = "0";

/// On-demand identifier generation attempts per question before giving up.
pub const MAX_ID_ALLOCATION_ATTEMPTS: usize = 5;

/// Request body key holding the question drafts.
pub const QUESTIONS_KEY: &str = "questions";

/// Client-supplied question keys that are recomputed and never passed through.
pub const RESERVED_QUESTION_KEYS: &[&str] = &["questionNumber"];

/// Assignment keys owned by the resolver and the store.
pub const RESERVED_RECORD_KEYS: &[&str] = &[
    "id",
    QUESTIONS_KEY,
    "schoolSelectorId",
    "completionDateId",
    "completionTimeId",
    "createdAt",
    "updatedAt",
];
