//! Input validation utilities.
//!
//! Checks applied to operator-supplied configuration and request bodies before they reach the
//! resolver or the store.

use crate::{AssignmentError, AssignmentResult};
use serde_json::{Map, Value};

/// Validates a temporary-id prefix.
///
/// Prefixes are compared with `starts_with` against every client identifier, so they are kept
/// short and unambiguous:
/// - at most 32 characters
/// - ASCII only
/// - no whitespace or commas (commas separate prefixes in configuration)
///
/// # Errors
///
/// Returns [`AssignmentError::InvalidInput`] if the prefix is invalid.
pub fn validate_temp_id_prefix(prefix: &str) -> AssignmentResult<()> {
    const MAX_PREFIX_LEN: usize = 32;

    if prefix.is_empty() {
        return Err(AssignmentError::InvalidInput(
            "temporary id prefix cannot be empty".into(),
        ));
    }

    if prefix.len() > MAX_PREFIX_LEN {
        return Err(AssignmentError::InvalidInput(format!(
            "temporary id prefix exceeds maximum length of {} characters",
            MAX_PREFIX_LEN
        )));
    }

    if !prefix.is_ascii() {
        return Err(AssignmentError::InvalidInput(
            "temporary id prefix must contain only ASCII characters".into(),
        ));
    }

    if prefix.bytes().any(|b| b.is_ascii_whitespace() || b == b',') {
        return Err(AssignmentError::InvalidInput(
            "temporary id prefix must not contain whitespace or commas".into(),
        ));
    }

    Ok(())
}

/// Requires an assignment request body to be a JSON object and returns its fields.
///
/// # Errors
///
/// Returns [`AssignmentError::InvalidInput`] for any other JSON type.
pub fn require_object_body(body: Value) -> AssignmentResult<Map<String, Value>> {
    match body {
        Value::Object(map) => Ok(map),
        other => Err(AssignmentError::InvalidInput(format!(
            "assignment body must be a JSON object, got {}",
            match other {
                Value::Null => "null",
                Value::Bool(_) => "boolean",
                Value::Number(_) => "number",
                Value::String(_) => "string",
                Value::Array(_) => "array",
                Value::Object(_) => "object",
            }
        ))),
    }
}
