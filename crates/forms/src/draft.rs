//! Question drafts as submitted by the assignment editor.
//!
//! Drafts are untrusted: every field is optional and loosely typed. Parsing never rejects an
//! individual draft. Anything unusable is recorded in [`QuestionDraft::intake_issues`] so that
//! one broken question cannot fail the whole assignment.

use crate::conditional::{
    identifier_from_json, json_kind, scalar_to_string, ConditionalLink,
    LEGACY_CONDITIONAL_ID_KEY, LEGACY_CONDITIONAL_VALUE_KEY,
};
use crate::options::{normalise_options, QuestionOption};
use crate::{FormsError, FormsResult};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Domain-level question draft.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuestionDraft {
    /// Identifier assigned by the editor (`clientId`).
    pub client_id: Option<String>,
    /// Identifier carried in the draft's own `id` attribute.
    pub local_id: Option<String>,
    pub label: Option<String>,
    /// Type tag (`text`, `optionSet`, `schoolSelector`, `completionDate`, ...).
    pub component: Option<String>,
    pub page_number: Option<u32>,
    /// Client ordering hint; never authoritative.
    pub order: Option<u32>,
    pub conditional: Option<ConditionalLink>,
    pub options: Vec<QuestionOption>,
    /// Pass-through attributes, copied verbatim (including legacy conditional keys).
    pub attributes: Map<String, Value>,
    /// Problems found while reading this draft.
    pub intake_issues: Vec<String>,
}

impl QuestionDraft {
    /// Identifiers this draft can be referenced by, preferred first.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.local_id
            .as_deref()
            .into_iter()
            .chain(self.client_id.as_deref())
    }

    /// True when `identifier` names this draft.
    pub fn answers_to(&self, identifier: &str) -> bool {
        self.identifiers().any(|id| id == identifier)
    }
}

/// Draft list operations.
///
/// Zero-sized namespace, mirroring how the other wire helpers are grouped.
pub struct Drafts;

impl Drafts {
    /// Parse a JSON document holding the draft list.
    ///
    /// # Errors
    ///
    /// Returns [`FormsError::InvalidJson`] for malformed JSON and [`FormsError::InvalidInput`] if
    /// the document is neither `null` nor an array.
    pub fn parse_json(text: &str) -> FormsResult<Vec<QuestionDraft>> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Convert an already-parsed JSON value into drafts.
    ///
    /// `null` is treated as an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`FormsError::InvalidInput`] if `value` is neither `null` nor an array.
    pub fn from_value(value: Value) -> FormsResult<Vec<QuestionDraft>> {
        match value {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => Ok(items.into_iter().map(draft_from_value).collect()),
            other => Err(FormsError::InvalidInput(format!(
                "questions must be a list, got {}",
                json_kind(&other)
            ))),
        }
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

/// Wire representation of one draft.
///
/// Known keys are captured as raw JSON and translated leniently; all other keys land in
/// `attributes`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionDraftWire {
    #[serde(default)]
    client_id: Option<Value>,
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    label: Option<Value>,
    #[serde(default)]
    component: Option<Value>,
    #[serde(default)]
    page_number: Option<Value>,
    #[serde(default)]
    order: Option<Value>,
    #[serde(default)]
    conditional: Option<Value>,
    #[serde(default)]
    options: Option<Value>,
    #[serde(flatten)]
    attributes: Map<String, Value>,
}

fn draft_from_value(value: Value) -> QuestionDraft {
    let mut issues = Vec::new();
    let wire = match value {
        Value::Object(_) => match QuestionDraftWire::deserialize(value) {
            Ok(wire) => wire,
            Err(e) => {
                issues.push(format!("question could not be read: {e}"));
                QuestionDraftWire::default()
            }
        },
        other => {
            issues.push(format!("question must be an object, got {}", json_kind(&other)));
            QuestionDraftWire::default()
        }
    };
    wire_to_domain(wire, issues)
}

fn wire_to_domain(wire: QuestionDraftWire, mut issues: Vec<String>) -> QuestionDraft {
    let client_id = lenient_identifier("clientId", wire.client_id.as_ref(), &mut issues);
    let local_id = lenient_identifier("id", wire.id.as_ref(), &mut issues);
    let label = lenient_text("label", wire.label.as_ref(), &mut issues);
    let component = lenient_text("component", wire.component.as_ref(), &mut issues);
    let page_number = lenient_position("pageNumber", wire.page_number.as_ref(), &mut issues);
    let order = lenient_position("order", wire.order.as_ref(), &mut issues);

    let conditional = ConditionalLink::from_parts(
        wire.conditional.as_ref(),
        wire.attributes.get(LEGACY_CONDITIONAL_ID_KEY),
        wire.attributes.get(LEGACY_CONDITIONAL_VALUE_KEY),
    );

    let options = normalise_options(wire.options.as_ref(), &mut issues);

    QuestionDraft {
        client_id,
        local_id,
        label,
        component,
        page_number,
        order,
        conditional,
        options,
        attributes: wire.attributes,
        intake_issues: issues,
    }
}

fn lenient_identifier(key: &str, value: Option<&Value>, issues: &mut Vec<String>) -> Option<String> {
    identifier_from_json(value).unwrap_or_else(|kind| {
        issues.push(format!("{key} must be a string, got {kind}"));
        None
    })
}

fn lenient_text(key: &str, value: Option<&Value>, issues: &mut Vec<String>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(v) => scalar_to_string(v).or_else(|| {
            issues.push(format!("{key} must be a string, got {}", json_kind(v)));
            None
        }),
    }
}

/// Reads a 1-based position that may arrive as a number or a numeric string.
fn lenient_position(key: &str, value: Option<&Value>, issues: &mut Vec<String>) -> Option<u32> {
    let parsed = match value {
        None | Some(Value::Null) => return None,
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Some(Value::String(s)) if s.trim().is_empty() => return None,
        Some(Value::String(s)) => s.trim().parse::<u32>().ok(),
        Some(_) => None,
    };

    if parsed.is_none() {
        issues.push(format!("{key} must be a non-negative integer"));
    }
    parsed
}
