//! Conditional linkage between questions.
//!
//! Clients express "show this question when question X has answer Y" in two shapes:
//!
//! ```text
//! { "conditional": { "field": "q-7", "value": "Yes" } }              # nested
//! { "conditionalQuestionId": "q-7", "conditionalQuestionValue": "Yes" } # legacy flattened
//! ```
//!
//! [`ConditionalLink`] records which shape was used; [`ConditionalLink::into_conditional`]
//! collapses both into the canonical [`Conditional`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Legacy key holding the parent question identifier.
pub const LEGACY_CONDITIONAL_ID_KEY: &str = "conditionalQuestionId";

/// Legacy key holding the triggering answer.
pub const LEGACY_CONDITIONAL_VALUE_KEY: &str = "conditionalQuestionValue";

/// Answer(s) of the parent question that make a conditional question relevant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionalValue {
    One(String),
    Many(Vec<String>),
}

impl Default for ConditionalValue {
    fn default() -> Self {
        ConditionalValue::One(String::new())
    }
}

impl ConditionalValue {
    /// Lenient conversion from an arbitrary JSON value.
    ///
    /// Scalars are stringified, arrays keep their scalar members, anything else (including a
    /// missing value) becomes the empty string.
    pub fn from_json(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Array(items)) => {
                ConditionalValue::Many(items.iter().filter_map(scalar_to_string).collect())
            }
            Some(other) => ConditionalValue::One(scalar_to_string(other).unwrap_or_default()),
            None => ConditionalValue::default(),
        }
    }
}

/// Canonical conditional: `field` is the parent question identifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conditional {
    pub field: String,
    #[serde(default)]
    pub value: ConditionalValue,
}

/// Conditional logic as it arrived from the client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConditionalLink {
    /// `conditional: { field, value }`
    Nested(Conditional),
    /// `conditionalQuestionId` + `conditionalQuestionValue`
    Legacy(Conditional),
    /// Conditional logic was present but unusable.
    Malformed { reason: String },
}

impl ConditionalLink {
    /// Builds the link from the raw draft attributes.
    ///
    /// The nested shape wins when both shapes carry a usable parent identifier. A nested object
    /// without a parent identifier (for example `{ "field": "", "value": "" }`, which form editors
    /// send for unconditional questions) counts as absent.
    pub fn from_parts(
        nested: Option<&Value>,
        legacy_field: Option<&Value>,
        legacy_value: Option<&Value>,
    ) -> Option<Self> {
        let nested = match nested {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) => match identifier_from_json(map.get("field")) {
                Ok(Some(field)) => Some(ConditionalLink::Nested(Conditional {
                    field,
                    value: ConditionalValue::from_json(map.get("value")),
                })),
                Ok(None) => None,
                Err(kind) => Some(ConditionalLink::Malformed {
                    reason: format!("conditional.field must be a string, got {kind}"),
                }),
            },
            Some(other) => Some(ConditionalLink::Malformed {
                reason: format!("conditional must be an object, got {}", json_kind(other)),
            }),
        };

        if let Some(link @ ConditionalLink::Nested(_)) = nested {
            return Some(link);
        }

        let legacy = match identifier_from_json(legacy_field) {
            Ok(Some(field)) => Some(ConditionalLink::Legacy(Conditional {
                field,
                value: ConditionalValue::from_json(legacy_value),
            })),
            Ok(None) => None,
            Err(kind) => Some(ConditionalLink::Malformed {
                reason: format!("{LEGACY_CONDITIONAL_ID_KEY} must be a string, got {kind}"),
            }),
        };

        match (nested, legacy) {
            (_, Some(link @ ConditionalLink::Legacy(_))) => Some(link),
            (Some(malformed), _) => Some(malformed),
            (None, legacy) => legacy,
        }
    }

    /// Parent identifier this link refers to, if usable.
    pub fn references(&self) -> Option<&str> {
        match self {
            ConditionalLink::Nested(c) | ConditionalLink::Legacy(c) => Some(c.field.as_str()),
            ConditionalLink::Malformed { .. } => None,
        }
    }

    /// Collapses either shape into the canonical conditional.
    pub fn into_conditional(self) -> Option<Conditional> {
        match self {
            ConditionalLink::Nested(c) | ConditionalLink::Legacy(c) => Some(c),
            ConditionalLink::Malformed { .. } => None,
        }
    }
}

/// Reads an identifier that may arrive as a string or a number.
///
/// Blank strings and `null` are `Ok(None)`; other JSON types report their kind as the error.
pub(crate) fn identifier_from_json(value: Option<&Value>) -> Result<Option<String>, &'static str> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(json_kind(other)),
    }
}

pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
