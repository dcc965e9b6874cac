//! Finalised questions, ready for storage and rendering.

use crate::conditional::Conditional;
use crate::options::QuestionOption;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One question after identifier resolution and numbering.
///
/// Serialised in camelCase with the draft's pass-through attributes flattened alongside the
/// resolved fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedQuestion {
    /// Permanent identifier, stable across edits of the same logical question.
    pub id: String,

    /// 1-based position in storage order.
    pub order: u32,

    /// Hierarchical number such as `3` or `3a`.
    pub question_number: String,

    pub page_number: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,

    /// Conditional rewritten to reference permanent identifiers only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional: Option<Conditional>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<QuestionOption>,

    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl ResolvedQuestion {
    /// Parent question identifier, for conditional questions.
    pub fn parent_id(&self) -> Option<&str> {
        self.conditional.as_ref().map(|c| c.field.as_str())
    }
}
