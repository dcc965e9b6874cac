//! Selectable options of option-set questions.
//!
//! Options arrive either as a list (`["Yes", "No"]` or `[{ "label": "Yes", "value": "y" }]`) or as
//! one delimited string (`"Yes;No; Maybe"`). Both normalise to a list of [`QuestionOption`].

use crate::conditional::{json_kind, scalar_to_string};
use assess_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Separators recognised in the delimited string form.
pub const OPTION_DELIMITERS: &[char] = &[';', '\n', '\r'];

/// One selectable option.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub label: NonEmptyText,
    pub value: String,
}

impl QuestionOption {
    /// Option whose stored value equals its label.
    pub fn plain(label: NonEmptyText) -> Self {
        let value = label.as_str().to_string();
        Self { label, value }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OptionsWire {
    Delimited(String),
    List(Vec<OptionEntryWire>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OptionEntryWire {
    Text(String),
    Scalar(Value),
}

/// Normalises the raw `options` attribute.
///
/// Entries are trimmed and blank entries dropped. For `{label, value}` objects a missing value
/// defaults to the label and a missing label to the value. Unusable input is reported in
/// `issues` and contributes no options.
pub fn normalise_options(raw: Option<&Value>, issues: &mut Vec<String>) -> Vec<QuestionOption> {
    let raw = match raw {
        None | Some(Value::Null) => return Vec::new(),
        Some(raw) => raw,
    };

    let wire = match OptionsWire::deserialize(raw) {
        Ok(wire) => wire,
        Err(_) => {
            issues.push(format!(
                "options must be a list or a delimited string, got {}",
                json_kind(raw)
            ));
            return Vec::new();
        }
    };

    match wire {
        OptionsWire::Delimited(text) => text
            .split(OPTION_DELIMITERS)
            .filter_map(NonEmptyText::try_new)
            .map(QuestionOption::plain)
            .collect(),
        OptionsWire::List(entries) => entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match entry {
                OptionEntryWire::Text(text) => {
                    NonEmptyText::try_new(text).map(QuestionOption::plain)
                }
                OptionEntryWire::Scalar(Value::Object(map)) => {
                    let label = map.get("label").and_then(scalar_to_string);
                    let value = map.get("value").and_then(scalar_to_string);
                    option_from_pair(label, value)
                }
                OptionEntryWire::Scalar(Value::Null) => None,
                OptionEntryWire::Scalar(other) => match scalar_to_string(&other) {
                    Some(text) => NonEmptyText::try_new(text).map(QuestionOption::plain),
                    None => {
                        issues.push(format!(
                            "options[{index}] must be a string or an object, got {}",
                            json_kind(&other)
                        ));
                        None
                    }
                },
            })
            .collect(),
    }
}

fn option_from_pair(label: Option<String>, value: Option<String>) -> Option<QuestionOption> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let label = label
        .as_deref()
        .and_then(NonEmptyText::try_new)
        .or_else(|| value.as_deref().and_then(NonEmptyText::try_new))?;
    let value = value.unwrap_or_else(|| label.as_str().to_string());
    Some(QuestionOption { label, value })
}
