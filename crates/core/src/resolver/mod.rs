//! Question graph resolution.
//!
//! Runs once per assignment create/update and turns the editor's draft list into the stored
//! question list. The stages run strictly in sequence, each one consuming the list produced by
//! the previous stage:
//!
//! 1. `intake`: page defaults, canonical conditional shape
//! 2. `reorder`: move dependents after their parent (single best-effort pass)
//! 3. `identifiers`: keep or mint permanent ids, rewrite references
//! 4. `numbering`: hierarchical question numbers (`3`, `3a`, ...)
//! 5. `metadata`: project well-known question roles onto the assignment
//!
//! All state lives in locals of [`QuestionGraphResolver::resolve`], so one resolver can serve
//! concurrent requests. The only source of non-determinism is the injected [`IdGenerator`].
//!
//! Malformed conditional wiring never fails resolution. Every degraded case is reported as an
//! [`Anomaly`] in the result and logged.

mod identifiers;
mod intake;
mod metadata;
mod numbering;
mod reorder;

use crate::config::{CoreConfig, TempIdPrefixes};
use crate::AssignmentResult;
use assess_uuid::IdGenerator;
use forms::{Conditional, Drafts, QuestionDraft, ResolvedQuestion};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

pub use metadata::QuestionRole;

/// Question as it moves through the pipeline.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct WorkingQuestion {
    /// Index in the submitted list.
    pub(crate) position: usize,
    pub(crate) draft: QuestionDraft,
    pub(crate) page_number: u32,
    pub(crate) order: u32,
    /// Canonical conditional; the only linkage later stages consult.
    pub(crate) conditional: Option<Conditional>,
}

/// Degraded-but-accepted situations met while resolving.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Anomaly {
    /// A field of the draft could not be read and was ignored.
    IntakeIssue { position: usize, issue: String },
    /// Conditional logic was present but unusable; the question is treated as top-level.
    MalformedConditional { position: usize, reason: String },
    /// A permanent identifier was already claimed by an earlier question.
    DuplicateIdentifier { position: usize, identifier: String },
    /// The pre-generated identifier for this question could not be used.
    IdentifierFallback { position: usize, reason: String },
    /// The parent had not been numbered when the child was reached; numbered under `"0"`.
    ParentNotFound {
        question_id: String,
        parent_id: String,
        question_number: String,
    },
    /// A later question took over a role held by an earlier one.
    RoleReassigned {
        role: QuestionRole,
        previous_id: String,
        current_id: String,
    },
}

/// Output of one resolution pass.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedQuestionSet {
    /// Final storage order; `order` equals array position + 1.
    pub questions: Vec<ResolvedQuestion>,
    pub school_selector_id: Option<String>,
    pub completion_date_id: Option<String>,
    pub completion_time_id: Option<String>,
    /// Originating identifier -> permanent identifier, for identifiers that changed.
    pub id_mapping: BTreeMap<String, String>,
    pub anomalies: Vec<Anomaly>,
}

/// Resolves draft lists into stored question lists.
#[derive(Clone, Debug)]
pub struct QuestionGraphResolver<G> {
    generator: G,
    temp_id_prefixes: TempIdPrefixes,
}

impl<G: IdGenerator> QuestionGraphResolver<G> {
    pub fn new(generator: G, temp_id_prefixes: TempIdPrefixes) -> Self {
        Self {
            generator,
            temp_id_prefixes,
        }
    }

    pub fn from_config(generator: G, cfg: &CoreConfig) -> Self {
        Self::new(generator, cfg.temp_id_prefixes().clone())
    }

    /// Resolves the raw `questions` value of a request body.
    ///
    /// `null` is an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AssignmentError::Forms`] if `value` is neither `null` nor an array, and
    /// propagates identifier generator failures.
    pub fn resolve_value(&self, value: Value) -> AssignmentResult<ResolvedQuestionSet> {
        let drafts = Drafts::from_value(value)?;
        self.resolve(drafts)
    }

    /// Resolves drafts into permanent, numbered, dependency-ordered questions.
    ///
    /// Exactly one question is produced per draft.
    ///
    /// # Errors
    ///
    /// Only identifier generation can fail: either the generator errors outright, or it cannot
    /// produce an unused identifier within
    /// [`MAX_ID_ALLOCATION_ATTEMPTS`](crate::constants::MAX_ID_ALLOCATION_ATTEMPTS).
    pub fn resolve(&self, drafts: Vec<QuestionDraft>) -> AssignmentResult<ResolvedQuestionSet> {
        let mut anomalies = Vec::new();

        let normalised = intake::normalise(drafts, &mut anomalies);
        let ordered = reorder::reorder_dependents(normalised);
        let (identified, id_mapping) = identifiers::resolve_identifiers(
            ordered,
            &self.generator,
            &self.temp_id_prefixes,
            &mut anomalies,
        )?;

        let mut numbering = numbering::NumberingEngine::new();
        let mut projection = metadata::MetadataProjection::default();

        let questions: Vec<ResolvedQuestion> = identified
            .into_iter()
            .map(|identified| {
                let identifiers::IdentifiedQuestion { id, question } = identified;
                let parent_id = question.conditional.as_ref().map(|c| c.field.as_str());
                let numbered = numbering.number(&id, parent_id);

                if let (Some(parent_id), false) = (parent_id, numbered.parent_found) {
                    tracing::warn!(
                        "question {} refers to unnumbered parent {}; numbered {}",
                        id,
                        parent_id,
                        numbered.question_number
                    );
                    anomalies.push(Anomaly::ParentNotFound {
                        question_id: id.clone(),
                        parent_id: parent_id.to_string(),
                        question_number: numbered.question_number.clone(),
                    });
                }

                let role = question
                    .draft
                    .component
                    .as_deref()
                    .and_then(QuestionRole::from_component);
                if let Some(role) = role {
                    if let Some(previous_id) = projection.record(role, &id) {
                        tracing::warn!(
                            "question {} replaces {} as the {} question",
                            id,
                            previous_id,
                            role
                        );
                        anomalies.push(Anomaly::RoleReassigned {
                            role,
                            previous_id,
                            current_id: id.clone(),
                        });
                    }
                }

                let draft = question.draft;
                ResolvedQuestion {
                    id,
                    order: question.order,
                    question_number: numbered.question_number,
                    page_number: question.page_number,
                    label: draft.label,
                    component: draft.component,
                    conditional: question.conditional,
                    options: draft.options,
                    attributes: draft.attributes,
                }
            })
            .collect();

        tracing::debug!(
            "resolved {} questions ({} identifiers remapped, {} anomalies)",
            questions.len(),
            id_mapping.len(),
            anomalies.len()
        );

        Ok(ResolvedQuestionSet {
            questions,
            school_selector_id: projection.school_selector_id,
            completion_date_id: projection.completion_date_id,
            completion_time_id: projection.completion_time_id,
            id_mapping,
            anomalies,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assess_uuid::{SequenceIdGenerator, UuidIdGenerator};
    use serde_json::json;
    use std::collections::{HashMap, HashSet};

    fn resolver(ids: usize) -> QuestionGraphResolver<SequenceIdGenerator> {
        QuestionGraphResolver::new(
            SequenceIdGenerator::numbered("perm-", ids),
            TempIdPrefixes::default(),
        )
    }

    fn numbers(set: &ResolvedQuestionSet) -> Vec<&str> {
        set.questions
            .iter()
            .map(|q| q.question_number.as_str())
            .collect()
    }

    #[test]
    fn test_empty_and_null_input_resolve_to_empty_set() {
        let set = resolver(0).resolve_value(Value::Null).unwrap();
        assert!(set.questions.is_empty());
        assert_eq!(set.school_selector_id, None);

        let set = resolver(0).resolve(Vec::new()).unwrap();
        assert!(set.questions.is_empty());
        assert!(set.anomalies.is_empty());
    }

    #[test]
    fn test_non_list_input_is_an_error() {
        let err = resolver(1).resolve_value(json!("q1")).unwrap_err();
        assert!(matches!(err, crate::AssignmentError::Forms(_)));
    }

    #[test]
    fn test_top_level_questions_number_sequentially() {
        let set = resolver(3)
            .resolve_value(json!([{ "label": "A" }, { "label": "B" }, { "label": "C" }]))
            .unwrap();

        assert_eq!(numbers(&set), vec!["1", "2", "3"]);
        let labels: Vec<_> = set.questions.iter().map(|q| q.label.as_deref()).collect();
        assert_eq!(labels, vec![Some("A"), Some("B"), Some("C")]);
    }

    #[test]
    fn test_conditional_children_get_letter_suffixes() {
        let set = resolver(4)
            .resolve_value(json!([
                { "clientId": "new-1" },
                { "clientId": "new-2" },
                { "clientId": "new-3", "conditional": { "field": "new-2", "value": "Yes" } },
                { "clientId": "new-4", "conditional": { "field": "new-2", "value": "No" } },
            ]))
            .unwrap();

        assert_eq!(numbers(&set), vec!["1", "2", "2a", "2b"]);
    }

    #[test]
    fn test_reference_to_temporary_id_is_rewritten() {
        let set = QuestionGraphResolver::new(
            SequenceIdGenerator::new(["perm-9", "perm-10"]),
            TempIdPrefixes::default(),
        )
        .resolve_value(json!([
            { "clientId": "new-1", "label": "A" },
            { "clientId": "new-2", "label": "B", "conditional": { "field": "new-1", "value": "Yes" } },
        ]))
        .unwrap();

        assert_eq!(set.questions[0].id, "perm-9");
        assert_eq!(set.questions[1].parent_id(), Some("perm-9"));
        assert_eq!(set.id_mapping.get("new-1").map(String::as_str), Some("perm-9"));
    }

    #[test]
    fn test_forward_reference_is_reordered_and_numbered_under_parent() {
        let set = resolver(2)
            .resolve_value(json!([
                { "clientId": "new-2", "label": "child", "conditional": { "field": "new-1", "value": "Yes" } },
                { "clientId": "new-1", "label": "parent" },
            ]))
            .unwrap();

        let labels: Vec<_> = set.questions.iter().map(|q| q.label.as_deref()).collect();
        assert_eq!(labels, vec![Some("parent"), Some("child")]);
        assert_eq!(numbers(&set), vec!["1", "1a"]);
        assert_eq!(set.questions[1].order, 2);
    }

    #[test]
    fn test_orphan_reference_numbers_under_zero() {
        let set = resolver(2)
            .resolve_value(json!([
                { "label": "top" },
                { "label": "orphan", "conditional": { "field": "missing", "value": "Yes" } },
            ]))
            .unwrap();

        assert_eq!(numbers(&set), vec!["1", "0a"]);
        assert_eq!(set.questions[1].parent_id(), Some("missing"));
        assert!(set.anomalies.iter().any(|a| matches!(
            a,
            Anomaly::ParentNotFound { parent_id, question_number, .. }
                if parent_id == "missing" && question_number == "0a"
        )));
    }

    #[test]
    fn test_chained_forward_reference_keeps_degraded_numbering() {
        // C depends on B, B depends on A, listed C, B, A. The single pass moves C behind B,
        // then B behind A, which leaves C ahead of its parent again.
        let set = resolver(3)
            .resolve_value(json!([
                { "clientId": "new-c", "label": "C", "conditional": { "field": "new-b", "value": "x" } },
                { "clientId": "new-b", "label": "B", "conditional": { "field": "new-a", "value": "x" } },
                { "clientId": "new-a", "label": "A" },
            ]))
            .unwrap();

        let labels: Vec<_> = set.questions.iter().map(|q| q.label.as_deref()).collect();
        assert_eq!(labels, vec![Some("C"), Some("A"), Some("B")]);
        assert_eq!(numbers(&set), vec!["0a", "1", "1a"]);
    }

    #[test]
    fn test_permanent_ids_are_preserved() {
        let set = resolver(1)
            .resolve_value(json!([
                { "id": "64f1c2aa", "label": "kept" },
                { "clientId": "new-1", "conditional": { "field": "64f1c2aa", "value": "Yes" } },
            ]))
            .unwrap();

        assert_eq!(set.questions[0].id, "64f1c2aa");
        assert_eq!(set.questions[1].id, "perm-1");
        assert_eq!(set.questions[1].parent_id(), Some("64f1c2aa"));
        assert_eq!(numbers(&set), vec!["1", "1a"]);
        assert!(!set.id_mapping.contains_key("64f1c2aa"));
    }

    #[test]
    fn test_completion_date_projection_last_wins() {
        let set = resolver(3)
            .resolve_value(json!([
                { "id": "d1", "component": "completionDate" },
                { "id": "s1", "component": "schoolSelector" },
                { "id": "d2", "component": "completionDate" },
            ]))
            .unwrap();

        assert_eq!(set.completion_date_id.as_deref(), Some("d2"));
        assert_eq!(set.school_selector_id.as_deref(), Some("s1"));
        assert_eq!(set.completion_time_id, None);
        assert!(set.anomalies.iter().any(|a| matches!(
            a,
            Anomaly::RoleReassigned { role: QuestionRole::CompletionDate, previous_id, current_id }
                if previous_id == "d1" && current_id == "d2"
        )));
    }

    #[test]
    fn test_twenty_seven_children_overflow_to_numeral() {
        let mut drafts = vec![json!({ "id": "p" })];
        for n in 0..27 {
            drafts.push(json!({ "id": format!("c{n}"), "conditional": { "field": "p", "value": "x" } }));
        }

        let set = resolver(0).resolve_value(Value::Array(drafts)).unwrap();
        let nums = numbers(&set);

        assert_eq!(nums[1], "1a");
        assert_eq!(nums[26], "1z");
        assert_eq!(nums[27], "127");
    }

    #[test]
    fn test_pass_through_attributes_and_options_survive() {
        let set = resolver(1)
            .resolve_value(json!([{
                "clientId": "new-1",
                "label": "Exits clear?",
                "component": "optionSet",
                "options": "Yes;No; Maybe",
                "required": true,
                "critical": true,
                "questionNumber": "99"
            }]))
            .unwrap();

        let question = &set.questions[0];
        let labels: Vec<_> = question.options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["Yes", "No", "Maybe"]);
        assert_eq!(question.attributes.get("required"), Some(&json!(true)));
        assert_eq!(question.attributes.get("critical"), Some(&json!(true)));
        assert!(!question.attributes.contains_key("questionNumber"));
        assert_eq!(question.question_number, "1");
        assert_eq!(question.page_number, 1);
    }

    #[test]
    fn test_generator_failure_is_propagated() {
        let err = QuestionGraphResolver::new(
            SequenceIdGenerator::new(Vec::<String>::new()),
            TempIdPrefixes::default(),
        )
        .resolve_value(json!([{ "clientId": "new-1" }]))
        .unwrap_err();

        assert!(matches!(err, crate::AssignmentError::Identifier(_)));
    }

    #[test]
    fn test_invariants_hold_for_mixed_input() {
        let input = json!([
            { "clientId": "new-5", "conditional": { "field": "new-3", "value": "a" } },
            { "id": "keep-1" },
            { "clientId": "new-3", "conditional": { "field": "keep-1", "value": "b" } },
            { "conditionalQuestionId": "new-3", "conditionalQuestionValue": "c" },
            { "id": "keep-1" },
            "not an object",
            { "clientId": "new-9", "conditional": { "field": "nowhere", "value": "d" } },
            { "id": 17, "pageNumber": null },
        ]);
        let len = input.as_array().map(Vec::len).unwrap_or_default();

        let set = QuestionGraphResolver::new(UuidIdGenerator::new(), TempIdPrefixes::default())
            .resolve_value(input)
            .unwrap();

        // Totality
        assert_eq!(set.questions.len(), len);

        // Unique ids
        let ids: HashSet<_> = set.questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids.len(), len);

        // Contiguous order
        for (index, question) in set.questions.iter().enumerate() {
            assert_eq!(question.order as usize, index + 1);
        }

        // Every resolvable parent appears strictly earlier
        let order_by_id: HashMap<_, _> = set
            .questions
            .iter()
            .map(|q| (q.id.as_str(), q.order))
            .collect();
        for question in &set.questions {
            if let Some(parent_order) = question.parent_id().and_then(|p| order_by_id.get(p)) {
                assert!(
                    *parent_order < question.order,
                    "parent of {} must come first",
                    question.id
                );
            }
        }

        // Numeric id became a kept permanent id
        assert!(ids.contains("17"));
    }
}
