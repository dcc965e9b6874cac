//! Stage 3: identifier resolution.
//!
//! Every question leaves this stage with a permanent identifier:
//!
//! - the first non-temporary identifier it already carries (`id`, then `clientId`), unless an
//!   earlier question claimed it;
//! - otherwise the next identifier from a batch pre-generated for all questions that need one,
//!   falling back to on-demand generation when a batch slot is missing or unusable.
//!
//! Once a question's identifier is known, every conditional in the whole list that still names
//! one of its old identifiers is rewritten to the new one.

use super::{Anomaly, WorkingQuestion};
use crate::config::TempIdPrefixes;
use crate::constants::MAX_ID_ALLOCATION_ATTEMPTS;
use crate::{AssignmentError, AssignmentResult};
use assess_uuid::IdGenerator;
use std::collections::{BTreeMap, HashSet};

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct IdentifiedQuestion {
    pub(crate) id: String,
    pub(crate) question: WorkingQuestion,
}

pub(crate) fn resolve_identifiers<G: IdGenerator>(
    mut questions: Vec<WorkingQuestion>,
    generator: &G,
    temp_id_prefixes: &TempIdPrefixes,
    anomalies: &mut Vec<Anomaly>,
) -> AssignmentResult<(Vec<IdentifiedQuestion>, BTreeMap<String, String>)> {
    let (kept, kept_ids) = keep_permanent_ids(&questions, temp_id_prefixes, anomalies);

    // Minted identifiers must not collide with anything the client sent.
    let mut reserved: HashSet<String> = questions
        .iter()
        .flat_map(|q| {
            q.draft
                .identifiers()
                .chain(q.conditional.as_ref().map(|c| c.field.as_str()))
        })
        .map(str::to_string)
        .collect();

    let needed = kept.iter().filter(|id| id.is_none()).count();
    let mut pool = if needed > 0 {
        generator.generate_ids(needed)?.into_iter()
    } else {
        Vec::new().into_iter()
    };

    let mut ids = Vec::with_capacity(questions.len());
    for (question, kept_id) in questions.iter().zip(kept) {
        let id = match kept_id {
            Some(id) => id,
            None => {
                let id = match pool.next() {
                    Some(slot) if is_usable(&slot, &reserved) => slot,
                    slot => {
                        let reason = match slot {
                            None => "pre-generated identifiers ran out".to_string(),
                            Some(slot) if slot.trim().is_empty() => {
                                "pre-generated identifier was blank".to_string()
                            }
                            Some(slot) => format!("pre-generated identifier {slot} is already in use"),
                        };
                        tracing::warn!(
                            "question at position {}: {}; generating on demand",
                            question.position,
                            reason
                        );
                        anomalies.push(Anomaly::IdentifierFallback {
                            position: question.position,
                            reason,
                        });
                        allocate_on_demand(generator, &reserved)?
                    }
                };
                reserved.insert(id.clone());
                id
            }
        };
        ids.push(id);
    }

    let mut id_mapping = BTreeMap::new();
    for (index, id) in ids.iter().enumerate() {
        let aliases: Vec<String> = questions[index]
            .draft
            .identifiers()
            .filter(|alias| *alias != id && !kept_ids.contains(*alias))
            .map(str::to_string)
            .collect();

        for alias in aliases {
            rewrite_references(&mut questions, &alias, id);
            id_mapping.entry(alias).or_insert_with(|| id.clone());
        }
    }

    let identified = questions
        .into_iter()
        .zip(ids)
        .map(|(question, id)| IdentifiedQuestion { id, question })
        .collect();

    Ok((identified, id_mapping))
}

/// Decides which questions keep an identifier they already carry.
///
/// Returns one slot per question plus the set of kept identifiers.
fn keep_permanent_ids(
    questions: &[WorkingQuestion],
    temp_id_prefixes: &TempIdPrefixes,
    anomalies: &mut Vec<Anomaly>,
) -> (Vec<Option<String>>, HashSet<String>) {
    let mut kept_ids = HashSet::new();
    let kept = questions
        .iter()
        .map(|question| {
            let permanent: Vec<&str> = question
                .draft
                .identifiers()
                .filter(|id| !temp_id_prefixes.is_temporary(id))
                .collect();

            match permanent.iter().find(|id| !kept_ids.contains(**id)) {
                Some(id) => {
                    kept_ids.insert(id.to_string());
                    Some(id.to_string())
                }
                None => {
                    if let Some(identifier) = permanent.first() {
                        tracing::warn!(
                            "question at position {} reuses identifier {}; a new one will be minted",
                            question.position,
                            identifier
                        );
                        anomalies.push(Anomaly::DuplicateIdentifier {
                            position: question.position,
                            identifier: identifier.to_string(),
                        });
                    }
                    None
                }
            }
        })
        .collect();
    (kept, kept_ids)
}

fn is_usable(candidate: &str, reserved: &HashSet<String>) -> bool {
    !candidate.trim().is_empty() && !reserved.contains(candidate)
}

fn allocate_on_demand<G: IdGenerator>(
    generator: &G,
    reserved: &HashSet<String>,
) -> AssignmentResult<String> {
    for _ in 0..MAX_ID_ALLOCATION_ATTEMPTS {
        let candidate = generator.generate_id()?;
        if is_usable(&candidate, reserved) {
            return Ok(candidate);
        }
    }
    Err(AssignmentError::IdAllocation {
        attempts: MAX_ID_ALLOCATION_ATTEMPTS,
    })
}

fn rewrite_references(questions: &mut [WorkingQuestion], from: &str, to: &str) {
    questions
        .iter_mut()
        .filter_map(|q| q.conditional.as_mut())
        .filter(|c| c.field == from)
        .for_each(|c| c.field = to.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::intake::normalise;
    use assess_uuid::{SequenceIdGenerator, UuidResult};
    use forms::Drafts;
    use serde_json::json;

    struct Constant(&'static str);

    impl IdGenerator for Constant {
        fn generate_ids(&self, count: usize) -> UuidResult<Vec<String>> {
            Ok(vec![self.0.to_string(); count])
        }
    }

    fn resolve<G: IdGenerator>(
        generator: G,
        value: serde_json::Value,
    ) -> AssignmentResult<(Vec<IdentifiedQuestion>, BTreeMap<String, String>, Vec<Anomaly>)> {
        let mut anomalies = Vec::new();
        let questions = normalise(Drafts::from_value(value).unwrap(), &mut anomalies);
        let (identified, mapping) = resolve_identifiers(
            questions,
            &generator,
            &TempIdPrefixes::default(),
            &mut anomalies,
        )?;
        Ok((identified, mapping, anomalies))
    }

    fn ids(identified: &[IdentifiedQuestion]) -> Vec<&str> {
        identified.iter().map(|q| q.id.as_str()).collect()
    }

    #[test]
    fn test_pool_is_consumed_in_order_for_temporary_ids_only() {
        let (identified, mapping, anomalies) = resolve(
            SequenceIdGenerator::numbered("perm-", 2),
            json!([
                { "clientId": "new-1" },
                { "id": "kept" },
                { "clientId": "tmp-2" },
            ]),
        )
        .unwrap();

        assert_eq!(ids(&identified), vec!["perm-1", "kept", "perm-2"]);
        assert_eq!(mapping.get("new-1").map(String::as_str), Some("perm-1"));
        assert_eq!(mapping.get("tmp-2").map(String::as_str), Some("perm-2"));
        assert!(anomalies.is_empty());
    }

    #[test]
    fn test_question_without_identifiers_is_minted() {
        let (identified, mapping, _) =
            resolve(SequenceIdGenerator::numbered("perm-", 1), json!([{ "label": "x" }]))
                .unwrap();

        assert_eq!(ids(&identified), vec!["perm-1"]);
        assert!(mapping.is_empty());
    }

    #[test]
    fn test_client_id_of_kept_question_is_rewritten_everywhere() {
        let (identified, mapping, _) = resolve(
            SequenceIdGenerator::numbered("perm-", 2),
            json!([
                { "conditional": { "field": "new-7", "value": "x" } },
                { "id": "abc", "clientId": "new-7" },
                { "conditionalQuestionId": "new-7" },
            ]),
        )
        .unwrap();

        assert_eq!(identified[1].id, "abc");
        let parents: Vec<_> = identified
            .iter()
            .map(|q| q.question.conditional.as_ref().map(|c| c.field.as_str()))
            .collect();
        assert_eq!(parents, vec![Some("abc"), None, Some("abc")]);
        assert_eq!(mapping.get("new-7").map(String::as_str), Some("abc"));
    }

    #[test]
    fn test_duplicate_permanent_id_is_reminted() {
        let (identified, mapping, anomalies) = resolve(
            SequenceIdGenerator::numbered("perm-", 2),
            json!([
                { "id": "dup" },
                { "id": "dup" },
                { "conditional": { "field": "dup", "value": "x" } },
            ]),
        )
        .unwrap();

        assert_eq!(identified[0].id, "dup");
        assert_eq!(identified[1].id, "perm-1");
        assert_eq!(
            identified[2].question.conditional.as_ref().map(|c| c.field.as_str()),
            Some("dup")
        );
        assert!(!mapping.contains_key("dup"));
        assert_eq!(
            anomalies,
            vec![Anomaly::DuplicateIdentifier {
                position: 1,
                identifier: "dup".into()
            }]
        );
    }

    #[test]
    fn test_colliding_pool_slot_falls_back_to_on_demand() {
        let (identified, _, anomalies) = resolve(
            SequenceIdGenerator::new(["taken", "fresh"]),
            json!([{ "id": "taken" }, { "clientId": "new-1" }]),
        )
        .unwrap();

        assert_eq!(ids(&identified), vec!["taken", "fresh"]);
        assert!(matches!(
            anomalies.as_slice(),
            [Anomaly::IdentifierFallback { position: 1, .. }]
        ));
    }

    #[test]
    fn test_minted_id_never_reuses_referenced_identifier() {
        let (identified, _, _) = resolve(
            SequenceIdGenerator::new(["ghost", "fresh"]),
            json!([{ "clientId": "new-1", "conditional": { "field": "ghost", "value": "x" } }]),
        )
        .unwrap();

        assert_eq!(ids(&identified), vec!["fresh"]);
    }

    #[test]
    fn test_allocation_gives_up_after_bounded_attempts() {
        let err = resolve(Constant("same"), json!([{ "id": "same" }, { "clientId": "new-1" }]))
            .unwrap_err();

        assert!(matches!(
            err,
            AssignmentError::IdAllocation {
                attempts: MAX_ID_ALLOCATION_ATTEMPTS
            }
        ));
    }

    #[test]
    fn test_generator_not_called_when_nothing_to_mint() {
        let generator = SequenceIdGenerator::numbered("perm-", 3);
        let (identified, _, _) = resolve(&generator, json!([{ "id": "a" }, { "id": "b" }])).unwrap();

        assert_eq!(ids(&identified), vec!["a", "b"]);
        assert_eq!(generator.remaining(), 3);
    }
}
