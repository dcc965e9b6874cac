//! Stage 1: intake normalisation.
//!
//! Applies defaults and collapses the nested/legacy conditional shapes into the canonical
//! [`Conditional`](forms::Conditional). Later stages read only
//! [`WorkingQuestion::conditional`]; the legacy keys stay in the pass-through attributes.

use super::{Anomaly, WorkingQuestion};
use crate::constants::{DEFAULT_PAGE_NUMBER, RESERVED_QUESTION_KEYS};
use forms::{ConditionalLink, QuestionDraft};

pub(crate) fn normalise(
    drafts: Vec<QuestionDraft>,
    anomalies: &mut Vec<Anomaly>,
) -> Vec<WorkingQuestion> {
    drafts
        .into_iter()
        .enumerate()
        .map(|(position, mut draft)| {
            for issue in draft.intake_issues.drain(..) {
                tracing::warn!("question at position {}: {}", position, issue);
                anomalies.push(Anomaly::IntakeIssue { position, issue });
            }

            for key in RESERVED_QUESTION_KEYS {
                draft.attributes.remove(*key);
            }

            let conditional = match draft.conditional.take() {
                Some(ConditionalLink::Malformed { reason }) => {
                    tracing::warn!("question at position {}: {}", position, reason);
                    anomalies.push(Anomaly::MalformedConditional { position, reason });
                    None
                }
                Some(link @ ConditionalLink::Legacy(_)) => {
                    tracing::debug!("question at position {} uses legacy conditional keys", position);
                    link.into_conditional()
                }
                Some(link) => link.into_conditional(),
                None => None,
            };

            let fallback_order = u32::try_from(position + 1).unwrap_or(u32::MAX);

            WorkingQuestion {
                position,
                page_number: draft.page_number.unwrap_or(DEFAULT_PAGE_NUMBER),
                order: draft.order.unwrap_or(fallback_order),
                conditional,
                draft,
            }
        })
        .collect()
}
