//! Stage 5: assignment metadata projection.
//!
//! Some question components play a role for the assignment as a whole (the school picker, the
//! completion date and time). Their question identifiers are copied onto the assignment. When
//! several questions share a role the last one in final order wins.

use serde::Serialize;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestionRole {
    SchoolSelector,
    CompletionDate,
    CompletionTime,
}

impl QuestionRole {
    pub const ALL: [QuestionRole; 3] = [
        QuestionRole::SchoolSelector,
        QuestionRole::CompletionDate,
        QuestionRole::CompletionTime,
    ];

    /// Component tag that carries this role.
    pub fn component(self) -> &'static str {
        match self {
            QuestionRole::SchoolSelector => "schoolSelector",
            QuestionRole::CompletionDate => "completionDate",
            QuestionRole::CompletionTime => "completionTime",
        }
    }

    /// Role of a component tag. Matching is exact.
    pub fn from_component(component: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.component() == component)
    }
}

impl fmt::Display for QuestionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.component())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct MetadataProjection {
    pub(crate) school_selector_id: Option<String>,
    pub(crate) completion_date_id: Option<String>,
    pub(crate) completion_time_id: Option<String>,
}

impl MetadataProjection {
    /// Records `id` as the holder of `role`, returning the identifier it replaced.
    pub(crate) fn record(&mut self, role: QuestionRole, id: &str) -> Option<String> {
        let slot = match role {
            QuestionRole::SchoolSelector => &mut self.school_selector_id,
            QuestionRole::CompletionDate => &mut self.completion_date_id,
            QuestionRole::CompletionTime => &mut self.completion_time_id,
        };
        slot.replace(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_component_is_exact() {
        assert_eq!(
            QuestionRole::from_component("schoolSelector"),
            Some(QuestionRole::SchoolSelector)
        );
        assert_eq!(
            QuestionRole::from_component("completionTime"),
            Some(QuestionRole::CompletionTime)
        );
        assert_eq!(QuestionRole::from_component("CompletionDate"), None);
        assert_eq!(QuestionRole::from_component("text"), None);
    }

    #[test]
    fn test_last_recorded_id_wins() {
        let mut projection = MetadataProjection::default();

        assert_eq!(projection.record(QuestionRole::CompletionDate, "d1"), None);
        assert_eq!(projection.record(QuestionRole::CompletionTime, "t1"), None);
        assert_eq!(
            projection.record(QuestionRole::CompletionDate, "d2"),
            Some("d1".to_string())
        );

        assert_eq!(projection.completion_date_id.as_deref(), Some("d2"));
        assert_eq!(projection.completion_time_id.as_deref(), Some("t1"));
        assert_eq!(projection.school_selector_id, None);
    }

    #[test]
    fn test_role_serialises_as_component_tag() {
        assert_eq!(
            serde_json::to_value(QuestionRole::SchoolSelector).unwrap(),
            serde_json::json!("schoolSelector")
        );
        assert_eq!(QuestionRole::CompletionTime.to_string(), "completionTime");
    }
}
