//! Assignment create/update/get.
//!
//! [`AssignmentService`] glues the request body, the [`QuestionGraphResolver`] and an
//! [`AssignmentStore`] together. The service owns the projected question ids and timestamps;
//! clients cannot set them directly.

use crate::config::CoreConfig;
use crate::constants::{QUESTIONS_KEY, RESERVED_RECORD_KEYS};
use crate::repositories::AssignmentStore;
use crate::resolver::{Anomaly, QuestionGraphResolver, ResolvedQuestionSet};
use crate::validation::require_object_body;
use crate::{AssignmentError, AssignmentResult};
use assess_uuid::{IdGenerator, ShardableUuid};
use chrono::{DateTime, Utc};
use forms::ResolvedQuestion;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Stored assignment document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRecord {
    pub questions: Vec<ResolvedQuestion>,
    #[serde(default)]
    pub school_selector_id: Option<String>,
    #[serde(default)]
    pub completion_date_id: Option<String>,
    #[serde(default)]
    pub completion_time_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Free-form assignment fields (title, schedule, ...), stored verbatim.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl AssignmentRecord {
    fn apply(&mut self, resolved: ResolvedQuestionSet) -> (BTreeMap<String, String>, Vec<Anomaly>) {
        self.questions = resolved.questions;
        self.school_selector_id = resolved.school_selector_id;
        self.completion_date_id = resolved.completion_date_id;
        self.completion_time_id = resolved.completion_time_id;
        (resolved.id_mapping, resolved.anomalies)
    }
}

/// Outcome of a create or update.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedAssignment {
    pub id: ShardableUuid,
    pub record: AssignmentRecord,
    /// Identifiers replaced during this save. Empty when the questions were not resubmitted.
    pub id_mapping: BTreeMap<String, String>,
    pub anomalies: Vec<Anomaly>,
}

pub struct AssignmentService<S, G> {
    store: S,
    resolver: QuestionGraphResolver<G>,
}

impl<S: AssignmentStore, G: IdGenerator> AssignmentService<S, G> {
    pub fn new(cfg: Arc<CoreConfig>, store: S, generator: G) -> Self {
        Self {
            store,
            resolver: QuestionGraphResolver::from_config(generator, &cfg),
        }
    }

    /// Creates an assignment from a request body.
    ///
    /// `questions` is resolved; other keys are stored as free-form fields. Keys the service owns
    /// (projected question ids, timestamps, `id`) are ignored.
    ///
    /// # Errors
    ///
    /// Returns `AssignmentError` if:
    /// - the body is not a JSON object or `questions` is not a list,
    /// - `id` is not a canonical UUID, or an assignment already exists under it,
    /// - identifier generation fails,
    /// - the record cannot be written.
    pub fn create(&self, body: Value, id: Option<&str>) -> AssignmentResult<SavedAssignment> {
        let id = id.map(parse_assignment_id).transpose()?;
        if let Some(id) = &id {
            if self.store.exists(id) {
                return Err(AssignmentError::AlreadyExists(id.to_string()));
            }
        }

        let (questions, fields) = split_body(body)?;
        let resolved = self.resolver.resolve_value(questions.unwrap_or(Value::Null))?;

        let now = Utc::now();
        let mut record = AssignmentRecord {
            questions: Vec::new(),
            school_selector_id: None,
            completion_date_id: None,
            completion_time_id: None,
            created_at: now,
            updated_at: now,
            fields,
        };
        let (id_mapping, anomalies) = record.apply(resolved);

        let id = self.store.save(&record, id.as_ref())?;
        tracing::info!(
            "created assignment {} with {} questions",
            id,
            record.questions.len()
        );

        Ok(SavedAssignment {
            id,
            record,
            id_mapping,
            anomalies,
        })
    }

    /// Updates a stored assignment.
    ///
    /// Free-form fields in the body replace stored fields of the same name; other stored fields
    /// are kept. When the body carries `questions` they are resolved again and replace the stored
    /// questions and projections. `createdAt` is preserved.
    ///
    /// # Errors
    ///
    /// Returns `AssignmentError` if:
    /// - `id` is not a canonical UUID or no assignment is stored under it,
    /// - the body is not a JSON object or `questions` is not a list,
    /// - identifier generation fails,
    /// - the record cannot be read or written.
    pub fn update(&self, id: &str, body: Value) -> AssignmentResult<SavedAssignment> {
        let id = parse_assignment_id(id)?;
        let mut record = self.store.load(&id)?;

        let (questions, fields) = split_body(body)?;
        record.fields.extend(fields);

        let (id_mapping, anomalies) = match questions {
            Some(questions) => {
                let resolved = self.resolver.resolve_value(questions)?;
                record.apply(resolved)
            }
            None => (BTreeMap::new(), Vec::new()),
        };
        record.updated_at = Utc::now();

        self.store.save(&record, Some(&id))?;
        tracing::info!(
            "updated assignment {} ({} questions)",
            id,
            record.questions.len()
        );

        Ok(SavedAssignment {
            id,
            record,
            id_mapping,
            anomalies,
        })
    }

    /// Loads a stored assignment.
    ///
    /// # Errors
    ///
    /// Returns `AssignmentError` if `id` is not a canonical UUID, nothing is stored under it, or
    /// the stored document cannot be read.
    pub fn get(&self, id: &str) -> AssignmentResult<AssignmentRecord> {
        let id = parse_assignment_id(id)?;
        self.store.load(&id)
    }
}

fn parse_assignment_id(id: &str) -> AssignmentResult<ShardableUuid> {
    ShardableUuid::parse(id)
        .map_err(|e| AssignmentError::InvalidInput(format!("invalid assignment id: {e}")))
}

/// Splits a request body into its `questions` value and the free-form fields.
fn split_body(body: Value) -> AssignmentResult<(Option<Value>, Map<String, Value>)> {
    let mut fields = require_object_body(body)?;
    let questions = fields.remove(QUESTIONS_KEY);

    for key in RESERVED_RECORD_KEYS {
        if fields.remove(*key).is_some() {
            tracing::debug!("ignoring client-supplied {}", key);
        }
    }

    Ok((questions, fields))
}
