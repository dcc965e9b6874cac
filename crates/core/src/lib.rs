//! # Assess Core
//!
//! Core logic for assignment question lists.
//!
//! This crate contains the question graph resolver and the file-backed assignment store:
//! - Resolution of editor drafts into permanent, numbered, dependency-ordered questions
//! - Assignment create/update/get over sharded YAML storage under the configured data directory
//!
//! **No transport concerns**: request parsing beyond the JSON body, authentication and process
//! configuration belong to the binaries. Configuration arrives as a resolved [`CoreConfig`].

pub mod assignment;
pub mod config;
pub mod constants;
pub mod error;
pub mod repositories;
pub mod resolver;
pub mod validation;

pub use assignment::{AssignmentRecord, AssignmentService, SavedAssignment};
pub use config::{CoreConfig, TempIdPrefixes};
pub use error::{AssignmentError, AssignmentResult};
pub use repositories::{AssignmentStore, FileAssignmentStore};
pub use resolver::{Anomaly, QuestionGraphResolver, QuestionRole, ResolvedQuestionSet};

pub use assess_types::NonEmptyText;
pub use assess_uuid::{IdGenerator, ShardableUuid, UuidIdGenerator};
