//! Assignment store.
//!
//! Stored layout:
//! ```text
//! <assignment_data_dir>/assignments/<s1>/<s2>/<uuid>/assignment.yaml
//! ```
//! where `s1`/`s2` are the first four hex characters of the assignment id.

use super::helpers::create_unique_shared_dir;
use crate::assignment::AssignmentRecord;
use crate::config::CoreConfig;
use crate::constants::ASSIGNMENT_FILENAME;
use crate::{AssignmentError, AssignmentResult};
use assess_uuid::ShardableUuid;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// Persistence sink for resolved assignments.
pub trait AssignmentStore {
    /// Stores `record`, returning its id.
    ///
    /// With `id` the record is written (or overwritten) under that id. Without one a fresh id is
    /// allocated.
    fn save(
        &self,
        record: &AssignmentRecord,
        id: Option<&ShardableUuid>,
    ) -> AssignmentResult<ShardableUuid>;

    /// Loads a stored record.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentError::NotFound`] if no record is stored under `id`.
    fn load(&self, id: &ShardableUuid) -> AssignmentResult<AssignmentRecord>;

    fn exists(&self, id: &ShardableUuid) -> bool;
}

impl<T: AssignmentStore + ?Sized> AssignmentStore for &T {
    fn save(
        &self,
        record: &AssignmentRecord,
        id: Option<&ShardableUuid>,
    ) -> AssignmentResult<ShardableUuid> {
        (**self).save(record, id)
    }

    fn load(&self, id: &ShardableUuid) -> AssignmentResult<AssignmentRecord> {
        (**self).load(id)
    }

    fn exists(&self, id: &ShardableUuid) -> bool {
        (**self).exists(id)
    }
}

/// File-backed store writing one YAML document per assignment.
#[derive(Clone, Debug)]
pub struct FileAssignmentStore {
    cfg: Arc<CoreConfig>,
}

impl FileAssignmentStore {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    /// Path of the stored document for `id`.
    pub fn record_path(&self, id: &ShardableUuid) -> PathBuf {
        id.sharded_dir(&self.cfg.assignments_dir())
            .join(ASSIGNMENT_FILENAME)
    }

    /// Parse a stored assignment document.
    ///
    /// Schema mismatches report the path of the failing field (e.g. `questions[2].order`).
    pub fn parse(yaml_text: &str) -> AssignmentResult<AssignmentRecord> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

        serde_path_to_error::deserialize::<_, AssignmentRecord>(deserializer).map_err(|err| {
            let path = err.path().to_string();
            let path = if path.is_empty() {
                "<root>".to_string()
            } else {
                path
            };
            AssignmentError::YamlDeserialization {
                path,
                source: err.into_inner(),
            }
        })
    }

    /// Render an assignment document as YAML text.
    pub fn render(record: &AssignmentRecord) -> AssignmentResult<String> {
        serde_yaml::to_string(record).map_err(AssignmentError::YamlSerialization)
    }
}

impl AssignmentStore for FileAssignmentStore {
    fn save(
        &self,
        record: &AssignmentRecord,
        id: Option<&ShardableUuid>,
    ) -> AssignmentResult<ShardableUuid> {
        let content = Self::render(record)?;
        let assignments_dir = self.cfg.assignments_dir();

        let (id, dir, fresh) = match id {
            Some(id) => {
                let dir = id.sharded_dir(&assignments_dir);
                fs::create_dir_all(&dir).map_err(AssignmentError::AssignmentDirCreation)?;
                (id.clone(), dir, false)
            }
            None => {
                let (id, dir) = create_unique_shared_dir(&assignments_dir, ShardableUuid::new)?;
                (id, dir, true)
            }
        };

        if let Err(e) = fs::write(dir.join(ASSIGNMENT_FILENAME), content) {
            if fresh {
                if let Err(cleanup) = fs::remove_dir_all(&dir) {
                    tracing::warn!(
                        "failed to remove partially created assignment {}: {}",
                        dir.display(),
                        cleanup
                    );
                }
            }
            return Err(AssignmentError::FileWrite(e));
        }

        tracing::debug!("stored assignment {} in {}", id, dir.display());
        Ok(id)
    }

    fn load(&self, id: &ShardableUuid) -> AssignmentResult<AssignmentRecord> {
        let path = self.record_path(id);
        if !path.is_file() {
            return Err(AssignmentError::NotFound(id.to_string()));
        }

        let contents = fs::read_to_string(&path).map_err(AssignmentError::FileRead)?;
        Self::parse(&contents)
    }

    fn exists(&self, id: &ShardableUuid) -> bool {
        self.record_path(id).is_file()
    }
}
