#[derive(Debug, thiserror::Error)]
pub enum AssignmentError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid question list: {0}")]
    Forms(#[from] forms::FormsError),
    #[error("identifier generator failed: {0}")]
    Identifier(#[from] assess_uuid::UuidError),
    #[error("could not allocate a unique question identifier after {attempts} attempts")]
    IdAllocation { attempts: usize },

    #[error("assignment not found: {0}")]
    NotFound(String),
    #[error("assignment already exists: {0}")]
    AlreadyExists(String),
    #[error("failed to create assignment directory: {0}")]
    AssignmentDirCreation(std::io::Error),
    #[error("failed to write assignment file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read assignment file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to serialize YAML: {0}")]
    YamlSerialization(serde_yaml::Error),
    #[error("assignment schema mismatch at {path}: {source}")]
    YamlDeserialization {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

pub type AssignmentResult<T> = std::result::Result<T, AssignmentError>;
