use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SqlGenerationError {
    #[error("template {template:?} has {found} placeholders, expected {expected}")]
    PlaceholderCountMismatch { template: String, found: usize, expected: usize },
    #[error("SqlBuilder requires both fields and table_name to be set for SELECT generation")]
    IncompleteConfiguration,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("unknown entity: {0}")]
    UnknownEntity(String),
    #[error("no association {path:?} from {entity}")]
    UnknownAssociation { entity: String, path: String },
    #[error("SQL generation failed: {0}")]
    SqlGeneration(#[from] SqlGenerationError),
    #[error("row decode failed: {0}")]
    Decode(String),
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("storage backend error: {0}")]
    Backend(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl StorageError {
    pub fn backend<E: std::error::Error + Send + Sync + 'static>(err: E) -> Self { StorageError::Backend(Box::new(err)) }
}
