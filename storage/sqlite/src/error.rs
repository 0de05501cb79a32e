//! Error types for the SQLite backend

use preload_storage_common::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqliteError {
    #[error("SQLite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("column {column}: cannot decode {found} as {expected}")]
    Decode { column: usize, found: &'static str, expected: preload_filter::ColumnKind },

    #[error("Task join error: {0}")]
    TaskJoin(String),
}

impl From<SqliteError> for StorageError {
    fn from(err: SqliteError) -> Self {
        match err {
            SqliteError::Decode { .. } => StorageError::Decode(err.to_string()),
            err => StorageError::Backend(Box::new(err)),
        }
    }
}
