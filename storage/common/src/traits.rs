use async_trait::async_trait;
use preload_filter::{ColumnKind, QueryPlan, Value};

use crate::error::StorageError;
use crate::record::Record;
use crate::sql_builder::Placeholder;

/// A backend able to run generated SQL and decode rows into [`Value`]s
#[async_trait]
pub trait SqlConnection: Send + Sync {
    fn placeholder(&self) -> Placeholder;

    /// Run a query, decoding column `i` of every row as `kinds[i]`
    async fn query(&self, sql: &str, args: Vec<Value>, kinds: Vec<ColumnKind>) -> Result<Vec<Vec<Value>>, StorageError>;

    async fn batch_execute(&self, sql: &str) -> Result<(), StorageError>;
}

/// Runs query plans against a store
#[async_trait]
pub trait StorageExecutor: Send + Sync {
    /// Load the root rows matching the plan's root conditions, ordered by primary
    /// key, with every association in the plan preloaded
    async fn execute(&self, plan: &QueryPlan, root: &str) -> Result<Vec<Record>, StorageError>;

    /// Create any missing tables
    async fn migrate(&self) -> Result<(), StorageError>;

    /// Run a batch of statements, e.g. sample data
    async fn seed(&self, sql: &str) -> Result<(), StorageError>;
}
