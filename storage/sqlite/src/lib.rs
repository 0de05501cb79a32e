//! SQLite backend for the preload executor.
//!
//! Used for embedded deployments and, with an in-memory database, for
//! end-to-end tests that need no external server.
//!
//! ```rust,ignore
//! let executor = Sqlite::open_in_memory().await?.executor(preload_model::catalog());
//! executor.migrate().await?;
//! ```

mod connection;
mod error;
mod value;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use preload_filter::{Catalog, ColumnKind, Value};
use preload_storage_common::{Executor, Placeholder, SqlConnection, StorageError};
use rusqlite::params_from_iter;
use tracing::debug;

pub use connection::{SqliteConfig, SqliteConnectionManager};
pub use error::SqliteError;

/// Default connection pool size
pub const DEFAULT_POOL_SIZE: u32 = 10;

#[derive(Clone)]
pub struct Sqlite {
    pool: bb8::Pool<SqliteConnectionManager>,
}

impl Sqlite {
    pub fn new(pool: bb8::Pool<SqliteConnectionManager>) -> Self { Self { pool } }

    pub async fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> { Self::with_config(SqliteConfig::File(path.as_ref().into()), DEFAULT_POOL_SIZE).await }

    pub async fn open_in_memory() -> anyhow::Result<Self> { Self::with_config(SqliteConfig::Memory, 1).await }

    /// An in-memory database gets a single connection that is never recycled,
    /// so every query sees the same data
    pub async fn with_config(config: SqliteConfig, pool_size: u32) -> anyhow::Result<Self> {
        let builder = match config {
            SqliteConfig::Memory => bb8::Pool::builder().max_size(1).idle_timeout(None).max_lifetime(None),
            SqliteConfig::File(_) => bb8::Pool::builder().max_size(pool_size),
        };
        let pool = builder.build(SqliteConnectionManager::new(config)).await?;
        Ok(Self::new(pool))
    }

    pub fn executor(self, catalog: Arc<Catalog>) -> Executor<Sqlite> { Executor::new(self, catalog) }
}

#[async_trait]
impl SqlConnection for Sqlite {
    fn placeholder(&self) -> Placeholder { Placeholder::Positional }

    async fn query(&self, sql: &str, args: Vec<Value>, kinds: Vec<ColumnKind>) -> Result<Vec<Vec<Value>>, StorageError> {
        let conn = self.pool.get().await.map_err(|e| SqliteError::Pool(e.to_string()))?;
        debug!("Sqlite.query: {} {:?}", sql, args);

        let sql = sql.to_owned();
        let rows = conn
            .with_connection(move |c| {
                let mut stmt = c.prepare(&sql)?;
                let mut rows = stmt.query(params_from_iter(args.iter().map(value::to_sql)))?;
                let mut decoded = Vec::new();
                while let Some(row) = rows.next()? {
                    let mut values = Vec::with_capacity(kinds.len());
                    for (i, kind) in kinds.iter().enumerate() {
                        values.push(value::decode(i, row.get(i)?, *kind)?);
                    }
                    decoded.push(values);
                }
                Ok(decoded)
            })
            .await?;
        Ok(rows)
    }

    async fn batch_execute(&self, sql: &str) -> Result<(), StorageError> {
        let conn = self.pool.get().await.map_err(|e| SqliteError::Pool(e.to_string()))?;
        let sql = sql.to_owned();
        conn.with_connection(move |c| c.execute_batch(&sql).map_err(SqliteError::from)).await?;
        Ok(())
    }
}
