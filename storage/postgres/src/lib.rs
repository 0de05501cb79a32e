//! Postgres backend for the preload executor.

use std::sync::Arc;

use async_trait::async_trait;
use bb8_postgres::{tokio_postgres::NoTls, PostgresConnectionManager};
use futures_util::TryStreamExt;
use preload_filter::{Catalog, ColumnKind, Value};
use preload_storage_common::{Executor, Placeholder, SqlConnection, StorageError};
use tracing::{debug, info};

pub mod value;

use value::{decode_row, PGValue};

pub const DEFAULT_POOL_SIZE: u32 = 10;

#[derive(Clone)]
pub struct Postgres {
    pool: bb8::Pool<PostgresConnectionManager<NoTls>>,
}

impl Postgres {
    pub fn new(pool: bb8::Pool<PostgresConnectionManager<NoTls>>) -> Self { Self { pool } }

    /// Open a pool from a connection string (`postgres://...` or `host=... user=...`)
    pub async fn connect(url: &str, pool_size: u32) -> anyhow::Result<Self> {
        let manager = PostgresConnectionManager::new_from_stringlike(url, NoTls)?;
        let pool = bb8::Pool::builder().max_size(pool_size).build(manager).await?;
        info!("Postgres pool ready (max {} connections)", pool_size);
        Ok(Self::new(pool))
    }

    pub fn executor(self, catalog: Arc<Catalog>) -> Executor<Postgres> { Executor::new(self, catalog) }
}

#[async_trait]
impl SqlConnection for Postgres {
    fn placeholder(&self) -> Placeholder { Placeholder::Numbered }

    async fn query(&self, sql: &str, args: Vec<Value>, kinds: Vec<ColumnKind>) -> Result<Vec<Vec<Value>>, StorageError> {
        let client = self.pool.get().await.map_err(StorageError::backend)?;
        debug!("Postgres.query: {} {:?}", sql, args);

        let params: Vec<PGValue<'_>> = args.iter().map(PGValue).collect();
        let stream = client.query_raw(sql, params).await.map_err(StorageError::backend)?;
        let rows: Vec<tokio_postgres::Row> = stream.try_collect().await.map_err(StorageError::backend)?;

        rows.iter().map(|row| decode_row(row, &kinds).map_err(StorageError::backend)).collect()
    }

    async fn batch_execute(&self, sql: &str) -> Result<(), StorageError> {
        let client = self.pool.get().await.map_err(StorageError::backend)?;
        client.batch_execute(sql).await.map_err(StorageError::backend)
    }
}
