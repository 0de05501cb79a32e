//! Common utilities for Postgres storage tests

use anyhow::Result;
use bb8_postgres::PostgresConnectionManager;
use preload_storage_common::{Executor, StorageExecutor};
use preload_storage_postgres::Postgres;
use std::str::FromStr;
use testcontainers::ContainerAsync;
use testcontainers_modules::{postgres, testcontainers::runners::AsyncRunner};
use tracing::Level;

// Initialize tracing for tests
#[ctor::ctor]
fn init_tracing() {
    if let Ok(level) = std::env::var("LOG_LEVEL") {
        tracing_subscriber::fmt().with_max_level(Level::from_str(&level).unwrap()).with_test_writer().init();
    } else {
        tracing_subscriber::fmt().with_max_level(Level::INFO).with_test_writer().init();
    }
}

/// Start a Postgres container and return an executor over the migrated, seeded model schema
pub async fn create_postgres_container() -> Result<(ContainerAsync<postgres::Postgres>, Executor<Postgres>)> {
    let container: ContainerAsync<postgres::Postgres> =
        postgres::Postgres::default().with_db_name("preload").with_user("postgres").with_password("postgres").start().await?;

    let host = container.get_host().await?;
    let port = container.get_host_port_ipv4(5432).await?;
    let manager = PostgresConnectionManager::new_from_stringlike(
        format!("host={host} port={port} user=postgres password=postgres dbname=preload"),
        tokio_postgres::NoTls,
    )?;
    let pool = bb8::Pool::builder().build(manager).await?;

    let executor = Postgres::new(pool).executor(preload_model::catalog());
    executor.migrate().await?;
    executor.seed(preload_model::SEED_SQL).await?;

    Ok((container, executor))
}
