use std::sync::Arc;

use anyhow::anyhow;
use clap::Parser;
use preload_filter::Catalog;
use preload_storage_common::StorageExecutor;
use preload_storage_postgres::Postgres;
use preload_storage_sqlite::{Sqlite, SqliteConfig};
use tracing::Level;

#[derive(Parser, Debug, Clone)]
#[command(name = "preload-server", version, about = "Serve user queries with filtered eager loading")]
pub struct Config {
    #[arg(help = "The address to listen on")]
    #[arg(env = "PRELOAD_BIND", long = "bind", default_value = "0.0.0.0:8080")]
    pub bind: String,
    #[arg(help = "Database to query: postgres://..., sqlite://<path> or sqlite::memory:")]
    #[arg(env = "PRELOAD_DATABASE_URL", long = "database-url", default_value = "sqlite::memory:")]
    pub database_url: String,
    #[arg(help = "Maximum number of pooled database connections")]
    #[arg(env = "PRELOAD_POOL_SIZE", long = "pool-size", default_value_t = 10)]
    pub pool_size: u32,
    #[arg(help = "The logging level")]
    #[arg(env = "PRELOAD_LOG", long = "log", default_value = "info")]
    pub log: Level,
    #[arg(help = "Create missing tables on startup")]
    #[arg(env = "PRELOAD_MIGRATE", long = "migrate")]
    pub migrate: bool,
    #[arg(help = "Load the sample users on startup")]
    #[arg(env = "PRELOAD_SEED", long = "seed")]
    pub seed: bool,
}

/// Open the executor named by a database URL
pub async fn connect(url: &str, pool_size: u32, catalog: Arc<Catalog>) -> anyhow::Result<Arc<dyn StorageExecutor>> {
    if url.starts_with("postgres://") || url.starts_with("postgresql://") {
        return Ok(Arc::new(Postgres::connect(url, pool_size).await?.executor(catalog)));
    }
    if let Some(config) = SqliteConfig::from_url(url) {
        return Ok(Arc::new(Sqlite::with_config(config, pool_size).await?.executor(catalog)));
    }
    Err(anyhow!("unsupported database url {:?}", url))
}
