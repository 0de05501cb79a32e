use std::str::FromStr;

use preload_model::User;
use preload_storage_common::{Executor, Record, StorageExecutor};
use preload_storage_sqlite::Sqlite;
use tracing::Level;

// Initialize tracing for tests
#[ctor::ctor]
fn init_tracing() {
    // if LOG_LEVEL env var is set, use it
    if let Ok(level) = std::env::var("LOG_LEVEL") {
        tracing_subscriber::fmt().with_max_level(Level::from_str(&level).unwrap()).with_test_writer().init();
    } else {
        tracing_subscriber::fmt().with_max_level(Level::INFO).with_test_writer().init();
    }
}

#[allow(unused)]
/// In-memory database with the model schema, the sample data and `fixtures.sql`
pub async fn setup() -> anyhow::Result<Executor<Sqlite>> {
    let executor = Sqlite::open_in_memory().await?.executor(preload_model::catalog());
    executor.migrate().await?;
    executor.seed(preload_model::SEED_SQL).await?;
    executor.seed(include_str!("../fixtures.sql")).await?;
    Ok(executor)
}

#[allow(unused)]
pub fn users(records: &[Record]) -> anyhow::Result<Vec<User>> { Ok(records.iter().map(|r| r.into_entity::<User>()).collect::<Result<Vec<_>, _>>()?) }

#[allow(unused)]
pub fn names<T>(items: &[T], name: impl Fn(&T) -> &str) -> Vec<String> { items.iter().map(|item| name(item).to_owned()).collect() }
