use anyhow::Result;
use clap::Parser;
use preload_server::{config, Config, Server};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    // initialize tracing
    tracing_subscriber::fmt().with_max_level(config.log).init();

    let catalog = preload_model::catalog();
    let executor = config::connect(&config.database_url, config.pool_size, catalog.clone()).await?;

    if config.migrate {
        info!("creating missing tables");
        executor.migrate().await?;
    }
    if config.seed {
        info!("loading sample data");
        executor.seed(preload_model::SEED_SQL).await?;
    }

    let server = Server::builder().bind_address(config.bind).with_executor(executor).with_catalog(catalog).build()?;
    server.run().await?;

    Ok(())
}
