use std::sync::Arc;

use anyhow::Result;
use axum::{routing::get, Router};
use preload_filter::Catalog;
use preload_storage_common::StorageExecutor;
use tower::ServiceBuilder;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{info, Level};

use crate::handlers::{get_user, list_users};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new().route("/user/{id}", get(get_user)).route("/users", get(list_users)).with_state(state).layer(
        ServiceBuilder::new()
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                    .on_request(DefaultOnRequest::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            .into_inner(),
    )
}

pub struct Server {
    bind_address: String,
    state: AppState,
}

impl Server {
    pub fn builder() -> ServerBuilder { ServerBuilder::default() }

    pub fn state(&self) -> &AppState { &self.state }

    pub async fn run(self) -> Result<()> {
        let app = router(self.state);

        let listener = tokio::net::TcpListener::bind(&self.bind_address).await?;
        info!("listening on {}", listener.local_addr()?);

        axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}

#[derive(Default)]
pub struct ServerBuilder {
    bind_address: Option<String>,
    executor: Option<Arc<dyn StorageExecutor>>,
    catalog: Option<Arc<Catalog>>,
}

impl ServerBuilder {
    pub fn bind_address(mut self, addr: impl Into<String>) -> Self {
        self.bind_address = Some(addr.into());
        self
    }

    pub fn with_executor(mut self, executor: Arc<dyn StorageExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Defaults to the model catalogue
    pub fn with_catalog(mut self, catalog: Arc<Catalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn build(self) -> Result<Server> {
        let bind_address = self.bind_address.ok_or_else(|| anyhow::anyhow!("bind_address is required"))?;
        let executor = self.executor.ok_or_else(|| anyhow::anyhow!("executor is required"))?;
        let catalog = self.catalog.unwrap_or_else(preload_model::catalog);

        Ok(Server { bind_address, state: AppState::new(executor, catalog) })
    }
}
