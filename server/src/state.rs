use std::{ops::Deref, sync::Arc};

use preload_filter::Catalog;
use preload_storage_common::StorageExecutor;

#[derive(Clone)]
pub struct AppState(Arc<AppStateInner>);

pub struct AppStateInner {
    pub executor: Arc<dyn StorageExecutor>,
    pub catalog: Arc<Catalog>,
}

impl AppState {
    pub fn new(executor: Arc<dyn StorageExecutor>, catalog: Arc<Catalog>) -> Self { Self(Arc::new(AppStateInner { executor, catalog })) }
}

impl Deref for AppState {
    type Target = AppStateInner;
    fn deref(&self) -> &Self::Target { &self.0 }
}
