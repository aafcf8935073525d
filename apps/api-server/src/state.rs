//! Application state - shared across all handlers.

use std::sync::Arc;

use tokio::sync::Mutex;
use url::Url;

use inkpress_core::ports::PostStore;
use inkpress_core::services::{AdminWorkspace, ListScope, PostCollection};
use inkpress_infra::InMemoryPostStore;

#[cfg(feature = "postgres")]
use inkpress_infra::{PostgresPostStore, connect};

use crate::config::{AdminCredentials, AppConfig};

/// Shared application state.
///
/// Public requests build fresh views over `store`. The admin workspace is a
/// single long-lived instance whose loaded posts can drift from the store
/// until it is refreshed.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PostStore>,
    pub workspace: Arc<Mutex<AdminWorkspace>>,
    pub page_size: usize,
    pub public_base_url: Url,
    pub admin: Option<AdminCredentials>,
}

impl AppState {
    /// Build the state with the store the configuration selects.
    pub async fn new(config: &AppConfig) -> Self {
        let store = build_store(config).await;
        let state = Self::with_store(
            store,
            config.page_size,
            config.public_base_url.clone(),
            config.admin.clone(),
        )
        .await;
        tracing::info!("Application state initialized");
        state
    }

    /// Build the state over an existing store and mount the admin workspace.
    pub async fn with_store(
        store: Arc<dyn PostStore>,
        page_size: usize,
        public_base_url: Url,
        admin: Option<AdminCredentials>,
    ) -> Self {
        let workspace = AdminWorkspace::mount(store.clone(), page_size).await;
        if let Some(error) = workspace.error() {
            tracing::warn!(error, "Admin workspace mounted without posts");
        }
        Self {
            store,
            workspace: Arc::new(Mutex::new(workspace)),
            page_size,
            public_base_url,
            admin,
        }
    }

    /// Data-access view over published posts only.
    pub fn published(&self) -> PostCollection {
        PostCollection::new(self.store.clone(), ListScope::Published, self.page_size)
    }
}

#[cfg(feature = "postgres")]
async fn build_store(config: &AppConfig) -> Arc<dyn PostStore> {
    let Some(db_config) = &config.database else {
        tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        return Arc::new(InMemoryPostStore::new());
    };
    match connect(db_config).await {
        Ok(conn) => Arc::new(PostgresPostStore::new(conn)),
        Err(e) => {
            tracing::error!(
                error = %e,
                "Failed to connect to database. Using in-memory fallback."
            );
            Arc::new(InMemoryPostStore::new())
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn build_store(config: &AppConfig) -> Arc<dyn PostStore> {
    if config.database.is_some() {
        tracing::warn!("DATABASE_URL ignored: built without the postgres feature");
    }
    tracing::info!("Running with the in-memory post store");
    Arc::new(InMemoryPostStore::new())
}
