//! Shared application state.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::file::{LocalUploadStore, UploadStore};
use crate::services::Publisher;

/// Application state shared across request handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pool: PgPool,
    publisher: Publisher,
    uploads: Arc<dyn UploadStore>,
}

impl AppState {
    /// Build state from configuration and an established pool.
    pub fn new(config: &Config, pool: PgPool) -> Self {
        let uploads: Arc<dyn UploadStore> = Arc::new(LocalUploadStore::new(
            config.uploads_dir.join("blog"),
            format!("{}/blog", config.files_url.trim_end_matches('/')),
        ));
        let publisher = Publisher::new(pool.clone(), uploads.clone());

        Self {
            inner: Arc::new(AppStateInner {
                pool,
                publisher,
                uploads,
            }),
        }
    }

    /// Database connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Publishing orchestrator.
    pub fn publisher(&self) -> &Publisher {
        &self.inner.publisher
    }

    /// Hero image upload storage.
    pub fn uploads(&self) -> &Arc<dyn UploadStore> {
        &self.inner.uploads
    }
}
