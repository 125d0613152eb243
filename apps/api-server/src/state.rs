//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{PostRepository, UserRepository};
use quill_core::service::PostService;
use quill_infra::InMemoryStore;

use crate::config::{AppConfig, PaginationConfig};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: PostService,
    pub users: Arc<dyn UserRepository>,
    pub pagination: PaginationConfig,
}

impl AppState {
    /// Build the state, connecting to the database when one is configured.
    pub async fn new(config: &AppConfig) -> Self {
        #[cfg(feature = "postgres")]
        {
            if let Some(db_config) = &config.database {
                match quill_infra::database::connect(db_config).await {
                    Ok(db) => {
                        let db = Arc::new(db);
                        tracing::info!("Application state initialized (postgres)");
                        return Self::with_repositories(
                            Arc::new(quill_infra::PostgresPostRepository::new(db.clone())),
                            Arc::new(quill_infra::PostgresUserRepository::new(db)),
                            config.pagination,
                        );
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory fallback.",
                            e
                        );
                    }
                }
            } else {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            }
        }

        #[cfg(not(feature = "postgres"))]
        tracing::info!("Running without postgres feature - using in-memory repositories");

        Self::in_memory(&InMemoryStore::new(), config.pagination)
    }

    /// State backed by in-memory repositories over `store`.
    pub fn in_memory(store: &InMemoryStore, pagination: PaginationConfig) -> Self {
        Self::with_repositories(Arc::new(store.posts()), Arc::new(store.users()), pagination)
    }

    fn with_repositories(
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
        pagination: PaginationConfig,
    ) -> Self {
        Self {
            posts: PostService::new(posts, users.clone()),
            users,
            pagination,
        }
    }
}
