//! Canned response backend factory

use std::sync::Arc;

use crate::config::StorageConfig;
use crate::postgres::PostgresPool;

use super::backend::CannedResponseBackend;
use super::memory_backend::MemoryCannedResponseBackend;
use super::postgres_backend::PostgresCannedResponseBackend;

/// Create a storage backend based on configuration.
///
/// Returns the implementation selected by the `backend` setting:
/// - `"postgres"`: a `PostgresCannedResponseBackend` if a pool is provided
/// - `"memory"` (default): a `MemoryCannedResponseBackend`
pub fn create_canned_response_backend(
    settings: &StorageConfig,
    postgres_pool: Option<Arc<PostgresPool>>,
) -> Arc<dyn CannedResponseBackend> {
    match settings.backend.as_str() {
        "postgres" => {
            if let Some(pool) = postgres_pool {
                tracing::info!(backend = "postgres", "Creating PostgreSQL canned response backend");
                Arc::new(PostgresCannedResponseBackend::new(pool.pool().clone()))
            } else {
                tracing::warn!(
                    "PostgreSQL backend requested but no pool provided, falling back to memory"
                );
                Arc::new(MemoryCannedResponseBackend::new())
            }
        }
        _ => {
            tracing::info!(backend = "memory", "Creating memory canned response backend");
            Arc::new(MemoryCannedResponseBackend::new())
        }
    }
}
