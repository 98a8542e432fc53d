//! Backend trait for canned response storage.
//!
//! Defines the abstraction layer over storage implementations (memory,
//! PostgreSQL) so they can be used interchangeably. Every operation is
//! scoped to an organization; an id owned by another organization is
//! reported as `NotFound` rather than leaking its existence.

use async_trait::async_trait;
use uuid::Uuid;

use super::types::{CannedResponse, CannedResponseResult, UpdateCannedResponseRequest};

/// Maximum number of results returned by free-text search
pub const SEARCH_RESULT_LIMIT: usize = 20;

/// Storage abstraction for canned responses.
#[async_trait]
pub trait CannedResponseBackend: Send + Sync {
    /// Backend type identifier for health/stats reporting
    fn backend_type(&self) -> &'static str;

    /// Persist a new response with `usage_count = 0`.
    async fn create(&self, response: CannedResponse) -> CannedResponseResult<CannedResponse>;

    /// Fetch a response by id within the organization.
    async fn get(&self, organization_id: &str, id: Uuid) -> CannedResponseResult<CannedResponse>;

    /// List the organization's responses, optionally filtered to one
    /// category. Ordered by category ascending (uncategorized last), then
    /// name ascending.
    async fn list(
        &self,
        organization_id: &str,
        category: Option<&str>,
    ) -> CannedResponseResult<Vec<CannedResponse>>;

    /// Distinct, non-empty categories currently in use, sorted ascending.
    async fn list_categories(&self, organization_id: &str) -> CannedResponseResult<Vec<String>>;

    /// Case-insensitive substring search across name, content, and
    /// category (any one matching suffices). Capped at
    /// [`SEARCH_RESULT_LIMIT`]; callers must not rely on result order.
    async fn search(
        &self,
        organization_id: &str,
        query: &str,
    ) -> CannedResponseResult<Vec<CannedResponse>>;

    /// Find the response owning the given shortcut (exact membership
    /// test). Absence is a success, not an error. Duplicate shortcuts
    /// resolve to the first response by `(created_at, id)`.
    async fn get_by_shortcut(
        &self,
        organization_id: &str,
        shortcut: &str,
    ) -> CannedResponseResult<Option<CannedResponse>>;

    /// Apply a partial update; only supplied fields change.
    async fn update(
        &self,
        organization_id: &str,
        id: Uuid,
        updates: UpdateCannedResponseRequest,
    ) -> CannedResponseResult<CannedResponse>;

    /// Remove a response. `NotFound` when the id is absent.
    async fn delete(&self, organization_id: &str, id: Uuid) -> CannedResponseResult<()>;

    /// Increment the usage counter by exactly 1 via an atomic
    /// storage-level increment. N concurrent calls advance the counter by
    /// exactly N.
    async fn record_usage(&self, organization_id: &str, id: Uuid) -> CannedResponseResult<()>;

    /// Number of responses stored for the organization.
    async fn count(&self, organization_id: &str) -> CannedResponseResult<usize>;
}
