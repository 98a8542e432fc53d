//! In-memory canned response backend.
//!
//! Backed by a `DashMap`; the default for development and tests. Usage
//! increments mutate the entry under its shard lock, so concurrent
//! `record_usage` calls never lose updates.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use super::backend::{CannedResponseBackend, SEARCH_RESULT_LIMIT};
use super::types::{
    CannedResponse, CannedResponseError, CannedResponseResult, UpdateCannedResponseRequest,
};

/// In-memory canned response storage
pub struct MemoryCannedResponseBackend {
    responses: DashMap<Uuid, CannedResponse>,
}

impl Default for MemoryCannedResponseBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCannedResponseBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self {
            responses: DashMap::new(),
        }
    }

    /// Snapshot the organization's responses in unspecified order.
    fn collect_for_org(&self, organization_id: &str) -> Vec<CannedResponse> {
        self.responses
            .iter()
            .filter(|entry| entry.value().organization_id == organization_id)
            .map(|entry| entry.value().clone())
            .collect()
    }
}

#[async_trait]
impl CannedResponseBackend for MemoryCannedResponseBackend {
    fn backend_type(&self) -> &'static str {
        "memory"
    }

    async fn create(&self, response: CannedResponse) -> CannedResponseResult<CannedResponse> {
        response.validate()?;

        let id = response.id;
        self.responses.insert(id, response.clone());

        tracing::debug!(
            response_id = %id,
            organization_id = %response.organization_id,
            "Canned response created in memory"
        );

        Ok(response)
    }

    async fn get(&self, organization_id: &str, id: Uuid) -> CannedResponseResult<CannedResponse> {
        self.responses
            .get(&id)
            .filter(|entry| entry.organization_id == organization_id)
            .map(|entry| entry.clone())
            .ok_or(CannedResponseError::NotFound(id))
    }

    async fn list(
        &self,
        organization_id: &str,
        category: Option<&str>,
    ) -> CannedResponseResult<Vec<CannedResponse>> {
        let mut responses: Vec<_> = self
            .collect_for_org(organization_id)
            .into_iter()
            .filter(|r| match category {
                Some(c) => r.category.as_deref() == Some(c),
                None => true,
            })
            .collect();

        // Category ascending with uncategorized last, then name ascending
        responses.sort_by(|a, b| {
            let a_key = (a.category.is_none(), &a.category, &a.name);
            let b_key = (b.category.is_none(), &b.category, &b.name);
            a_key.cmp(&b_key)
        });

        Ok(responses)
    }

    async fn list_categories(&self, organization_id: &str) -> CannedResponseResult<Vec<String>> {
        let categories: BTreeSet<String> = self
            .collect_for_org(organization_id)
            .into_iter()
            .filter_map(|r| r.category)
            .filter(|c| !c.is_empty())
            .collect();

        Ok(categories.into_iter().collect())
    }

    async fn search(
        &self,
        organization_id: &str,
        query: &str,
    ) -> CannedResponseResult<Vec<CannedResponse>> {
        let needle = query.to_lowercase();

        let mut matches: Vec<_> = self
            .collect_for_org(organization_id)
            .into_iter()
            .filter(|r| {
                r.name.to_lowercase().contains(&needle)
                    || r.content.to_lowercase().contains(&needle)
                    || r.category
                        .as_deref()
                        .is_some_and(|c| c.to_lowercase().contains(&needle))
            })
            .collect();

        matches.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        matches.truncate(SEARCH_RESULT_LIMIT);

        Ok(matches)
    }

    async fn get_by_shortcut(
        &self,
        organization_id: &str,
        shortcut: &str,
    ) -> CannedResponseResult<Option<CannedResponse>> {
        let owner = self
            .collect_for_org(organization_id)
            .into_iter()
            .filter(|r| r.shortcuts.iter().any(|s| s == shortcut))
            .min_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));

        Ok(owner)
    }

    async fn update(
        &self,
        organization_id: &str,
        id: Uuid,
        updates: UpdateCannedResponseRequest,
    ) -> CannedResponseResult<CannedResponse> {
        let mut response = self.get(organization_id, id).await?;

        response.apply_update(updates);
        response.validate()?;

        self.responses.insert(id, response.clone());

        Ok(response)
    }

    async fn delete(&self, organization_id: &str, id: Uuid) -> CannedResponseResult<()> {
        self.responses
            .remove_if(&id, |_, r| r.organization_id == organization_id)
            .map(|_| ())
            .ok_or(CannedResponseError::NotFound(id))
    }

    async fn record_usage(&self, organization_id: &str, id: Uuid) -> CannedResponseResult<()> {
        // The increment happens under the entry's shard lock, serializing
        // concurrent callers.
        match self.responses.get_mut(&id) {
            Some(mut entry) if entry.organization_id == organization_id => {
                entry.usage_count += 1;
                entry.updated_at = Utc::now();
                Ok(())
            }
            _ => Err(CannedResponseError::NotFound(id)),
        }
    }

    async fn count(&self, organization_id: &str) -> CannedResponseResult<usize> {
        Ok(self
            .responses
            .iter()
            .filter(|entry| entry.value().organization_id == organization_id)
            .count())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::canned::types::CreateCannedResponseRequest;

    fn request(name: &str, content: &str, category: Option<&str>) -> CreateCannedResponseRequest {
        CreateCannedResponseRequest {
            name: name.to_string(),
            content: content.to_string(),
            category: category.map(str::to_string),
            shortcuts: vec![],
            variables: Default::default(),
        }
    }

    async fn seed(
        backend: &MemoryCannedResponseBackend,
        org: &str,
        name: &str,
        content: &str,
        category: Option<&str>,
    ) -> CannedResponse {
        backend
            .create(CannedResponse::from_request(
                org,
                None,
                request(name, content, category),
            ))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let backend = MemoryCannedResponseBackend::new();
        let created = seed(&backend, "org-1", "Greeting", "Hello there", None).await;

        assert_eq!(created.usage_count, 0);

        let fetched = backend.get("org-1", created.id).await.unwrap();
        assert_eq!(fetched.name, "Greeting");
    }

    #[tokio::test]
    async fn test_get_is_org_scoped() {
        let backend = MemoryCannedResponseBackend::new();
        let created = seed(&backend, "org-1", "Greeting", "Hello", None).await;

        assert!(matches!(
            backend.get("org-2", created.id).await,
            Err(CannedResponseError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_missing_content() {
        let backend = MemoryCannedResponseBackend::new();
        let result = backend
            .create(CannedResponse::from_request(
                "org-1",
                None,
                request("Greeting", "", None),
            ))
            .await;

        assert!(matches!(result, Err(CannedResponseError::Validation(_))));
    }

    #[tokio::test]
    async fn test_list_orders_by_category_then_name() {
        let backend = MemoryCannedResponseBackend::new();
        seed(&backend, "org-1", "Zeta", "z", None).await;
        seed(&backend, "org-1", "Refund", "r", Some("Billing")).await;
        seed(&backend, "org-1", "Invoice", "i", Some("Billing")).await;
        seed(&backend, "org-1", "Reboot", "b", Some("Tech")).await;

        let listed = backend.list("org-1", None).await.unwrap();
        let names: Vec<_> = listed.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Invoice", "Refund", "Reboot", "Zeta"]);
    }

    #[tokio::test]
    async fn test_list_with_category_filter() {
        let backend = MemoryCannedResponseBackend::new();
        seed(&backend, "org-1", "Refund", "r", Some("Billing")).await;
        seed(&backend, "org-1", "Reboot", "b", Some("Tech")).await;

        let listed = backend.list("org-1", Some("Billing")).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Refund");
    }

    #[tokio::test]
    async fn test_list_categories_dedups_and_drops_empty() {
        let backend = MemoryCannedResponseBackend::new();
        seed(&backend, "org-1", "A", "a", Some("Billing")).await;
        seed(&backend, "org-1", "B", "b", None).await;
        seed(&backend, "org-1", "C", "c", Some("Billing")).await;
        seed(&backend, "org-1", "D", "d", Some("Tech")).await;
        seed(&backend, "org-1", "E", "e", Some("")).await;

        let categories = backend.list_categories("org-1").await.unwrap();
        assert_eq!(categories, vec!["Billing".to_string(), "Tech".to_string()]);
    }

    #[tokio::test]
    async fn test_search_matches_any_field_case_insensitively() {
        let backend = MemoryCannedResponseBackend::new();
        seed(&backend, "org-1", "Refund policy", "standard text", Some("Billing")).await;
        seed(&backend, "org-1", "Greeting", "Please refund promptly", None).await;
        seed(&backend, "org-1", "Escalation", "text", Some("Refunds")).await;
        seed(&backend, "org-1", "Unrelated", "text", Some("Tech")).await;
        seed(&backend, "org-2", "Refund policy", "other org", None).await;

        let hits = backend.search("org-1", "REFUND").await.unwrap();
        assert_eq!(hits.len(), 3);
        assert!(hits.iter().all(|r| r.organization_id == "org-1"));
    }

    #[tokio::test]
    async fn test_search_caps_results() {
        let backend = MemoryCannedResponseBackend::new();
        for i in 0..30 {
            seed(&backend, "org-1", &format!("Canned {}", i), "shared body", None).await;
        }

        let hits = backend.search("org-1", "shared").await.unwrap();
        assert_eq!(hits.len(), SEARCH_RESULT_LIMIT);
    }

    #[tokio::test]
    async fn test_shortcut_membership_is_exact() {
        let backend = MemoryCannedResponseBackend::new();
        let mut req = request("Thanks", "Thank you!", None);
        req.shortcuts = vec!["/thanks".to_string(), "/ty".to_string()];
        backend
            .create(CannedResponse::from_request("org-1", None, req))
            .await
            .unwrap();

        let hit = backend.get_by_shortcut("org-1", "/ty").await.unwrap();
        assert!(hit.is_some());

        // Prefixes are not membership
        let miss = backend.get_by_shortcut("org-1", "/t").await.unwrap();
        assert!(miss.is_none());

        // Other organizations never match
        let foreign = backend.get_by_shortcut("org-2", "/ty").await.unwrap();
        assert!(foreign.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_shortcuts_resolve_to_oldest() {
        // Shortcut uniqueness is deliberately not enforced; the lookup
        // must still be deterministic.
        let backend = MemoryCannedResponseBackend::new();

        let mut first = CannedResponse::from_request("org-1", None, request("First", "a", None));
        first.shortcuts = vec!["/dup".to_string()];
        let mut second = CannedResponse::from_request("org-1", None, request("Second", "b", None));
        second.shortcuts = vec!["/dup".to_string()];
        second.created_at = first.created_at + chrono::Duration::seconds(1);

        backend.create(first.clone()).await.unwrap();
        backend.create(second).await.unwrap();

        let hit = backend.get_by_shortcut("org-1", "/dup").await.unwrap().unwrap();
        assert_eq!(hit.id, first.id);
    }

    #[tokio::test]
    async fn test_update_partial_fields() {
        let backend = MemoryCannedResponseBackend::new();
        let created = seed(&backend, "org-1", "Greeting", "Hello", Some("General")).await;

        let updated = backend
            .update(
                "org-1",
                created.id,
                UpdateCannedResponseRequest {
                    content: Some("Hello {{customer_name}}".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.content, "Hello {{customer_name}}");
        assert_eq!(updated.name, "Greeting");
        assert_eq!(updated.category.as_deref(), Some("General"));
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_update_foreign_org_is_not_found() {
        let backend = MemoryCannedResponseBackend::new();
        let created = seed(&backend, "org-1", "Greeting", "Hello", None).await;

        let result = backend
            .update(
                "org-2",
                created.id,
                UpdateCannedResponseRequest {
                    name: Some("Hijacked".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(CannedResponseError::NotFound(_))));

        // The original is untouched
        let unchanged = backend.get("org-1", created.id).await.unwrap();
        assert_eq!(unchanged.name, "Greeting");
    }

    #[tokio::test]
    async fn test_delete() {
        let backend = MemoryCannedResponseBackend::new();
        let created = seed(&backend, "org-1", "Greeting", "Hello", None).await;

        backend.delete("org-1", created.id).await.unwrap();

        assert!(matches!(
            backend.delete("org-1", created.id).await,
            Err(CannedResponseError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_foreign_org_is_not_found() {
        let backend = MemoryCannedResponseBackend::new();
        let created = seed(&backend, "org-1", "Greeting", "Hello", None).await;

        assert!(matches!(
            backend.delete("org-2", created.id).await,
            Err(CannedResponseError::NotFound(_))
        ));
        assert!(backend.get("org-1", created.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_record_usage_sequential() {
        let backend = MemoryCannedResponseBackend::new();
        let created = seed(&backend, "org-1", "Greeting", "Hello", None).await;

        for _ in 0..3 {
            backend.record_usage("org-1", created.id).await.unwrap();
        }

        let fetched = backend.get("org-1", created.id).await.unwrap();
        assert_eq!(fetched.usage_count, 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_record_usage_concurrent_has_no_lost_updates() {
        let backend = Arc::new(MemoryCannedResponseBackend::new());
        let created = seed(&backend, "org-1", "Greeting", "Hello", None).await;

        let mut handles = Vec::new();
        for _ in 0..50 {
            let backend = backend.clone();
            let id = created.id;
            handles.push(tokio::spawn(async move {
                backend.record_usage("org-1", id).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let fetched = backend.get("org-1", created.id).await.unwrap();
        assert_eq!(fetched.usage_count, 50);
    }

    #[test]
    fn test_count_per_org() {
        // block_on keeps this usable from sync test helpers
        tokio_test::block_on(async {
            let backend = MemoryCannedResponseBackend::new();
            seed(&backend, "org-1", "A", "a", None).await;
            seed(&backend, "org-1", "B", "b", None).await;
            seed(&backend, "org-2", "C", "c", None).await;

            assert_eq!(backend.count("org-1").await.unwrap(), 2);
            assert_eq!(backend.count("org-2").await.unwrap(), 1);
        });
    }
}
