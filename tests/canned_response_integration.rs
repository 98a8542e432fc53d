//! Cross-component integration tests
//!
//! These tests verify the canned response store, lookup paths, and the
//! substitution engine working together over the in-memory backend,
//! without requiring PostgreSQL or server startup.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use zapticket_canned_response_service::canned::{
    create_canned_response_backend, render_content_at, render_response_at, CannedResponse,
    CannedResponseBackend, CannedResponseError, CreateCannedResponseRequest, RenderContext,
    UpdateCannedResponseRequest, VariableValue, SEARCH_RESULT_LIMIT,
};
use zapticket_canned_response_service::config::StorageConfig;

const ORG: &str = "org-acme";
const OTHER_ORG: &str = "org-globex";

fn create_test_backend() -> Arc<dyn CannedResponseBackend> {
    let settings = StorageConfig {
        backend: "memory".to_string(),
    };
    create_canned_response_backend(&settings, None)
}

fn fixed_now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-03-01T09:30:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn request(name: &str, content: &str) -> CreateCannedResponseRequest {
    CreateCannedResponseRequest {
        name: name.to_string(),
        content: content.to_string(),
        category: None,
        shortcuts: vec![],
        variables: BTreeMap::new(),
    }
}

async fn seed(
    backend: &Arc<dyn CannedResponseBackend>,
    org: &str,
    req: CreateCannedResponseRequest,
) -> CannedResponse {
    backend
        .create(CannedResponse::from_request(org, None, req))
        .await
        .unwrap()
}

// =============================================================================
// Create / lookup / render flow
// =============================================================================

#[tokio::test]
async fn greet_template_flow_end_to_end() {
    let backend = create_test_backend();

    let mut req = request(
        "Greeting",
        "Hello {{customer_name}}, ticket {{ticket_id}} is {{status}}",
    );
    req.shortcuts = vec!["/greet".to_string()];
    req.category = Some("Greeting".to_string());
    let created = seed(&backend, ORG, req).await;

    // Quick-insert path: the shortcut resolves to the stored response
    let hit = backend
        .get_by_shortcut(ORG, "/greet")
        .await
        .unwrap()
        .expect("shortcut should resolve");
    assert_eq!(hit.id, created.id);

    // Render with a partial context: built-in default for the customer,
    // caller value for the ticket, and {{status}} left untouched.
    let mut variables = BTreeMap::new();
    variables.insert(
        "ticket_id".to_string(),
        VariableValue::from("T-42"),
    );
    let ctx = RenderContext {
        variables,
        ..Default::default()
    };

    let rendered = render_content_at(&hit.content, &ctx, fixed_now());
    assert_eq!(rendered, "Hello Customer, ticket T-42 is {{status}}");
}

#[tokio::test]
async fn stored_variable_defaults_feed_rendering() {
    let backend = create_test_backend();

    let mut req = request("Signoff", "{{greeting}} from {{agent_name}}");
    req.variables
        .insert("greeting".to_string(), VariableValue::from("Regards"));
    let created = seed(&backend, ORG, req).await;

    let stored = backend.get(ORG, created.id).await.unwrap();
    let rendered = render_response_at(&stored, &RenderContext::default(), fixed_now());
    assert_eq!(rendered, "Regards from Support Agent");
}

// =============================================================================
// Usage counting
// =============================================================================

#[tokio::test]
async fn usage_count_advances_sequentially() {
    let backend = create_test_backend();
    let created = seed(&backend, ORG, request("Thanks", "Thank you!")).await;
    assert_eq!(created.usage_count, 0);

    for _ in 0..3 {
        backend.record_usage(ORG, created.id).await.unwrap();
    }

    let fetched = backend.get(ORG, created.id).await.unwrap();
    assert_eq!(fetched.usage_count, 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn usage_count_survives_concurrent_recording() {
    let backend = create_test_backend();
    let created = seed(&backend, ORG, request("Thanks", "Thank you!")).await;

    let mut handles = Vec::new();
    for _ in 0..100 {
        let backend = backend.clone();
        let id = created.id;
        handles.push(tokio::spawn(async move {
            backend.record_usage(ORG, id).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let fetched = backend.get(ORG, created.id).await.unwrap();
    assert_eq!(fetched.usage_count, 100);
}

// =============================================================================
// Search and categories
// =============================================================================

#[tokio::test]
async fn search_stays_inside_the_organization() {
    let backend = create_test_backend();

    let mut billing = request("Refund accepted", "We will refund you.");
    billing.category = Some("Billing".to_string());
    seed(&backend, ORG, billing).await;
    seed(&backend, ORG, request("Greeting", "Hello!")).await;
    seed(&backend, OTHER_ORG, request("Refund denied", "No refund.")).await;

    let hits = backend.search(ORG, "refund").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert!(hits.iter().all(|r| r.organization_id == ORG));

    // Every hit matches in at least one of name/content/category
    let needle = "refund";
    for hit in &hits {
        let matches = hit.name.to_lowercase().contains(needle)
            || hit.content.to_lowercase().contains(needle)
            || hit
                .category
                .as_deref()
                .map(|c| c.to_lowercase().contains(needle))
                .unwrap_or(false);
        assert!(matches);
    }
}

#[tokio::test]
async fn search_results_are_capped() {
    let backend = create_test_backend();
    for i in 0..40 {
        seed(&backend, ORG, request(&format!("Canned {}", i), "shared body")).await;
    }

    let hits = backend.search(ORG, "shared").await.unwrap();
    assert_eq!(hits.len(), SEARCH_RESULT_LIMIT);
}

#[tokio::test]
async fn categories_deduplicate_and_exclude_empty() {
    let backend = create_test_backend();

    for (name, category) in [
        ("A", Some("Billing")),
        ("B", None),
        ("C", Some("Billing")),
        ("D", Some("Tech")),
    ] {
        let mut req = request(name, "body");
        req.category = category.map(str::to_string);
        seed(&backend, ORG, req).await;
    }

    let categories = backend.list_categories(ORG).await.unwrap();
    assert_eq!(categories, vec!["Billing".to_string(), "Tech".to_string()]);
}

// =============================================================================
// Shortcut semantics
// =============================================================================

#[tokio::test]
async fn shortcut_absence_is_a_success() {
    let backend = create_test_backend();
    seed(&backend, ORG, request("Greeting", "Hello!")).await;

    let miss = backend.get_by_shortcut(ORG, "/nothing").await.unwrap();
    assert!(miss.is_none());
}

#[tokio::test]
async fn duplicate_shortcuts_resolve_to_oldest() {
    // Shortcut uniqueness is deliberately not enforced; lookups must
    // still resolve duplicates deterministically (oldest wins).
    let backend = create_test_backend();

    let mut first = CannedResponse::from_request(ORG, None, request("First", "a"));
    first.shortcuts = vec!["/dup".to_string()];
    let mut second = CannedResponse::from_request(ORG, None, request("Second", "b"));
    second.shortcuts = vec!["/dup".to_string()];
    second.created_at = first.created_at + chrono::Duration::seconds(5);

    backend.create(second.clone()).await.unwrap();
    backend.create(first.clone()).await.unwrap();

    let hit = backend.get_by_shortcut(ORG, "/dup").await.unwrap().unwrap();
    assert_eq!(hit.id, first.id);
}

// =============================================================================
// Tenant isolation on mutation
// =============================================================================

#[tokio::test]
async fn foreign_org_mutations_are_not_found() {
    let backend = create_test_backend();
    let created = seed(&backend, ORG, request("Greeting", "Hello!")).await;

    let update = backend
        .update(
            OTHER_ORG,
            created.id,
            UpdateCannedResponseRequest {
                name: Some("Hijacked".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(update, Err(CannedResponseError::NotFound(_))));

    let delete = backend.delete(OTHER_ORG, created.id).await;
    assert!(matches!(delete, Err(CannedResponseError::NotFound(_))));

    let usage = backend.record_usage(OTHER_ORG, created.id).await;
    assert!(matches!(usage, Err(CannedResponseError::NotFound(_))));

    // The response is intact for its owner
    let fetched = backend.get(ORG, created.id).await.unwrap();
    assert_eq!(fetched.name, "Greeting");
    assert_eq!(fetched.usage_count, 0);
}

// =============================================================================
// Update lifecycle
// =============================================================================

#[tokio::test]
async fn partial_update_then_render_uses_new_content() {
    let backend = create_test_backend();
    let created = seed(&backend, ORG, request("Greeting", "Hello!")).await;

    backend
        .update(
            ORG,
            created.id,
            UpdateCannedResponseRequest {
                content: Some("Hi {{customer_name}}, welcome back!".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let stored = backend.get(ORG, created.id).await.unwrap();
    let ctx = RenderContext {
        customer_name: Some("Ada".to_string()),
        ..Default::default()
    };
    assert_eq!(
        render_content_at(&stored.content, &ctx, fixed_now()),
        "Hi Ada, welcome back!"
    );
}
