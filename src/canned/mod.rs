//! Canned response domain.
//!
//! This module provides:
//! - Organization-scoped canned response storage (memory and PostgreSQL)
//! - Lookup by category, free-text search, and quick-insert shortcut
//! - Atomic usage counting
//! - Variable substitution for rendering content with {{variable}}
//!   placeholders
//!
//! # Example
//!
//! ```ignore
//! let backend = MemoryCannedResponseBackend::new();
//!
//! let response = CannedResponse::from_request(
//!     "org-acme",
//!     Some("agent-7".to_string()),
//!     CreateCannedResponseRequest {
//!         name: "Greeting".to_string(),
//!         content: "Hello {{customer_name}}!".to_string(),
//!         category: Some("General".to_string()),
//!         shortcuts: vec!["/hi".to_string()],
//!         variables: Default::default(),
//!     },
//! );
//! backend.create(response).await?;
//!
//! // Quick-insert lookup and render
//! let hit = backend.get_by_shortcut("org-acme", "/hi").await?;
//! let rendered = render_content(&hit.unwrap().content, &RenderContext::default());
//! ```

mod backend;
mod factory;
mod memory_backend;
mod postgres_backend;
mod substitution;
mod types;

pub use backend::{CannedResponseBackend, SEARCH_RESULT_LIMIT};
pub use factory::create_canned_response_backend;
pub use memory_backend::MemoryCannedResponseBackend;
pub use postgres_backend::PostgresCannedResponseBackend;
pub use substitution::{render_content, render_content_at, render_response_at, RenderContext};
pub use types::{
    CannedResponse, CannedResponseError, CannedResponseListResponse, CannedResponseResult,
    CategoryListResponse, CreateCannedResponseRequest, UpdateCannedResponseRequest, VariableValue,
};
