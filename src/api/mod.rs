//! API layer - HTTP endpoint handlers organized by domain.

mod health;
mod metrics;
mod render;
mod responses;
mod routes;

// Re-export all handlers for use in server/app.rs
pub use health::health;
pub use metrics::prometheus_metrics;
pub use render::{render_content, render_response};
pub use responses::{
    create_response, delete_response, get_by_shortcut, get_response, list_categories,
    list_responses, record_usage, search_responses, update_response,
};
pub use responses::{CannedErrorInfo, CannedErrorResponse};
pub use routes::api_routes;
