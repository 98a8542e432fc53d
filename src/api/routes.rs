use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::server::{require_auth, AppState};

use super::health::health;
use super::metrics::prometheus_metrics;
use super::render::{render_content, render_response};
use super::responses::{
    create_response, delete_response, get_by_shortcut, get_response, list_categories,
    list_responses, record_usage, search_responses, update_response,
};

pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health & metrics (unauthenticated)
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        // Canned response endpoints (bearer JWT required)
        .nest(
            "/api/v1",
            Router::new()
                .route(
                    "/canned-responses",
                    get(list_responses).post(create_response),
                )
                .route("/canned-responses/categories", get(list_categories))
                .route("/canned-responses/search", get(search_responses))
                .route("/canned-responses/shortcut/{shortcut}", get(get_by_shortcut))
                .route("/canned-responses/render", post(render_content))
                .route(
                    "/canned-responses/{id}",
                    get(get_response).put(update_response).delete(delete_response),
                )
                .route("/canned-responses/{id}/usage", post(record_usage))
                .route("/canned-responses/{id}/render", post(render_response))
                .layer(middleware::from_fn_with_state(state, require_auth)),
        )
}
