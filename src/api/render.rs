//! Rendering endpoints for canned content.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::canned::{self, RenderContext};
use crate::metrics::{RENDERED_CONTENT_BYTES, RENDERS_TOTAL};
use crate::server::{AppState, OrgContext};

use super::responses::{store_failure, CannedErrorResponse};

/// Request to render arbitrary content with a variable map
#[derive(Debug, Deserialize)]
pub struct RenderContentRequest {
    /// Content with {{variable}} placeholders
    pub content: String,

    /// Contextual inputs and variable overrides
    #[serde(flatten)]
    pub context: RenderContext,
}

#[derive(Debug, Serialize)]
pub struct RenderedContentResponse {
    /// Content with the effective variable set applied
    pub rendered: String,
}

/// POST /api/v1/canned-responses/render - Render arbitrary content
///
/// Pure substitution; no stored response is involved.
#[tracing::instrument(
    name = "http.render_content",
    skip(request),
    fields(organization_id = %ctx.organization_id)
)]
pub async fn render_content(
    ctx: OrgContext,
    Json(request): Json<RenderContentRequest>,
) -> Json<RenderedContentResponse> {
    let rendered = canned::render_content(&request.content, &request.context);

    RENDERS_TOTAL.inc();
    RENDERED_CONTENT_BYTES.observe(rendered.len() as f64);

    Json(RenderedContentResponse { rendered })
}

/// POST /api/v1/canned-responses/{id}/render - Render a stored response
///
/// Applies the response's stored variable defaults underneath the caller's
/// overrides. Usage is NOT recorded here; callers do that explicitly.
#[tracing::instrument(
    name = "http.render_canned_response",
    skip(state, context),
    fields(organization_id = %ctx.organization_id)
)]
pub async fn render_response(
    ctx: OrgContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(context): Json<RenderContext>,
) -> Result<Json<RenderedContentResponse>, (StatusCode, Json<CannedErrorResponse>)> {
    let stored = state
        .store
        .get(&ctx.organization_id, id)
        .await
        .map_err(|e| store_failure("render", e))?;

    let rendered = canned::render_response_at(&stored, &context, Utc::now());

    RENDERS_TOTAL.inc();
    RENDERED_CONTENT_BYTES.observe(rendered.len() as f64);

    Ok(Json(RenderedContentResponse { rendered }))
}
