//! Canned response CRUD and lookup endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::canned::{
    CannedResponse, CannedResponseError, CannedResponseListResponse, CategoryListResponse,
    CreateCannedResponseRequest, UpdateCannedResponseRequest,
};
use crate::metrics::{
    record_shortcut_lookup, RESPONSES_CREATED_TOTAL, RESPONSES_DELETED_TOTAL,
    RESPONSES_UPDATED_TOTAL, SEARCHES_TOTAL, STORE_ERRORS_TOTAL, USAGE_RECORDED_TOTAL,
};
use crate::server::{AppState, OrgContext};

#[derive(Debug, Serialize)]
pub struct CannedErrorResponse {
    pub error: CannedErrorInfo,
}

#[derive(Debug, Serialize)]
pub struct CannedErrorInfo {
    pub code: String,
    pub message: String,
}

impl From<CannedResponseError> for (StatusCode, Json<CannedErrorResponse>) {
    fn from(err: CannedResponseError) -> Self {
        let (status, code) = match &err {
            CannedResponseError::NotFound(_) => (StatusCode::NOT_FOUND, "RESPONSE_NOT_FOUND"),
            CannedResponseError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            CannedResponseError::Postgres(_) | CannedResponseError::Serialization(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR")
            }
        };

        (
            status,
            Json(CannedErrorResponse {
                error: CannedErrorInfo {
                    code: code.to_string(),
                    message: err.to_string(),
                },
            }),
        )
    }
}

/// Convert a backend failure, counting infrastructure errors per operation.
pub(super) fn store_failure(
    operation: &str,
    err: CannedResponseError,
) -> (StatusCode, Json<CannedErrorResponse>) {
    if matches!(
        err,
        CannedResponseError::Postgres(_) | CannedResponseError::Serialization(_)
    ) {
        STORE_ERRORS_TOTAL.with_label_values(&[operation]).inc();
    }
    err.into()
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Restrict the listing to one category
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Free-text query matched against name, content, and category
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct ShortcutLookupResponse {
    /// The owning response, or null when no shortcut matches
    pub response: Option<CannedResponse>,
}

/// POST /api/v1/canned-responses - Create a new canned response
#[tracing::instrument(
    name = "http.create_canned_response",
    skip(state, request),
    fields(organization_id = %ctx.organization_id)
)]
pub async fn create_response(
    ctx: OrgContext,
    State(state): State<AppState>,
    Json(request): Json<CreateCannedResponseRequest>,
) -> Result<(StatusCode, Json<CannedResponse>), (StatusCode, Json<CannedErrorResponse>)> {
    let response = CannedResponse::from_request(
        ctx.organization_id.as_str(),
        Some(ctx.user_id.clone()),
        request,
    );

    match state.store.create(response).await {
        Ok(created) => {
            RESPONSES_CREATED_TOTAL.inc();
            Ok((StatusCode::CREATED, Json(created)))
        }
        Err(e) => Err(store_failure("create", e)),
    }
}

/// GET /api/v1/canned-responses - List the organization's responses
#[tracing::instrument(
    name = "http.list_canned_responses",
    skip(state),
    fields(organization_id = %ctx.organization_id)
)]
pub async fn list_responses(
    ctx: OrgContext,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<CannedResponseListResponse>, (StatusCode, Json<CannedErrorResponse>)> {
    let responses = state
        .store
        .list(&ctx.organization_id, query.category.as_deref())
        .await
        .map_err(|e| store_failure("list", e))?;
    let total = responses.len();

    Ok(Json(CannedResponseListResponse { responses, total }))
}

/// GET /api/v1/canned-responses/categories - Distinct categories in use
#[tracing::instrument(
    name = "http.list_canned_response_categories",
    skip(state),
    fields(organization_id = %ctx.organization_id)
)]
pub async fn list_categories(
    ctx: OrgContext,
    State(state): State<AppState>,
) -> Result<Json<CategoryListResponse>, (StatusCode, Json<CannedErrorResponse>)> {
    let categories = state
        .store
        .list_categories(&ctx.organization_id)
        .await
        .map_err(|e| store_failure("list_categories", e))?;

    Ok(Json(CategoryListResponse { categories }))
}

/// GET /api/v1/canned-responses/search?q= - Free-text search
#[tracing::instrument(
    name = "http.search_canned_responses",
    skip(state),
    fields(organization_id = %ctx.organization_id)
)]
pub async fn search_responses(
    ctx: OrgContext,
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<CannedResponseListResponse>, (StatusCode, Json<CannedErrorResponse>)> {
    SEARCHES_TOTAL.inc();

    let responses = state
        .store
        .search(&ctx.organization_id, &query.q)
        .await
        .map_err(|e| store_failure("search", e))?;
    let total = responses.len();

    Ok(Json(CannedResponseListResponse { responses, total }))
}

/// GET /api/v1/canned-responses/shortcut/{shortcut} - Quick-insert lookup
///
/// A miss is a success state: the body carries `"response": null`.
#[tracing::instrument(
    name = "http.get_canned_response_by_shortcut",
    skip(state),
    fields(organization_id = %ctx.organization_id)
)]
pub async fn get_by_shortcut(
    ctx: OrgContext,
    State(state): State<AppState>,
    Path(shortcut): Path<String>,
) -> Result<Json<ShortcutLookupResponse>, (StatusCode, Json<CannedErrorResponse>)> {
    let response = state
        .store
        .get_by_shortcut(&ctx.organization_id, &shortcut)
        .await
        .map_err(|e| store_failure("get_by_shortcut", e))?;

    record_shortcut_lookup(response.is_some());

    Ok(Json(ShortcutLookupResponse { response }))
}

/// GET /api/v1/canned-responses/{id} - Fetch a specific response
#[tracing::instrument(
    name = "http.get_canned_response",
    skip(state),
    fields(organization_id = %ctx.organization_id)
)]
pub async fn get_response(
    ctx: OrgContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CannedResponse>, (StatusCode, Json<CannedErrorResponse>)> {
    match state.store.get(&ctx.organization_id, id).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => Err(store_failure("get", e)),
    }
}

/// PUT /api/v1/canned-responses/{id} - Partially update a response
#[tracing::instrument(
    name = "http.update_canned_response",
    skip(state, request),
    fields(organization_id = %ctx.organization_id)
)]
pub async fn update_response(
    ctx: OrgContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCannedResponseRequest>,
) -> Result<Json<CannedResponse>, (StatusCode, Json<CannedErrorResponse>)> {
    match state.store.update(&ctx.organization_id, id, request).await {
        Ok(updated) => {
            RESPONSES_UPDATED_TOTAL.inc();
            Ok(Json(updated))
        }
        Err(e) => Err(store_failure("update", e)),
    }
}

/// DELETE /api/v1/canned-responses/{id} - Delete a response
#[tracing::instrument(
    name = "http.delete_canned_response",
    skip(state),
    fields(organization_id = %ctx.organization_id)
)]
pub async fn delete_response(
    ctx: OrgContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, Json<CannedErrorResponse>)> {
    match state.store.delete(&ctx.organization_id, id).await {
        Ok(()) => {
            RESPONSES_DELETED_TOTAL.inc();
            Ok(StatusCode::NO_CONTENT)
        }
        Err(e) => Err(store_failure("delete", e)),
    }
}

/// POST /api/v1/canned-responses/{id}/usage - Record one use
#[tracing::instrument(
    name = "http.record_canned_response_usage",
    skip(state),
    fields(organization_id = %ctx.organization_id)
)]
pub async fn record_usage(
    ctx: OrgContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, Json<CannedErrorResponse>)> {
    match state.store.record_usage(&ctx.organization_id, id).await {
        Ok(()) => {
            USAGE_RECORDED_TOTAL.inc();
            Ok(StatusCode::NO_CONTENT)
        }
        Err(e) => Err(store_failure("record_usage", e)),
    }
}
