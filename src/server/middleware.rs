use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, Request},
    middleware::Next,
    response::Response,
};

use crate::error::AppError;

use super::AppState;

/// Authenticated request context: the acting user and their organization.
///
/// Inserted by [`require_auth`]; handlers receive it as an extractor.
#[derive(Debug, Clone)]
pub struct OrgContext {
    /// Tenant partition key; every storage operation is scoped to it
    pub organization_id: String,
    /// Acting user id (JWT subject)
    pub user_id: String,
}

impl<S> FromRequestParts<S> for OrgContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<OrgContext>()
            .cloned()
            .ok_or_else(|| AppError::Auth("Missing authentication context".to_string()))
    }
}

/// Bearer-token authentication middleware.
///
/// Validates the JWT once per request and injects an [`OrgContext`] so
/// handlers never touch raw tokens.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&req)
        .ok_or_else(|| AppError::Auth("Missing bearer token".to_string()))?;

    let claims = state.jwt_validator.validate(token)?;

    let context = OrgContext {
        organization_id: claims.organization_id().to_string(),
        user_id: claims.user_id().to_string(),
    };

    tracing::debug!(
        organization_id = %context.organization_id,
        user_id = %context.user_id,
        "Request authenticated"
    );

    req.extensions_mut().insert(context);
    Ok(next.run(req).await)
}

/// Extract bearer token from Authorization header
pub fn extract_bearer_token(req: &Request<Body>) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}
