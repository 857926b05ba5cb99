use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::services::{AuthSession, LoginResult};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Authentication middleware for all protected routes.
///
/// Expects `Authorization: Bearer <token>`; verifies the signature and
/// expiry, then re-checks the account's live status, so a block or
/// deactivation takes effect on the very next request. On success the
/// caller's [`AuthSession`] is attached to the request extensions.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = extract_bearer_token(&headers) else {
        return Err(ApiError::Unauthorized("Token not provided".to_string()));
    };

    let session = state.shared.auth_service.authenticate(&token).await?;

    tracing::Span::current().record("user_id", &session.username);
    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}

/// Role gate for admin-only routes, layered after `auth_middleware`.
/// Non-admin callers get 403 and the handler never runs.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let is_admin = request
        .extensions()
        .get::<AuthSession>()
        .is_some_and(AuthSession::is_admin);

    if !is_admin {
        return Err(ApiError::Forbidden("Permission denied".to_string()));
    }

    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer` header
fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers.get(AUTHORIZATION)?;
    let auth_str = auth_header.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?;
    Some(token.trim().to_string())
}

/// Lets handlers take the verified session as an extractor.
impl<S> axum::extract::FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /login
/// Run one attempt of the login state machine; returns the session token
/// and public profile on success.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResult>>, ApiError> {
    let result = state
        .shared
        .auth_service
        .login(&payload.username, &payload.password)
        .await?;

    Ok(Json(ApiResponse::success(result)))
}

/// POST /logout
/// Stateless: there is no server-side session to invalidate, the client
/// just discards its token.
pub async fn logout() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}
