use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::ChangePasswordRequest;
use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::models::account::{AccountStatus, Profile, Role};
use crate::services::{AuthSession, NewUser, UserSummary};

#[derive(Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub display_name: String,
    /// Defaults to a regular user when omitted
    pub role: Option<Role>,
}

#[derive(Deserialize)]
pub struct ChangeStatusRequest {
    pub status: String,
}

/// GET /users/me
/// Current user's public profile
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
) -> Result<Json<ApiResponse<Profile>>, ApiError> {
    let account = state
        .shared
        .store
        .get_account(&session.username)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to load account: {e}")))?
        .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".to_string()))?;

    Ok(Json(ApiResponse::success(Profile::from(&account))))
}

/// POST /users/change-password
/// Change own password after re-authenticating with the current one
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .shared
        .auth_service
        .change_password(
            &session.username,
            &payload.current_password,
            &payload.new_password,
        )
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Password updated successfully",
    ))))
}

/// POST /users (admin)
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserSummary>>), ApiError> {
    let created = state
        .shared
        .user_service
        .create_user(NewUser {
            username: payload.username,
            password: payload.password,
            display_name: payload.display_name,
            role: payload.role.unwrap_or(Role::Regular),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

/// GET /users (admin)
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<UserSummary>>>, ApiError> {
    let users = state.shared.user_service.list_users().await?;
    Ok(Json(ApiResponse::success(users)))
}

/// PATCH /users/{username}/status (admin)
/// Body carries the status code ("A" | "I" | "B"); this is the only way
/// to clear a Blocked status.
pub async fn change_status(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Json(payload): Json<ChangeStatusRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let Some(status) = AccountStatus::from_code(&payload.status) else {
        return Err(ApiError::validation("Invalid status"));
    };

    state
        .shared
        .user_service
        .change_status(&username, status)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "User status updated successfully",
    ))))
}
