use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::models::book::{Book, BookInput, BookPage};
use crate::services::AuthSession;

const DEFAULT_PAGE_SIZE: u64 = 7;

#[derive(Deserialize)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    /// Another user's shelf; admin-only
    pub user: Option<String>,
}

#[derive(Deserialize)]
pub struct BookRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub read_on: String,
    pub rating: Option<i32>,
    pub review: Option<String>,
}

impl From<BookRequest> for BookInput {
    fn from(req: BookRequest) -> Self {
        Self {
            title: req.title,
            author: req.author,
            read_on: req.read_on,
            rating: req.rating,
            review: req.review,
        }
    }
}

/// GET /books
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<BookPage>>, ApiError> {
    let page = state
        .shared
        .book_service
        .list(
            &session,
            query.page.unwrap_or(1),
            query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
            query.user.as_deref(),
        )
        .await?;

    Ok(Json(ApiResponse::success(page)))
}

/// GET /books/{id}
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Book>>, ApiError> {
    let book = state.shared.book_service.get(&session, id).await?;
    Ok(Json(ApiResponse::success(book)))
}

/// POST /books
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Json(payload): Json<BookRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Book>>), ApiError> {
    let book = state
        .shared
        .book_service
        .create(&session, payload.into())
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(book))))
}

/// PUT /books/{id}
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Path(id): Path<i32>,
    Json(payload): Json<BookRequest>,
) -> Result<Json<ApiResponse<Book>>, ApiError> {
    let book = state
        .shared
        .book_service
        .update(&session, id, payload.into())
        .await?;

    Ok(Json(ApiResponse::success(book)))
}

/// DELETE /books/{id}
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    state.shared.book_service.delete(&session, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
