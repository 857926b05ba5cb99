//! Domain service for book records.
//!
//! Books are plain owner-scoped CRUD; the only rule of interest is that
//! admins may touch any owner's records while regular users only their own.

use thiserror::Error;

use crate::models::book::{Book, BookInput, BookPage};
use crate::services::auth_service::AuthSession;

#[derive(Debug, Error)]
pub enum BookError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Book not found")]
    NotFound,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for BookError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Domain service trait for book records. Every operation takes the
/// caller's [`AuthSession`] and enforces owner-or-admin access.
#[async_trait::async_trait]
pub trait BookService: Send + Sync {
    /// Lists one page of books. `owner_filter` selects another user's
    /// shelf and is admin-only.
    async fn list(
        &self,
        session: &AuthSession,
        page: u64,
        limit: u64,
        owner_filter: Option<&str>,
    ) -> Result<BookPage, BookError>;

    async fn get(&self, session: &AuthSession, id: i32) -> Result<Book, BookError>;

    async fn create(&self, session: &AuthSession, input: BookInput) -> Result<Book, BookError>;

    async fn update(
        &self,
        session: &AuthSession,
        id: i32,
        input: BookInput,
    ) -> Result<Book, BookError>;

    async fn delete(&self, session: &AuthSession, id: i32) -> Result<(), BookError>;
}
