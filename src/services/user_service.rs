//! Domain service for administrative account management.

use serde::Serialize;
use thiserror::Error;

use crate::models::account::{AccountStatus, Role};

#[derive(Debug, Error)]
pub enum UserError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Username already exists")]
    DuplicateUsername,

    #[error("User not found")]
    NotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub display_name: String,
    pub role: Role,
}

/// Admin-facing account summary (includes status, which the public
/// profile view leaves out).
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub username: String,
    pub display_name: String,
    pub role: Role,
    pub status: AccountStatus,
    pub access_count: i32,
}

/// Domain service trait for account management. All operations are
/// admin-only; the HTTP layer enforces the role gate before calling in.
#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Creates an account with status Active and zeroed counters.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::Validation`] for missing/oversized fields and
    /// [`UserError::DuplicateUsername`] when the username is taken.
    async fn create_user(&self, input: NewUser) -> Result<UserSummary, UserError>;

    async fn list_users(&self) -> Result<Vec<UserSummary>, UserError>;

    /// Changes an account's status. This is the only path that clears a
    /// Blocked status; the login flow never unblocks.
    async fn change_status(&self, username: &str, status: AccountStatus) -> Result<(), UserError>;
}
