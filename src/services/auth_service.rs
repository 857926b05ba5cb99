//! Domain service for authentication.
//!
//! Owns the login/lockout state machine, token verification against live
//! account status, and password changes.

use serde::Serialize;
use thiserror::Error;

use crate::models::account::{Profile, Role};

/// Errors specific to authentication operations.
///
/// `InvalidCredentials` deliberately covers both unknown-user and
/// wrong-password so the login response never reveals whether a username
/// exists; the specific reason is only logged server-side.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Username and password are required")]
    MissingCredentials,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is blocked")]
    Blocked,

    #[error("Account is inactive")]
    Inactive,

    #[error("Account blocked due to repeated failed attempts")]
    LockedOut,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Account not found")]
    NotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Login result: signed session token plus the public profile view.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub user: Profile,
    pub token: String,
}

/// Identity attached to a request after token verification.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub username: String,
    pub role: Role,
}

impl AuthSession {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Runs the login state machine for one attempt.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidCredentials`] on unknown user or wrong password,
    /// [`AuthError::Blocked`] / [`AuthError::Inactive`] when status forbids
    /// login (checked before the password), [`AuthError::LockedOut`] when
    /// this attempt crossed the failure threshold.
    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError>;

    /// Validates a bearer token and re-checks the account's live status.
    /// A token issued before a block is rejected here even while its
    /// signature and expiry are still valid.
    async fn authenticate(&self, token: &str) -> Result<AuthSession, AuthError>;

    /// Changes a user's password after re-authenticating with the current one.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidCredentials`] if the current password is wrong,
    /// [`AuthError::NotFound`] if the account no longer exists.
    async fn change_password(
        &self,
        username: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;
}
