//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::AuthConfig;
use crate::db::{Store, verify_password};
use crate::models::account::{AccountStatus, Profile};
use crate::services::auth_service::{AuthError, AuthService, AuthSession, LoginResult};
use crate::services::session::SessionKeys;

pub struct SeaOrmAuthService {
    store: Store,
    keys: SessionKeys,
    config: AuthConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub fn new(store: Store, config: AuthConfig) -> Self {
        let keys = SessionKeys::new(&config.jwt_secret, config.token_ttl_hours);
        Self {
            store,
            keys,
            config,
        }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let Some(account) = self.store.get_account(username).await? else {
            // Uniform client error; the real reason stays in the server log.
            debug!("Login failed: unknown user {username}");
            return Err(AuthError::InvalidCredentials);
        };

        // Status checks come before password verification: a correct
        // password on a blocked account still fails with the blocked message.
        match account.status {
            AccountStatus::Blocked => {
                debug!("Login refused: account {username} is blocked");
                return Err(AuthError::Blocked);
            }
            AccountStatus::Inactive => {
                debug!("Login refused: account {username} is inactive");
                return Err(AuthError::Inactive);
            }
            AccountStatus::Active => {}
        }

        let is_valid = verify_password(&account.password_hash, password).await?;

        if !is_valid {
            let attempts = account.failed_attempts + 1;
            let threshold = i32::try_from(self.config.max_failed_attempts).unwrap_or(3);
            let block = attempts >= threshold;

            self.store
                .record_login_failure(username, attempts, block)
                .await?;

            if block {
                warn!("Account {username} blocked after {attempts} failed login attempts");
                return Err(AuthError::LockedOut);
            }

            debug!("Login failed: wrong password for {username} (attempt {attempts})");
            return Err(AuthError::InvalidCredentials);
        }

        self.store.record_login_success(username).await?;
        info!("User {username} logged in");

        let token = self
            .keys
            .sign(&account.username, account.role)
            .map_err(|_| AuthError::Internal("Failed to sign session token".to_string()))?;

        let mut profile = Profile::from(&account);
        // The row update above already bumped the counter.
        profile.access_count = account.access_count + 1;

        Ok(LoginResult {
            user: profile,
            token,
        })
    }

    async fn authenticate(&self, token: &str) -> Result<AuthSession, AuthError> {
        let claims = self
            .keys
            .verify(token)
            .map_err(|_| AuthError::InvalidToken)?;

        // Session validity is re-derived from current account state, not
        // from the token payload alone.
        let Some(account) = self.store.get_account(claims.sub.trim()).await? else {
            return Err(AuthError::InvalidToken);
        };

        match account.status {
            AccountStatus::Blocked => Err(AuthError::Blocked),
            AccountStatus::Inactive => Err(AuthError::Inactive),
            AccountStatus::Active => Ok(AuthSession {
                username: account.username,
                role: account.role,
            }),
        }
    }

    async fn change_password(
        &self,
        username: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        if current_password.is_empty() || new_password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        if new_password.len() < 8 {
            return Err(AuthError::Validation(
                "New password must be at least 8 characters".to_string(),
            ));
        }

        if current_password == new_password {
            return Err(AuthError::Validation(
                "New password must be different from current password".to_string(),
            ));
        }

        let Some(account) = self.store.get_account(username).await? else {
            return Err(AuthError::NotFound);
        };

        let is_valid = verify_password(&account.password_hash, current_password).await?;
        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        self.store
            .update_account_password(username, new_password, &self.config)
            .await?;

        info!("Password changed for user {username}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::account::Role;

    async fn service_with_user(username: &str, password: &str) -> (SeaOrmAuthService, Store) {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let config = AuthConfig {
            // Keep hashing cheap in tests
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..AuthConfig::default()
        };
        store
            .create_account(username, password, "Test User", Role::Regular, &config)
            .await
            .unwrap();

        (SeaOrmAuthService::new(store.clone(), config), store)
    }

    #[tokio::test]
    async fn successful_login_resets_counter_and_bumps_access_count() {
        let (service, store) = service_with_user("carol", "secret-pw").await;

        let err = service.login("carol", "wrong").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        let result = service.login("carol", "secret-pw").await.unwrap();
        assert_eq!(result.user.username, "carol");
        assert_eq!(result.user.access_count, 1);
        assert!(!result.token.is_empty());

        let account = store.get_account("carol").await.unwrap().unwrap();
        assert_eq!(account.failed_attempts, 0);
        assert_eq!(account.access_count, 1);
        assert_eq!(account.status, AccountStatus::Active);
    }

    #[tokio::test]
    async fn three_failures_block_the_account() {
        let (service, store) = service_with_user("bob", "secret-pw").await;

        for expected in 1..=2 {
            let err = service.login("bob", "nope").await.unwrap_err();
            assert!(matches!(err, AuthError::InvalidCredentials));
            let account = store.get_account("bob").await.unwrap().unwrap();
            assert_eq!(account.failed_attempts, expected);
            assert_eq!(account.status, AccountStatus::Active);
        }

        // Third failure crosses the threshold: distinct error, blocked row.
        let err = service.login("bob", "nope").await.unwrap_err();
        assert!(matches!(err, AuthError::LockedOut));

        let account = store.get_account("bob").await.unwrap().unwrap();
        assert_eq!(account.failed_attempts, 3);
        assert_eq!(account.status, AccountStatus::Blocked);

        // Correct password no longer helps.
        let err = service.login("bob", "secret-pw").await.unwrap_err();
        assert!(matches!(err, AuthError::Blocked));
    }

    #[tokio::test]
    async fn inactive_account_rejected_without_password_check() {
        let (service, store) = service_with_user("dave", "secret-pw").await;
        store
            .set_account_status("dave", AccountStatus::Inactive)
            .await
            .unwrap();

        // Wrong password: inactive message wins and the counter stays put.
        let err = service.login("dave", "wrong").await.unwrap_err();
        assert!(matches!(err, AuthError::Inactive));

        let err = service.login("dave", "secret-pw").await.unwrap_err();
        assert!(matches!(err, AuthError::Inactive));

        let account = store.get_account("dave").await.unwrap().unwrap();
        assert_eq!(account.failed_attempts, 0);
    }

    #[tokio::test]
    async fn username_lookup_trims_whitespace() {
        let (service, _store) = service_with_user("alice", "secret-pw").await;

        let result = service.login("  alice  ", "secret-pw").await.unwrap();
        assert_eq!(result.user.username, "alice");
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_share_one_error() {
        let (service, _store) = service_with_user("alice", "secret-pw").await;

        let unknown = service.login("mallory", "whatever").await.unwrap_err();
        let wrong = service.login("alice", "whatever").await.unwrap_err();
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn token_rejected_after_block() {
        let (service, store) = service_with_user("erin", "secret-pw").await;

        let token = service.login("erin", "secret-pw").await.unwrap().token;
        assert!(service.authenticate(&token).await.is_ok());

        store
            .set_account_status("erin", AccountStatus::Blocked)
            .await
            .unwrap();

        let err = service.authenticate(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::Blocked));
    }

    #[tokio::test]
    async fn change_password_requires_current_password() {
        let (service, _store) = service_with_user("frank", "old-password").await;

        let err = service
            .change_password("frank", "wrong", "new-password-1")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        service
            .change_password("frank", "old-password", "new-password-1")
            .await
            .unwrap();

        assert!(service.login("frank", "old-password").await.is_err());
        assert!(service.login("frank", "new-password-1").await.is_ok());
    }

    #[tokio::test]
    async fn garbage_token_is_unauthorized() {
        let (service, _store) = service_with_user("gina", "secret-pw").await;

        let err = service.authenticate("bogus.token.here").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }
}
