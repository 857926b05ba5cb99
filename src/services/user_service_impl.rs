//! `SeaORM` implementation of the `UserService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::config::AuthConfig;
use crate::db::Store;
use crate::models::account::{Account, AccountStatus};
use crate::services::user_service::{NewUser, UserError, UserService, UserSummary};

const MAX_USERNAME_LEN: usize = 30;
const MAX_DISPLAY_NAME_LEN: usize = 120;

pub struct SeaOrmUserService {
    store: Store,
    config: AuthConfig,
}

impl SeaOrmUserService {
    #[must_use]
    pub const fn new(store: Store, config: AuthConfig) -> Self {
        Self { store, config }
    }
}

fn summarize(account: &Account) -> UserSummary {
    UserSummary {
        username: account.username.clone(),
        display_name: account.display_name.clone(),
        role: account.role,
        status: account.status,
        access_count: account.access_count,
    }
}

#[async_trait]
impl UserService for SeaOrmUserService {
    async fn create_user(&self, input: NewUser) -> Result<UserSummary, UserError> {
        let username = input.username.trim();
        let display_name = input.display_name.trim();

        if username.is_empty() || input.password.is_empty() || display_name.is_empty() {
            return Err(UserError::Validation(
                "Username, password and display name are required".to_string(),
            ));
        }

        if username.len() > MAX_USERNAME_LEN {
            return Err(UserError::Validation(format!(
                "Username must be {MAX_USERNAME_LEN} characters or less"
            )));
        }

        if display_name.len() > MAX_DISPLAY_NAME_LEN {
            return Err(UserError::Validation(format!(
                "Display name must be {MAX_DISPLAY_NAME_LEN} characters or less"
            )));
        }

        if self.store.get_account(username).await?.is_some() {
            return Err(UserError::DuplicateUsername);
        }

        let account = self
            .store
            .create_account(
                username,
                &input.password,
                display_name,
                input.role,
                &self.config,
            )
            .await?;

        info!("User created: {}", account.username);
        Ok(summarize(&account))
    }

    async fn list_users(&self) -> Result<Vec<UserSummary>, UserError> {
        let accounts = self.store.list_accounts().await?;
        Ok(accounts.iter().map(summarize).collect())
    }

    async fn change_status(&self, username: &str, status: AccountStatus) -> Result<(), UserError> {
        let found = self.store.set_account_status(username, status).await?;
        if !found {
            return Err(UserError::NotFound);
        }

        info!(
            "Status of user {} changed to {}",
            username.trim(),
            status.as_code()
        );
        Ok(())
    }
}
