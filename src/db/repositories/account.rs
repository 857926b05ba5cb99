use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tokio::task;

use crate::config::AuthConfig;
use crate::entities::accounts;
use crate::models::account::{Account, AccountStatus, Role};

impl TryFrom<accounts::Model> for Account {
    type Error = anyhow::Error;

    fn try_from(model: accounts::Model) -> Result<Self> {
        let status = AccountStatus::from_code(&model.status).with_context(|| {
            format!(
                "Unknown status code {:?} for account {}",
                model.status, model.username
            )
        })?;

        Ok(Self {
            username: model.username,
            password_hash: model.password_hash,
            display_name: model.display_name,
            role: Role::from_code(&model.role),
            status,
            failed_attempts: model.failed_attempts,
            access_count: model.access_count,
        })
    }
}

pub struct AccountRepository {
    conn: DatabaseConnection,
}

impl AccountRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Get an account by username. The username is trimmed of surrounding
    /// whitespace before the lookup, so `" alice "` resolves to `"alice"`.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<Account>> {
        let model = accounts::Entity::find()
            .filter(accounts::Column::Username.eq(username.trim()))
            .one(&self.conn)
            .await
            .context("Failed to query account by username")?;

        model.map(Account::try_from).transpose()
    }

    pub async fn list(&self) -> Result<Vec<Account>> {
        let models = accounts::Entity::find()
            .order_by_asc(accounts::Column::Username)
            .all(&self.conn)
            .await
            .context("Failed to list accounts")?;

        models.into_iter().map(Account::try_from).collect()
    }

    /// Create an account with status Active and zeroed counters.
    pub async fn create(
        &self,
        username: &str,
        password: &str,
        display_name: &str,
        role: Role,
        config: &AuthConfig,
    ) -> Result<Account> {
        let password = password.to_string();
        let config = config.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password, &config))
            .await
            .context("Password hashing task panicked")??;

        let now = chrono::Utc::now().to_rfc3339();

        let active = accounts::ActiveModel {
            username: Set(username.trim().to_string()),
            password_hash: Set(password_hash),
            display_name: Set(display_name.trim().to_string()),
            role: Set(role.as_code().to_string()),
            status: Set(AccountStatus::Active.as_code().to_string()),
            failed_attempts: Set(0),
            access_count: Set(0),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert account")?;

        Account::try_from(model)
    }

    /// Reset the failure counter and bump the access counter in one row
    /// update. Runs after a successful password check.
    pub async fn record_login_success(&self, username: &str) -> Result<()> {
        accounts::Entity::update_many()
            .col_expr(accounts::Column::FailedAttempts, Expr::value(0))
            .col_expr(
                accounts::Column::AccessCount,
                Expr::col(accounts::Column::AccessCount).add(1),
            )
            .col_expr(
                accounts::Column::UpdatedAt,
                Expr::value(chrono::Utc::now().to_rfc3339()),
            )
            .filter(accounts::Column::Username.eq(username.trim()))
            .exec(&self.conn)
            .await
            .context("Failed to record login success")?;

        Ok(())
    }

    /// Persist a failed attempt count, transitioning to Blocked in the same
    /// row update when the lockout threshold was reached.
    pub async fn record_login_failure(
        &self,
        username: &str,
        failed_attempts: i32,
        block: bool,
    ) -> Result<()> {
        let mut update = accounts::Entity::update_many()
            .col_expr(accounts::Column::FailedAttempts, Expr::value(failed_attempts))
            .col_expr(
                accounts::Column::UpdatedAt,
                Expr::value(chrono::Utc::now().to_rfc3339()),
            );

        if block {
            update = update.col_expr(
                accounts::Column::Status,
                Expr::value(AccountStatus::Blocked.as_code()),
            );
        }

        update
            .filter(accounts::Column::Username.eq(username.trim()))
            .exec(&self.conn)
            .await
            .context("Failed to record login failure")?;

        Ok(())
    }

    /// Set account status. Returns false if no such account exists.
    /// This is the only path that clears a Blocked status.
    pub async fn set_status(&self, username: &str, status: AccountStatus) -> Result<bool> {
        let model = accounts::Entity::find()
            .filter(accounts::Column::Username.eq(username.trim()))
            .one(&self.conn)
            .await
            .context("Failed to query account for status change")?;

        let Some(model) = model else {
            return Ok(false);
        };

        let mut active: accounts::ActiveModel = model.into();
        active.status = Set(status.as_code().to_string());
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(&self.conn).await?;

        Ok(true)
    }

    /// Update the password hash for an account (hashes the new password).
    pub async fn update_password(
        &self,
        username: &str,
        new_password: &str,
        config: &AuthConfig,
    ) -> Result<()> {
        let model = accounts::Entity::find()
            .filter(accounts::Column::Username.eq(username.trim()))
            .one(&self.conn)
            .await
            .context("Failed to query account for password update")?
            .ok_or_else(|| anyhow::anyhow!("Account not found: {username}"))?;

        let password = new_password.to_string();
        let config = config.clone();
        let new_hash = task::spawn_blocking(move || hash_password(&password, &config))
            .await
            .context("Password hashing task panicked")??;

        let mut active: accounts::ActiveModel = model.into();
        active.password_hash = Set(new_hash);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(&self.conn).await?;

        Ok(())
    }
}

/// Verify a password against a stored Argon2 hash.
/// Note: runs on `spawn_blocking` because Argon2 is CPU-intensive and would
/// block the async runtime if run directly.
pub async fn verify_password(password_hash: &str, password: &str) -> Result<bool> {
    let password_hash = password_hash.to_string();
    let password = password.to_string();

    let is_valid = task::spawn_blocking(move || {
        let parsed_hash = PasswordHash::new(&password_hash)
            .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

        let argon2 = Argon2::default();
        Ok::<bool, anyhow::Error>(
            argon2
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok(),
        )
    })
    .await
    .context("Password verification task panicked")??;

    Ok(is_valid)
}

/// Hash a password using Argon2id with the configured params.
pub fn hash_password(password: &str, config: &AuthConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None, // output length (use default)
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}
