use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::AuthConfig;
use crate::models::account::{Account, AccountStatus, Role};
use crate::models::book::{Book, BookInput, BookPage};

pub mod migrator;
pub mod repositories;

pub use repositories::account::verify_password;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let is_memory = db_url.contains(":memory:");
        if !is_memory {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        // In-memory SQLite keeps a separate database per connection, so the
        // pool must stay at exactly one connection there.
        let (max_connections, min_connections) = if is_memory {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn account_repo(&self) -> repositories::account::AccountRepository {
        repositories::account::AccountRepository::new(self.conn.clone())
    }

    fn book_repo(&self) -> repositories::book::BookRepository {
        repositories::book::BookRepository::new(self.conn.clone())
    }

    pub async fn get_account(&self, username: &str) -> Result<Option<Account>> {
        self.account_repo().get_by_username(username).await
    }

    pub async fn list_accounts(&self) -> Result<Vec<Account>> {
        self.account_repo().list().await
    }

    pub async fn create_account(
        &self,
        username: &str,
        password: &str,
        display_name: &str,
        role: Role,
        config: &AuthConfig,
    ) -> Result<Account> {
        self.account_repo()
            .create(username, password, display_name, role, config)
            .await
    }

    pub async fn record_login_success(&self, username: &str) -> Result<()> {
        self.account_repo().record_login_success(username).await
    }

    pub async fn record_login_failure(
        &self,
        username: &str,
        failed_attempts: i32,
        block: bool,
    ) -> Result<()> {
        self.account_repo()
            .record_login_failure(username, failed_attempts, block)
            .await
    }

    pub async fn set_account_status(&self, username: &str, status: AccountStatus) -> Result<bool> {
        self.account_repo().set_status(username, status).await
    }

    pub async fn update_account_password(
        &self,
        username: &str,
        new_password: &str,
        config: &AuthConfig,
    ) -> Result<()> {
        self.account_repo()
            .update_password(username, new_password, config)
            .await
    }

    pub async fn list_books(&self, owner: &str, page: u64, limit: u64) -> Result<BookPage> {
        self.book_repo().list_for_owner(owner, page, limit).await
    }

    pub async fn get_book(&self, id: i32) -> Result<Option<Book>> {
        self.book_repo().get(id).await
    }

    pub async fn create_book(&self, owner: &str, input: &BookInput) -> Result<Book> {
        self.book_repo().create(owner, input).await
    }

    pub async fn update_book(&self, id: i32, input: &BookInput) -> Result<Option<Book>> {
        self.book_repo().update(id, input).await
    }

    pub async fn delete_book(&self, id: i32) -> Result<bool> {
        self.book_repo().delete(id).await
    }
}
