use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, BookService, SeaOrmAuthService, SeaOrmBookService, SeaOrmUserService, UserService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Config,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub user_service: Arc<dyn UserService>,

    pub book_service: Arc<dyn BookService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let auth_service = Arc::new(SeaOrmAuthService::new(store.clone(), config.auth.clone()))
            as Arc<dyn AuthService>;
        let user_service = Arc::new(SeaOrmUserService::new(store.clone(), config.auth.clone()))
            as Arc<dyn UserService>;
        let book_service = Arc::new(SeaOrmBookService::new(store.clone())) as Arc<dyn BookService>;

        Ok(Self {
            config,
            store,
            auth_service,
            user_service,
            book_service,
        })
    }
}
