use crate::config::AppConfig;
use crate::db::{DbPool, OrmConn, orm_from_pool};
use crate::notify::CatalogNotifier;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub public_base_url: Option<String>,
    pub notifier: CatalogNotifier,
}

impl AppState {
    pub fn new(pool: DbPool, config: &AppConfig) -> Self {
        Self {
            orm: orm_from_pool(&pool),
            pool,
            public_base_url: config.public_base_url.clone(),
            notifier: CatalogNotifier::new(config.catalog_webhook_url.clone()),
        }
    }
}
