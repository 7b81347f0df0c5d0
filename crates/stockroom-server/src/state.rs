//! Shared application state.

use std::sync::Arc;

use anyhow::Context;
use stockroom_auth::{AuthSessions, PasswordHasher, UserService};
use stockroom_cache::Cache;
use stockroom_commerce::service::{AuditService, CartService, CategoryService, ProductService};
use stockroom_db::Datastore;

use crate::config::AppConfig;
use crate::media::ImageStore;

/// Everything a handler needs. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Datastore>,
    pub products: ProductService,
    pub categories: CategoryService,
    pub carts: CartService,
    pub audit: AuditService,
    pub users: UserService,
    pub sessions: AuthSessions,
    /// Backing store of `sessions`.
    pub cache: Cache,
    pub media: ImageStore,
}

impl AppState {
    /// Wire services over an already opened store.
    pub fn new(config: AppConfig, store: Arc<dyn Datastore>, hasher: PasswordHasher) -> Self {
        let cache = Cache::new();
        let sessions = AuthSessions::new(cache.clone(), config.session.ttl());
        let media = ImageStore::new(&config.media.dir, &config.media.base_url);
        Self {
            products: ProductService::new(Arc::clone(&store)),
            categories: CategoryService::new(Arc::clone(&store)),
            carts: CartService::new(Arc::clone(&store)),
            audit: AuditService::new(Arc::clone(&store)),
            users: UserService::new(Arc::clone(&store), hasher),
            sessions,
            cache,
            media,
            store,
            config: Arc::new(config),
        }
    }

    /// Open the configured backend and wire services over it.
    pub async fn open(config: AppConfig) -> anyhow::Result<Self> {
        let store = stockroom_db::open(config.storage.backend, &config.storage.database_url)
            .await
            .with_context(|| format!("Failed to open {} datastore", config.storage.backend))?;
        Ok(Self::new(config, store, PasswordHasher::default()))
    }

    pub fn cookie_name(&self) -> &str {
        &self.config.session.cookie_name
    }
}
