//! The pool manager: one pool registry and one result cache behind a single
//! value.
//!
//! `DatabasePools` owns both maps exclusively; share it with `Arc` rather
//! than through a global. Query execution lives in
//! [`executor`](super::executor); this module covers construction and pool
//! lifecycle.

use crate::config::{CacheOptions, DatabaseConfig};
use crate::db::backend::PoolFactory;
use crate::db::cache::ResultCache;
use crate::db::pool::{DirectConnection, SqlxPoolFactory};
use crate::db::registry::PoolRegistry;
use crate::error::DbResult;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub struct DatabasePools<F: PoolFactory = SqlxPoolFactory> {
    pub(crate) registry: PoolRegistry<F>,
    pub(crate) cache: ResultCache,
}

impl DatabasePools<SqlxPoolFactory> {
    /// Create a manager over sqlx pools sharing `config`.
    pub fn new(config: DatabaseConfig, options: CacheOptions) -> DbResult<Self> {
        Ok(Self::with_factory(SqlxPoolFactory::new(config)?, options))
    }

    /// Parse `url` as the shared base configuration and create a manager.
    pub fn from_url(url: &str, options: CacheOptions) -> DbResult<Self> {
        Self::new(DatabaseConfig::parse(url)?, options)
    }

    /// Open a standalone connection to `database`, outside any pool.
    pub async fn connect_single(&self, database: &str) -> DbResult<DirectConnection> {
        self.registry.factory().connect_single(database).await
    }
}

impl<F: PoolFactory> DatabasePools<F> {
    /// Create a manager over pools produced by `factory`.
    pub fn with_factory(factory: F, options: CacheOptions) -> Self {
        let cache = ResultCache::new(&options);
        info!(
            cache_enabled = cache.is_enabled(),
            life_time_ms = u64::try_from(cache.life_time().as_millis()).unwrap_or(u64::MAX),
            "Created database pool manager"
        );

        Self {
            registry: PoolRegistry::new(factory),
            cache,
        }
    }

    pub fn factory(&self) -> &F {
        self.registry.factory()
    }

    /// Get the pool for `database`, creating it on first use.
    ///
    /// Fails with a configuration error when the backend rejects the name
    /// (a SQLite name that would leave the data directory).
    pub fn get(&self, database: &str) -> DbResult<Arc<F::Pool>> {
        self.registry.get(database)
    }

    /// Whether a pool is registered for `database`.
    pub fn contains(&self, database: &str) -> bool {
        self.registry.contains(database)
    }

    /// Close the pool for `database` and forget it. No-op when absent.
    pub async fn delete(&self, database: &str) {
        self.registry.delete(database).await;
    }

    /// Close every pool.
    ///
    /// The registry is cleared too, so a later `get` or query builds a new,
    /// open pool instead of handing back a closed one.
    pub async fn destroy(&self) {
        self.registry.destroy().await;
    }

    pub fn pool_count(&self) -> usize {
        self.registry.len()
    }

    pub fn is_cache_enabled(&self) -> bool {
        self.cache.is_enabled()
    }

    pub fn life_time(&self) -> Duration {
        self.cache.life_time()
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Drop the cached result of `sql` on `database`, if any.
    pub fn invalidate(&self, database: &str, sql: &str) -> bool {
        self.cache.invalidate(database, sql)
    }
}

impl<F: PoolFactory> std::fmt::Debug for DatabasePools<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabasePools")
            .field("registry", &self.registry)
            .field("cache", &self.cache)
            .finish()
    }
}
