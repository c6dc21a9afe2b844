//! Per-database pool registry.
//!
//! Holds at most one pool per database name. Pools are created on first
//! request from the shared [`PoolFactory`] and live until deleted or the
//! registry is destroyed.
//!
//! # Locking
//!
//! The map sits behind a `std::sync::RwLock` that is never held across an
//! await point: `delete` and `destroy` detach pools under the lock and close
//! them after releasing it.

use crate::db::backend::{ConnectionPool, PoolFactory};
use crate::error::DbResult;
use futures_util::future::join_all;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::info;

type PoolMap<P> = HashMap<String, Arc<P>>;

pub struct PoolRegistry<F: PoolFactory> {
    factory: F,
    pools: RwLock<PoolMap<F::Pool>>,
}

impl<F: PoolFactory> PoolRegistry<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            pools: RwLock::new(HashMap::new()),
        }
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Get the pool for `database`, creating it on first use.
    ///
    /// Fails only when the factory rejects the name; nothing is registered
    /// then.
    pub fn get(&self, database: &str) -> DbResult<Arc<F::Pool>> {
        if let Some(pool) = self.read().get(database) {
            return Ok(Arc::clone(pool));
        }

        let mut pools = self.write();
        // Double-check after acquiring write lock
        if let Some(pool) = pools.get(database) {
            return Ok(Arc::clone(pool));
        }

        info!(database = %database, "Creating connection pool");
        let pool = Arc::new(self.factory.create_pool(database)?);
        pools.insert(database.to_string(), Arc::clone(&pool));
        Ok(pool)
    }

    pub fn contains(&self, database: &str) -> bool {
        self.read().contains_key(database)
    }

    /// Registered database names, unordered.
    pub fn databases(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Close and unregister the pool for `database`. Returns false when no
    /// pool was registered.
    pub async fn delete(&self, database: &str) -> bool {
        let removed = self.write().remove(database);
        let Some(pool) = removed else {
            return false;
        };

        info!(database = %database, "Closing connection pool");
        pool.close().await;
        true
    }

    /// Close every registered pool and clear the registry.
    ///
    /// Returns the number of pools closed. Later requests create new pools.
    pub async fn destroy(&self) -> usize {
        let pools: Vec<(String, Arc<F::Pool>)> = self.write().drain().collect();

        join_all(pools.iter().map(|(database, pool)| async move {
            info!(database = %database, "Closing connection pool");
            pool.close().await;
        }))
        .await;

        info!(count = pools.len(), "All connection pools closed");
        pools.len()
    }

    fn read(&self) -> RwLockReadGuard<'_, PoolMap<F::Pool>> {
        self.pools.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, PoolMap<F::Pool>> {
        self.pools.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<F: PoolFactory> std::fmt::Debug for PoolRegistry<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolRegistry")
            .field("databases", &self.databases())
            .finish()
    }
}
