//! Query execution through the cache and the pool registry.
//!
//! Every entry point runs the same algorithm:
//!
//! 1. Unless caching is disabled or the call is forced, serve a fresh cached
//!    result without touching any pool.
//! 2. Get (or create) the pool for the database and acquire a connection. A
//!    database name the backend rejects fails here.
//! 3. Execute the statement, then release the connection before the outcome
//!    is delivered, whether execution succeeded or not.
//! 4. Write successful results that carry rows through to the cache (forced
//!    calls included), then deliver them. Write results are never cached.
//!
//! Failures leave the component as their message text only. Nothing is
//! retried, and concurrent misses on the same statement each run it.
//!
//! [`DatabasePools::execute`] delivers through completion callbacks,
//! [`DatabasePools::execute_async`] as a future, and
//! [`DatabasePools::execute_as`] decodes rows into a caller-chosen type.

use crate::db::backend::{ConnectionPool, PoolFactory, PooledConnection};
use crate::db::manager::DatabasePools;
use crate::error::DbResult;
use crate::models::QueryResult;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome delivered to callers: the result, or the failure message.
pub type ExecuteResult<T = Arc<QueryResult>> = Result<T, String>;

impl<F: PoolFactory> DatabasePools<F> {
    /// Run `sql` on `database`, completing through exactly one of
    /// `on_success` or `on_failure`.
    ///
    /// A fresh cache hit calls `on_success` before this returns. Otherwise
    /// the query runs on a spawned task.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime on a cache miss.
    pub fn execute<S, E>(
        self: &Arc<Self>,
        database: &str,
        sql: &str,
        on_success: S,
        on_failure: E,
        force_sql: bool,
    ) where
        S: FnOnce(Arc<QueryResult>) + Send + 'static,
        E: FnOnce(String) + Send + 'static,
    {
        if let Some(data) = self.cached(database, sql, force_sql) {
            on_success(data);
            return;
        }

        let pools = Arc::clone(self);
        let database = database.to_string();
        let sql = sql.to_string();
        tokio::spawn(async move {
            match pools.query_through(&database, &sql).await {
                Ok(data) => on_success(data),
                Err(e) => on_failure(e.message().to_string()),
            }
        });
    }

    /// Run `sql` on `database` and wait for the outcome.
    pub async fn execute_async(
        &self,
        database: &str,
        sql: &str,
        force_sql: bool,
    ) -> ExecuteResult {
        if let Some(data) = self.cached(database, sql, force_sql) {
            return Ok(data);
        }

        self.query_through(database, sql)
            .await
            .map_err(|e| e.message().to_string())
    }

    /// Like [`execute_async`](Self::execute_async), decoding every row into `T`.
    pub async fn execute_as<T: DeserializeOwned>(
        &self,
        database: &str,
        sql: &str,
        force_sql: bool,
    ) -> ExecuteResult<Vec<T>> {
        let data = self.execute_async(database, sql, force_sql).await?;
        data.decode_rows().map_err(|e| e.message().to_string())
    }

    /// Step 1: serve from cache unless forced.
    fn cached(&self, database: &str, sql: &str, force_sql: bool) -> Option<Arc<QueryResult>> {
        if force_sql {
            return None;
        }

        let hit = self.cache.lookup(database, sql);
        debug!(database = %database, cached = hit.is_some(), "Cache lookup");
        hit
    }

    /// Steps 2-4: acquire, execute, release, write through.
    async fn query_through(&self, database: &str, sql: &str) -> DbResult<Arc<QueryResult>> {
        let pool = self.registry.get(database).inspect_err(|e| {
            warn!(database = %database, error = %e, "Cannot create connection pool");
        })?;

        let mut connection = pool.acquire().await.inspect_err(|e| {
            warn!(database = %database, error = %e, "Failed to acquire connection");
        })?;

        debug!(database = %database, sql = %sql, "Executing statement");
        let outcome = connection.execute(sql).await;
        pool.release(connection);

        let data = Arc::new(outcome.inspect_err(|e| {
            warn!(database = %database, error = %e, "Statement failed");
        })?);

        if self.cache.store(database, sql, Arc::clone(&data)) {
            debug!(database = %database, rows = data.row_count(), "Cached result");
        }
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheOptions;

    #[tokio::test]
    async fn test_execute_async_on_sqlite() {
        let pools = DatabasePools::from_url("sqlite::memory:", CacheOptions::default()).unwrap();

        let data = pools
            .execute_async("orders", "SELECT 1 AS one", false)
            .await
            .unwrap();
        assert_eq!(data.rows[0]["one"], serde_json::json!(1));

        let again = pools
            .execute_async("orders", "SELECT 1 AS one", false)
            .await
            .unwrap();
        assert!(Arc::ptr_eq(&data, &again));
    }

    #[tokio::test]
    async fn test_execute_async_flattens_errors() {
        let pools = DatabasePools::from_url("sqlite::memory:", CacheOptions::default()).unwrap();

        let message = pools
            .execute_async("orders", "SELECT * FROM missing_table", false)
            .await
            .unwrap_err();
        assert!(message.contains("missing_table"));
        assert!(!message.starts_with("Database error"));
        assert!(pools.cache().is_empty());
    }

    #[tokio::test]
    async fn test_execute_as_decodes_rows() {
        #[derive(serde::Deserialize)]
        struct Pair {
            a: i64,
            b: String,
        }

        let pools = DatabasePools::from_url("sqlite::memory:", CacheOptions::default()).unwrap();
        let rows: Vec<Pair> = pools
            .execute_as("orders", "SELECT 7 AS a, 'x' AS b", false)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].a, 7);
        assert_eq!(rows[0].b, "x");
    }
}
