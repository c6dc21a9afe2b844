//! Backend seam between the pool manager and concrete connection pools.
//!
//! The manager only needs four things from a driver: create a pool for a
//! database name, acquire a connection, run a statement on it, and give the
//! connection back. [`SqlxPoolFactory`](super::pool::SqlxPoolFactory) is the
//! production implementation; tests plug in counting in-memory backends.

use crate::error::DbResult;
use crate::models::QueryResult;
use std::future::Future;

/// Creates one pool per logical database.
pub trait PoolFactory: Send + Sync + 'static {
    type Pool: ConnectionPool;

    /// Build a pool bound to `database`. Pools connect lazily, so this only
    /// fails when `database` is not a usable name for the backend.
    fn create_pool(&self, database: &str) -> DbResult<Self::Pool>;
}

/// A set of reusable connections to one database.
pub trait ConnectionPool: Send + Sync + 'static {
    type Connection: PooledConnection;

    /// Check out a connection. The caller owns it until [`release`](Self::release).
    fn acquire(&self) -> impl Future<Output = DbResult<Self::Connection>> + Send;

    /// Return a connection to the pool.
    fn release(&self, connection: Self::Connection);

    /// Close the pool, waiting for checked-out connections to come back.
    fn close(&self) -> impl Future<Output = ()> + Send;

    fn is_closed(&self) -> bool;
}

/// A connection checked out of a [`ConnectionPool`].
pub trait PooledConnection: Send + 'static {
    /// Run one statement and collect its rows.
    fn execute(&mut self, sql: &str) -> impl Future<Output = DbResult<QueryResult>> + Send;
}
