//! Database layer.
//!
//! - `backend`: the pool/connection traits the manager is generic over
//! - `pool`: sqlx pools implementing them for MySQL, PostgreSQL and SQLite
//! - `types`: row to JSON conversion
//! - `registry`: one pool per database name
//! - `cache`: time-bounded result cache
//! - `manager` and `executor`: [`DatabasePools`], tying the above together

pub mod backend;
pub mod cache;
pub mod executor;
pub mod manager;
pub mod pool;
pub mod registry;
pub mod types;

pub use backend::{ConnectionPool, PoolFactory, PooledConnection};
pub use cache::{CacheEntry, ResultCache};
pub use executor::ExecuteResult;
pub use manager::DatabasePools;
pub use pool::{DbConnection, DbPool, DirectConnection, SqlxPoolFactory};
pub use registry::PoolRegistry;
