//! Per-database connection pools with a time-bounded query result cache.
//!
//! A [`DatabasePools`] keeps one lazily created pool per database name on a
//! shared server (SQLite, PostgreSQL, MySQL) and serves repeated statements
//! from a cache until their results age out.

pub mod config;
pub mod db;
pub mod error;
pub mod models;

pub use config::{CacheOptions, Config, DatabaseConfig};
pub use db::{DatabasePools, ExecuteResult};
pub use error::{DbError, DbResult};
pub use models::QueryResult;
