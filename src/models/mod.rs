//! Data models shared by the pool manager and its callers.

pub mod connection;
pub mod query;

pub use connection::DatabaseType;
pub use query::{ColumnMetadata, QueryResult};
