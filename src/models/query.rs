//! Query result model.
//!
//! Rows are kept as JSON objects so one result type serves every backend;
//! callers pick their own row shape with [`QueryResult::decode_rows`].

use crate::error::{DbError, DbResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub name: String,
    /// Database-specific type (e.g., "int8", "varchar", "TEXT")
    pub type_name: String,
}

impl ColumnMetadata {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<ColumnMetadata>,
    pub rows: Vec<serde_json::Map<String, JsonValue>>,
    /// Set for statements that modify data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows_affected: Option<u64>,
    /// Id generated by the last insert (MySQL, SQLite).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_insert_id: Option<u64>,
    pub execution_time_ms: u64,
}

impl QueryResult {
    pub fn new(
        columns: Vec<ColumnMetadata>,
        rows: Vec<serde_json::Map<String, JsonValue>>,
        execution_time_ms: u64,
    ) -> Self {
        Self {
            columns,
            rows,
            rows_affected: None,
            last_insert_id: None,
            execution_time_ms,
        }
    }

    /// A result without rows (DDL, writes, or a SELECT that matched nothing).
    pub fn empty(execution_time_ms: u64) -> Self {
        Self::new(Vec::new(), Vec::new(), execution_time_ms)
    }

    /// Result of INSERT/UPDATE/DELETE and other statements without rows.
    pub fn write_result(
        rows_affected: u64,
        last_insert_id: Option<u64>,
        execution_time_ms: u64,
    ) -> Self {
        Self {
            rows_affected: Some(rows_affected),
            last_insert_id,
            ..Self::empty(execution_time_ms)
        }
    }

    /// Get the number of rows in the result.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Only results carrying rows are cached; writes always reach the database.
    pub fn has_rows(&self) -> bool {
        !self.rows.is_empty()
    }

    /// No rows and no write outcome.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.rows_affected.is_none()
    }

    /// Decode every row into `T`.
    pub fn decode_rows<T: DeserializeOwned>(&self) -> DbResult<Vec<T>> {
        self.rows
            .iter()
            .enumerate()
            .map(|(idx, row)| {
                serde_json::from_value(JsonValue::Object(row.clone()))
                    .map_err(|e| DbError::decode(format!("row {}: {}", idx, e)))
            })
            .collect()
    }
}
