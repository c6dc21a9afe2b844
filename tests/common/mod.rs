//! In-memory backend that counts pool and connection activity.
//!
//! Unless `fail_execute` is set, statements are answered by their text:
//! - `FAIL...` fails with a database error
//! - `DELETE...`, `UPDATE...` and `INSERT...` report one affected row
//! - `EMPTY...` returns no rows
//! - anything else returns one row `{"value": 1, "run": <execution number>}`
//!
//! Database names containing `/` are rejected at pool creation.

#![allow(dead_code)]

use dbpools::db::{ConnectionPool, PoolFactory, PooledConnection};
use dbpools::models::{ColumnMetadata, QueryResult};
use dbpools::{DbError, DbResult};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct Counters {
    pub pools_created: AtomicUsize,
    pub pools_closed: AtomicUsize,
    pub acquired: AtomicUsize,
    pub released: AtomicUsize,
    pub executed: AtomicUsize,
    pub fail_acquire: AtomicBool,
    pub fail_execute: AtomicBool,
}

impl Counters {
    pub fn executed(&self) -> usize {
        self.executed.load(Ordering::SeqCst)
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn pools_created(&self) -> usize {
        self.pools_created.load(Ordering::SeqCst)
    }

    pub fn pools_closed(&self) -> usize {
        self.pools_closed.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default, Clone)]
pub struct MockFactory {
    pub counters: Arc<Counters>,
}

impl MockFactory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug)]
pub struct MockPool {
    pub database: String,
    counters: Arc<Counters>,
    closed: AtomicBool,
}

#[derive(Debug)]
pub struct MockConnection {
    counters: Arc<Counters>,
}

impl PoolFactory for MockFactory {
    type Pool = MockPool;

    fn create_pool(&self, database: &str) -> DbResult<MockPool> {
        if database.contains('/') {
            return Err(DbError::configuration(format!(
                "invalid database name {:?}",
                database
            )));
        }
        self.counters.pools_created.fetch_add(1, Ordering::SeqCst);
        Ok(MockPool {
            database: database.to_string(),
            counters: Arc::clone(&self.counters),
            closed: AtomicBool::new(false),
        })
    }
}

impl ConnectionPool for MockPool {
    type Connection = MockConnection;

    async fn acquire(&self) -> DbResult<MockConnection> {
        if self.counters.fail_acquire.load(Ordering::SeqCst) {
            return Err(DbError::connection(
                "connection refused",
                "Check that the server is running",
            ));
        }
        self.counters.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(MockConnection {
            counters: Arc::clone(&self.counters),
        })
    }

    fn release(&self, _connection: MockConnection) {
        self.counters.released.fetch_add(1, Ordering::SeqCst);
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.counters.pools_closed.fetch_add(1, Ordering::SeqCst);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl PooledConnection for MockConnection {
    async fn execute(&mut self, sql: &str) -> DbResult<QueryResult> {
        let run = self.counters.executed.fetch_add(1, Ordering::SeqCst) + 1;
        // let concurrent callers interleave
        tokio::task::yield_now().await;

        if self.counters.fail_execute.load(Ordering::SeqCst) {
            return Err(DbError::database("server has gone away", None, "Retry later"));
        }

        let verb = sql.split_whitespace().next().unwrap_or_default();
        match verb.to_ascii_uppercase().as_str() {
            "FAIL" => Err(DbError::database(
                format!("syntax error near \"{}\"", verb),
                Some("42601".to_string()),
                "Check the SQL syntax",
            )),
            "DELETE" | "UPDATE" | "INSERT" => Ok(QueryResult::write_result(1, None, 0)),
            "EMPTY" => Ok(QueryResult::empty(0)),
            _ => {
                let row = json!({"value": 1, "run": run});
                Ok(QueryResult::new(
                    vec![
                        ColumnMetadata::new("value", "INTEGER"),
                        ColumnMetadata::new("run", "INTEGER"),
                    ],
                    row.as_object().cloned().into_iter().collect(),
                    0,
                ))
            }
        }
    }
}
