//! Time-bounded query result cache.
//!
//! Results are keyed by database name, then by the exact statement text
//! (no normalization: whitespace and casing matter). Entries are never
//! expired in the background; a lookup that finds a stale entry evicts it.
//!
//! Timestamps use [`tokio::time::Instant`] so a paused test clock drives
//! expiry.

use crate::config::CacheOptions;
use crate::models::QueryResult;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// The last successful result of one statement against one database.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub timestamp: Instant,
    pub valid: bool,
    pub data: Arc<QueryResult>,
}

impl CacheEntry {
    fn new(data: Arc<QueryResult>) -> Self {
        Self {
            timestamp: Instant::now(),
            valid: true,
            data,
        }
    }

    /// Fresh iff valid and no older than `life_time`.
    pub fn is_fresh(&self, now: Instant, life_time: Duration) -> bool {
        self.valid && now.saturating_duration_since(self.timestamp) <= life_time
    }
}

type CacheTable = HashMap<String, HashMap<String, CacheEntry>>;

pub struct ResultCache {
    enabled: bool,
    life_time: Duration,
    tables: Mutex<CacheTable>,
}

impl ResultCache {
    pub fn new(options: &CacheOptions) -> Self {
        Self {
            enabled: !options.disable_cache,
            life_time: options.life_time(),
            tables: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn life_time(&self) -> Duration {
        self.life_time
    }

    /// Return the cached result for `(database, sql)` if it is still fresh.
    ///
    /// Always misses when the cache is disabled. A stale or invalidated
    /// entry is removed as a side effect.
    pub fn lookup(&self, database: &str, sql: &str) -> Option<Arc<QueryResult>> {
        if !self.enabled {
            return None;
        }

        let mut tables = self.lock();
        let table = tables.get_mut(database)?;
        let entry = table.get(sql)?;
        if entry.is_fresh(Instant::now(), self.life_time) {
            return Some(Arc::clone(&entry.data));
        }

        table.remove(sql);
        debug!(database = %database, "Evicted stale cache entry");
        None
    }

    /// Cache `data` for `(database, sql)`, replacing any previous entry.
    ///
    /// Only results with rows are cached, and nothing is stored while the
    /// cache is disabled. Returns whether an entry was written.
    pub fn store(&self, database: &str, sql: &str, data: Arc<QueryResult>) -> bool {
        if !self.enabled || !data.has_rows() {
            return false;
        }

        self.lock()
            .entry(database.to_string())
            .or_default()
            .insert(sql.to_string(), CacheEntry::new(data));
        true
    }

    /// Mark an entry invalid; the next lookup misses and evicts it.
    pub fn invalidate(&self, database: &str, sql: &str) -> bool {
        match self.lock().get_mut(database).and_then(|table| table.get_mut(sql)) {
            Some(entry) => {
                entry.valid = false;
                true
            }
            None => false,
        }
    }

    /// Snapshot of the entry for `(database, sql)`, fresh or not.
    pub fn entry(&self, database: &str, sql: &str) -> Option<CacheEntry> {
        self.lock()
            .get(database)
            .and_then(|table| table.get(sql))
            .cloned()
    }

    /// Number of stored entries, including stale ones not yet evicted.
    pub fn len(&self) -> usize {
        self.lock().values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, CacheTable> {
        // Entries stay consistent even if a holder panicked
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("enabled", &self.enabled)
            .field("life_time", &self.life_time)
            .field("entries", &self.len())
            .finish()
    }
}
