//! Memo of select results.
//!
//! Entries are keyed by table and normalized condition. Whether a write to a
//! table drops that table's entries is a configuration choice; with
//! invalidation off a select may return rows that no longer exist.

use std::collections::HashMap;

use tracing::debug;

use crate::condition::Condition;
use crate::error::Result;
use crate::table::Row;

/// Identifies one cached select.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub table: String,
    /// `None` is the "no condition" sentinel. An empty condition is folded
    /// into it since both select every row.
    pub condition: Option<Condition>,
}

impl CacheKey {
    pub fn new(table: impl Into<String>, condition: Option<&Condition>) -> Self {
        Self {
            table: table.into(),
            condition: condition.filter(|c| !c.is_empty()).cloned(),
        }
    }
}

/// Counters for cache lookups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub invalidations: u64,
}

#[derive(Debug)]
pub struct ReadCache {
    entries: HashMap<CacheKey, Vec<Row>>,
    invalidate_on_write: bool,
    stats: CacheStats,
}

impl ReadCache {
    pub fn new(invalidate_on_write: bool) -> Self {
        Self {
            entries: HashMap::new(),
            invalidate_on_write,
            stats: CacheStats::default(),
        }
    }

    /// Returns the cached rows for `key`, or runs `compute`, stores its result
    /// and returns it. A failed computation is not stored.
    pub fn get_or_compute<F>(&mut self, key: CacheKey, compute: F) -> Result<Vec<Row>>
    where
        F: FnOnce() -> Result<Vec<Row>>,
    {
        if let Some(rows) = self.entries.get(&key) {
            self.stats.hits += 1;
            debug!(table = %key.table, "read cache hit");
            return Ok(rows.clone());
        }

        self.stats.misses += 1;
        debug!(table = %key.table, "read cache miss");
        let rows = compute()?;
        self.entries.insert(key, rows.clone());
        Ok(rows)
    }

    /// Called after every successful write to `table`. Drops the table's
    /// entries when invalidation is enabled, otherwise does nothing.
    pub fn table_written(&mut self, table: &str) {
        if !self.invalidate_on_write {
            return;
        }
        let before = self.entries.len();
        self.entries.retain(|key, _| key.table != table);
        let dropped = before - self.entries.len();
        if dropped > 0 {
            self.stats.invalidations += dropped as u64;
            debug!(table, dropped, "read cache invalidated");
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ReadCache {
    fn default() -> Self {
        Self::new(true)
    }
}
