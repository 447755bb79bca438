//! Cache entries.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::any::Any;
use std::io;
use std::sync::Arc;

/// Size assumed when a value cannot be serialized.
pub const FALLBACK_SIZE_ESTIMATE: usize = 1000;

/// One cached value plus its bookkeeping.
///
/// The value is immutable once stored; only the access bookkeeping changes.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub(crate) value: Arc<dyn Any + Send + Sync>,
    pub expiry: DateTime<Utc>,
    pub access_count: u64,
    pub last_accessed: DateTime<Utc>,
    pub size_estimate: usize,
    /// Monotonic recency stamp, breaks ties between equal timestamps.
    pub(crate) sequence: u64,
}

impl CacheEntry {
    pub(crate) fn new(
        value: Arc<dyn Any + Send + Sync>,
        now: DateTime<Utc>,
        expiry: DateTime<Utc>,
        size_estimate: usize,
        sequence: u64,
    ) -> Self {
        Self {
            value,
            expiry,
            access_count: 0,
            last_accessed: now,
            size_estimate,
            sequence,
        }
    }

    /// Expired strictly after the expiry instant.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expiry
    }

    pub(crate) fn touch(&mut self, now: DateTime<Utc>, sequence: u64) {
        self.access_count += 1;
        self.last_accessed = now;
        self.sequence = sequence;
    }

    /// Ordering key for LRU eviction: oldest access, then fewest accesses.
    pub(crate) fn lru_rank(&self) -> (DateTime<Utc>, u64, u64) {
        (self.last_accessed, self.access_count, self.sequence)
    }

    /// Compaction score: `access_count * idle_ms`. Lower goes first.
    pub(crate) fn compaction_score(&self, now: DateTime<Utc>) -> f64 {
        let idle_ms = now.signed_duration_since(self.last_accessed).num_milliseconds().max(0);
        self.access_count as f64 * idle_ms as f64
    }
}

/// Approximate byte size of a value as serialized JSON.
///
/// Falls back to [`FALLBACK_SIZE_ESTIMATE`] when serialization fails.
pub fn estimate_size<T: Serialize + ?Sized>(value: &T) -> usize {
    let mut counter = ByteCounter(0);
    match serde_json::to_writer(&mut counter, value) {
        Ok(()) => counter.0,
        Err(_) => FALLBACK_SIZE_ESTIMATE,
    }
}

struct ByteCounter(usize);

impl io::Write for ByteCounter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0 += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
