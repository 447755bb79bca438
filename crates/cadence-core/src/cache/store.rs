//! Category-partitioned memo cache.
//!
//! A two-level map (`category -> key -> entry`) behind a single mutex. Every
//! operation is short and in-memory, so one lock per instance is enough.
//! The periodic sweep and compaction never hold it for a whole pass: they
//! take it once per category, or once per removal batch.
//!
//! The cache never fails. Lock poisoning is recovered, serialization errors
//! while sizing a value degrade to a fixed estimate, and a lookup with the
//! wrong value type is treated as a miss.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use strum::IntoEnumIterator;
use tracing::{debug, warn};

use super::category::CacheCategory;
use super::clock::{Clock, SystemClock};
use super::entry::{estimate_size, CacheEntry};
use super::stats::{CacheStats, CategoryStats};
use crate::config::CacheConfig;

/// Fraction of all entries dropped by one compaction pass.
pub const COMPACTION_FRACTION: f64 = 0.2;

/// Entries removed per lock acquisition during compaction.
const COMPACTION_BATCH: usize = 64;

#[derive(Debug, Default)]
struct CacheState {
    categories: HashMap<CacheCategory, HashMap<String, CacheEntry>>,
    hits: u64,
    misses: u64,
    evictions: u64,
    sequence: u64,
}

impl CacheState {
    fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    /// Evict least-recently-used entries until the category fits its policy.
    ///
    /// Expired entries are dropped first and do not count as evictions, so
    /// only live entries compete for the category's slots.
    fn enforce_size(&mut self, category: CacheCategory, now: DateTime<Utc>) -> usize {
        let max_size = category.policy().max_size;
        let Some(bucket) = self.categories.get_mut(&category) else {
            return 0;
        };
        if bucket.len() > max_size {
            bucket.retain(|_, entry| !entry.is_expired(now));
        }

        let mut evicted = 0;
        while bucket.len() > max_size {
            let victim = bucket
                .iter()
                .min_by_key(|(_, entry)| entry.lru_rank())
                .map(|(key, _)| key.clone());
            match victim {
                Some(key) => {
                    bucket.remove(&key);
                    evicted += 1;
                }
                None => break,
            }
        }

        if evicted > 0 {
            self.evictions += evicted as u64;
            debug!(category = %category, evicted, "Evicted least recently used entries");
        }
        evicted
    }
}

/// Process-wide memoization cache, shared by `Arc`.
///
/// # Example
///
/// ```ignore
/// use cadence_core::cache::{CacheCategory, MemoCache};
///
/// let cache = MemoCache::default();
/// cache.set(CacheCategory::UserProfiles, "profile:u1", vec![0.9_f64]);
/// let hit: Option<Vec<f64>> = cache.get(CacheCategory::UserProfiles, "profile:u1");
/// assert!(hit.is_some());
/// ```
#[derive(Debug)]
pub struct MemoCache {
    state: Mutex<CacheState>,
    clock: Arc<dyn Clock>,
    memory_budget_bytes: usize,
}

impl MemoCache {
    /// Create a cache on wall-clock time.
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a cache with an injected clock.
    pub fn with_clock(config: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            clock,
            memory_budget_bytes: config.memory_budget_bytes,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Byte budget above which [`MemoCache::compact_memory`] evicts.
    pub fn memory_budget_bytes(&self) -> usize {
        self.memory_budget_bytes
    }

    /// Look up a live value.
    ///
    /// Misses when the key is absent, expired (the entry is removed), or
    /// holds a value of another type. Hits bump the entry's access count
    /// and recency.
    pub fn get<T>(&self, category: CacheCategory, key: &str) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let now = self.now();
        let mut guard = self.lock();
        let state = &mut *guard;
        let sequence = state.next_sequence();

        let found = state.categories.get_mut(&category).and_then(|bucket| {
            match bucket.get(key).map(|entry| entry.is_expired(now)) {
                None => None,
                Some(true) => {
                    bucket.remove(key);
                    debug!(category = %category, key, "Cache entry expired");
                    None
                }
                Some(false) => bucket.get_mut(key).and_then(|entry| {
                    let value = (*entry.value).downcast_ref::<T>().cloned();
                    if value.is_some() {
                        entry.touch(now, sequence);
                    } else {
                        warn!(category = %category, key, "Cached value has unexpected type");
                    }
                    value
                }),
            }
        });

        if found.is_some() {
            state.hits += 1;
        } else {
            state.misses += 1;
        }
        found
    }

    /// Store a value, sizing it by its serialized length.
    pub fn set<T>(&self, category: CacheCategory, key: impl Into<String>, value: T)
    where
        T: Serialize + Send + Sync + 'static,
    {
        let size = estimate_size(&value);
        self.set_with_size(category, key, value, size);
    }

    /// Store a value with a caller-supplied size in bytes.
    ///
    /// Overwrites any existing entry, then evicts down to the category's
    /// capacity.
    pub fn set_with_size<T>(&self, category: CacheCategory, key: impl Into<String>, value: T, size: usize)
    where
        T: Send + Sync + 'static,
    {
        let now = self.now();
        let expiry = now + category.policy().ttl();
        let value: Arc<dyn Any + Send + Sync> = Arc::new(value);

        let mut state = self.lock();
        let sequence = state.next_sequence();
        state
            .categories
            .entry(category)
            .or_default()
            .insert(key.into(), CacheEntry::new(value, now, expiry, size, sequence));
        state.enforce_size(category, now);
    }

    /// Return the cached value or compute, store, and return it.
    ///
    /// The computation runs outside the lock; concurrent misses on the same
    /// key may both compute, and the last write wins.
    pub fn get_or_insert_with<T, F>(&self, category: CacheCategory, key: &str, compute: F) -> T
    where
        T: Clone + Serialize + Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        if let Some(value) = self.get::<T>(category, key) {
            return value;
        }
        let value = compute();
        self.set(category, key, value.clone());
        value
    }

    /// Whether a live entry exists. Does not touch bookkeeping or counters.
    pub fn contains(&self, category: CacheCategory, key: &str) -> bool {
        let now = self.now();
        self.lock()
            .categories
            .get(&category)
            .and_then(|bucket| bucket.get(key))
            .is_some_and(|entry| !entry.is_expired(now))
    }

    /// Access count and last access of an entry, for diagnostics.
    pub fn entry_info(&self, category: CacheCategory, key: &str) -> Option<(u64, DateTime<Utc>)> {
        self.lock()
            .categories
            .get(&category)
            .and_then(|bucket| bucket.get(key))
            .map(|entry| (entry.access_count, entry.last_accessed))
    }

    /// Remove one entry. Returns whether it existed.
    pub fn remove(&self, category: CacheCategory, key: &str) -> bool {
        self.lock()
            .categories
            .get_mut(&category)
            .is_some_and(|bucket| bucket.remove(key).is_some())
    }

    /// Entries stored in a category, expired or not.
    pub fn len(&self, category: CacheCategory) -> usize {
        self.lock().categories.get(&category).map_or(0, HashMap::len)
    }

    /// Whether the whole cache is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().categories.values().all(HashMap::is_empty)
    }

    /// Drop expired entries, then evict least-recently-used ones (ties:
    /// fewest accesses) until the category holds at most its `max_size`.
    /// Returns the number evicted; expired entries are not counted.
    pub fn enforce_size(&self, category: CacheCategory) -> usize {
        let now = self.now();
        self.lock().enforce_size(category, now)
    }

    /// Remove expired entries from every category.
    ///
    /// Takes the lock once per category so request traffic can interleave.
    /// Returns the number of entries removed.
    pub fn perform_maintenance(&self) -> usize {
        let mut removed = 0;
        for category in CacheCategory::iter() {
            let now = self.now();
            let mut state = self.lock();
            if let Some(bucket) = state.categories.get_mut(&category) {
                let before = bucket.len();
                bucket.retain(|_, entry| !entry.is_expired(now));
                let swept = before - bucket.len();
                if swept > 0 {
                    debug!(category = %category, swept, "Swept expired entries");
                }
                removed += swept;
            }
        }
        removed
    }

    /// When estimated memory exceeds the budget, evict the coldest 20% of
    /// all entries across categories.
    ///
    /// Entries are ranked by `access_count * idle_ms`; the lowest go first.
    /// Ranking works on a snapshot taken one category at a time and is
    /// sorted outside the lock. Victims are removed in batches, skipping any
    /// entry that was read or rewritten since the snapshot. Returns the
    /// number evicted.
    pub fn compact_memory(&self) -> usize {
        let now = self.now();
        let mut total = 0;
        let mut ranked: Vec<(f64, u64, CacheCategory, String)> = Vec::new();
        for category in CacheCategory::iter() {
            let state = self.lock();
            if let Some(bucket) = state.categories.get(&category) {
                for (key, entry) in bucket {
                    total += entry.size_estimate;
                    ranked.push((entry.compaction_score(now), entry.sequence, category, key.clone()));
                }
            }
        }
        if total <= self.memory_budget_bytes {
            return 0;
        }

        ranked.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        let target = (ranked.len() as f64 * COMPACTION_FRACTION).ceil() as usize;
        ranked.truncate(target);

        let mut evicted = 0;
        for batch in ranked.chunks(COMPACTION_BATCH) {
            let mut state = self.lock();
            let mut removed = 0;
            for (_, sequence, category, key) in batch {
                let Some(bucket) = state.categories.get_mut(category) else {
                    continue;
                };
                if bucket.get(key).is_some_and(|entry| entry.sequence == *sequence) {
                    bucket.remove(key);
                    removed += 1;
                }
            }
            state.evictions += removed as u64;
            evicted += removed;
        }

        warn!(
            total_bytes = total,
            budget_bytes = self.memory_budget_bytes,
            evicted,
            "Cache over memory budget, compacted"
        );
        evicted
    }

    /// Drop one category, or everything when `category` is None.
    ///
    /// Hit, miss, and eviction counters reset only on a full clear.
    pub fn clear(&self, category: Option<CacheCategory>) {
        let mut state = self.lock();
        match category {
            Some(category) => {
                state.categories.remove(&category);
                debug!(category = %category, "Cleared cache category");
            }
            None => {
                *state = CacheState::default();
                debug!("Cleared cache");
            }
        }
    }

    /// Current statistics. Read only.
    pub fn stats(&self) -> CacheStats {
        let state = self.lock();
        let mut stats = CacheStats {
            hits: state.hits,
            misses: state.misses,
            eviction_count: state.evictions,
            ..Default::default()
        };
        (stats.hit_rate, stats.miss_rate) = CacheStats::rates(state.hits, state.misses);

        for category in CacheCategory::iter() {
            let policy = category.policy();
            let (items, memory_usage) = state.categories.get(&category).map_or((0, 0), |bucket| {
                (bucket.len(), bucket.values().map(|e| e.size_estimate).sum())
            });
            stats.total_items += items;
            stats.total_memory_usage += memory_usage;
            stats.per_category.insert(
                category,
                CategoryStats {
                    items,
                    memory_usage,
                    max_size: policy.max_size,
                    ttl_secs: policy.ttl_secs,
                },
            );
        }
        stats
    }
}

impl Default for MemoCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}
