//! Category-partitioned memoization cache.
//!
//! Six categories with fixed TTL and capacity policies, lazy expiry on read,
//! LRU eviction on write, and a background maintenance pass that sweeps
//! expired entries and compacts the cache when it outgrows its memory budget.

mod category;
mod clock;
mod entry;
pub mod keys;
mod maintenance;
mod stats;
mod store;

pub use category::{CacheCategory, CategoryPolicy};
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{estimate_size, CacheEntry, FALLBACK_SIZE_ESTIMATE};
pub use maintenance::{run_maintenance, MaintenanceReport, MaintenanceScheduler};
pub use stats::{CacheStats, CategoryStats};
pub use store::{MemoCache, COMPACTION_FRACTION};
