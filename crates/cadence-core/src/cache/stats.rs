//! Read-only cache statistics.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::category::CacheCategory;

/// Per-category occupancy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub items: usize,
    pub memory_usage: usize,
    pub max_size: usize,
    pub ttl_secs: i64,
}

/// Snapshot of cache health.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_items: usize,
    /// Sum of entry size estimates in bytes.
    pub total_memory_usage: usize,
    pub hits: u64,
    pub misses: u64,
    /// Hits over lookups, 0 before the first lookup.
    pub hit_rate: f64,
    /// Misses over lookups, 0 before the first lookup.
    pub miss_rate: f64,
    pub eviction_count: u64,
    pub per_category: BTreeMap<CacheCategory, CategoryStats>,
}

impl CacheStats {
    pub(crate) fn rates(hits: u64, misses: u64) -> (f64, f64) {
        let total = hits + misses;
        if total == 0 {
            (0.0, 0.0)
        } else {
            (hits as f64 / total as f64, misses as f64 / total as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates_without_lookups() {
        assert_eq!(CacheStats::rates(0, 0), (0.0, 0.0));
    }

    #[test]
    fn test_rates_sum_to_one() {
        let (hit, miss) = CacheStats::rates(3, 1);
        assert!((hit - 0.75).abs() < 1e-12);
        assert!((miss - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_stats_serialize_category_keys() {
        let mut stats = CacheStats::default();
        stats
            .per_category
            .insert(CacheCategory::DsrCalculations, CategoryStats::default());
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"dsr_calculations\""));
    }
}
