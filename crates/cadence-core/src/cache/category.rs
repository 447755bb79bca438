//! Cache categories and their fixed policies.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Partitions of the memo cache.
///
/// Each category has its own TTL and capacity, fixed at compile time.
/// Categories serialize to snake_case.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CacheCategory {
    /// Memoized engine results.
    DsrCalculations,
    /// Candidate card lists for a study session.
    CardSelections,
    /// Learner profile lookups.
    UserProfiles,
    /// Cognitive-state analysis snapshots.
    CognitiveAnalysis,
    /// Derived environment summaries.
    EnvironmentalContext,
    /// Session state snapshots.
    SessionStates,
}

/// Freshness and capacity bounds for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPolicy {
    /// Time to live in seconds.
    pub ttl_secs: i64,
    /// Maximum live entries.
    pub max_size: usize,
}

impl CategoryPolicy {
    pub fn ttl(&self) -> Duration {
        Duration::seconds(self.ttl_secs)
    }
}

impl CacheCategory {
    /// The fixed policy for this category.
    pub fn policy(self) -> CategoryPolicy {
        let (ttl_secs, max_size) = match self {
            CacheCategory::DsrCalculations => (30 * 60, 1000),
            CacheCategory::CardSelections => (5 * 60, 500),
            CacheCategory::UserProfiles => (15 * 60, 100),
            CacheCategory::CognitiveAnalysis => (10 * 60, 200),
            CacheCategory::EnvironmentalContext => (2 * 60, 50),
            CacheCategory::SessionStates => (60 * 60, 100),
        };
        CategoryPolicy { ttl_secs, max_size }
    }

    /// All categories in declaration order.
    pub fn all() -> Vec<CacheCategory> {
        Self::iter().collect()
    }
}
