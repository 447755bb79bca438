//! Hand-tuned context tables.
//!
//! These are configuration data, not derived values. Deployments can supply
//! their own through [`crate::config::EngineConfig`].

use serde::{Deserialize, Serialize};

/// Hours in a day, one bucket each.
pub const HOURS: usize = 24;

/// Additive difficulty modifier per UTC hour: harder late at night and early
/// in the morning, easier around midday and the afternoon.
pub const DEFAULT_TIME_OF_DAY_DIFFICULTY: [f64; HOURS] = [
    0.3, 0.4, 0.5, 0.5, 0.4, 0.3, // 00-05
    0.2, 0.1, 0.0, -0.1, -0.2, -0.2, // 06-11
    -0.1, -0.2, -0.2, -0.1, 0.0, 0.0, // 12-17
    0.1, 0.1, 0.2, 0.2, 0.3, 0.3, // 18-23
];

/// Lookup tables consulted by the calculators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextTables {
    /// Additive difficulty modifier indexed by hour 0..23.
    pub time_of_day_difficulty: [f64; HOURS],
}

impl ContextTables {
    /// Difficulty modifier for an hour; hours past 23 wrap.
    pub fn time_of_day(&self, hour: u32) -> f64 {
        self.time_of_day_difficulty[hour as usize % HOURS]
    }
}

impl Default for ContextTables {
    fn default() -> Self {
        Self {
            time_of_day_difficulty: DEFAULT_TIME_OF_DAY_DIFFICULTY,
        }
    }
}
