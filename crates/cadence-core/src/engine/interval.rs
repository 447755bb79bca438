//! Next review interval.
//!
//! ```text
//! base     = S * ln(1 / (1 - target_retention))
//! interval = round(base * context * cognitive_load * trend), at least 1 day
//! ```

use chrono::{DateTime, Utc};

use crate::types::{hour_key, weekday_key, CardMemoryState, StabilityTrend};

/// Default recall probability to schedule for.
pub const DEFAULT_TARGET_RETENTION: f64 = 0.9;
/// Default cap on a single interval (100 years).
pub const DEFAULT_MAXIMUM_INTERVAL_DAYS: u32 = 36500;

/// Turns stability into a whole-day interval.
///
/// Cheap enough that results are never cached.
#[derive(Debug, Clone, Copy)]
pub struct IntervalOptimizer {
    maximum_interval_days: u32,
}

impl IntervalOptimizer {
    pub fn new(maximum_interval_days: u32) -> Self {
        Self {
            maximum_interval_days: maximum_interval_days.max(1),
        }
    }

    /// Interval in days, within [1, maximum_interval_days].
    ///
    /// `now` selects the hour and weekday buckets of the card's contextual
    /// difficulty map.
    pub fn compute(&self, card: &CardMemoryState, target_retention: f64, now: DateTime<Utc>) -> u32 {
        let target = if target_retention.is_finite() {
            target_retention.clamp(0.01, 0.99)
        } else {
            DEFAULT_TARGET_RETENTION
        };
        let base = card.stability * (1.0 / (1.0 - target)).ln();

        let raw = base
            * contextual_modifier(card, now)
            * cognitive_load_modifier(card.cognitive_load_index)
            * trend_modifier(card.stability_trend);

        if !raw.is_finite() {
            return 1;
        }
        let rounded = raw.round().max(1.0);
        rounded.min(self.maximum_interval_days as f64) as u32
    }
}

impl Default for IntervalOptimizer {
    fn default() -> Self {
        Self::new(DEFAULT_MAXIMUM_INTERVAL_DAYS)
    }
}

/// `max(0.5, 1 - (hour_mod + day_mod) * 0.1)`, missing buckets count as zero.
pub fn contextual_modifier(card: &CardMemoryState, now: DateTime<Utc>) -> f64 {
    let hour = card.contextual_modifier(&hour_key(now));
    let day = card.contextual_modifier(weekday_key(now));
    (1.0 - (hour + day) * 0.1).max(0.5)
}

/// `max(0.7, 1 - cognitive_load_index * 0.3)`.
pub fn cognitive_load_modifier(index: f64) -> f64 {
    (1.0 - index * 0.3).max(0.7)
}

pub fn trend_modifier(trend: StabilityTrend) -> f64 {
    match trend {
        StabilityTrend::Increasing => 1.1,
        StabilityTrend::Decreasing => 0.9,
        StabilityTrend::Stable => 1.0,
    }
}
