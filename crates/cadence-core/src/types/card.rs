//! Card memory state snapshots.
//!
//! The persistence layer owns card state. The engine receives a snapshot and
//! hands back a new one through [`CardMemoryState::with_review`]; it never
//! mutates shared state.

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::fsrs::DsrUpdateResult;
use super::review::{Rating, ReviewResponse};
use crate::error::{CadenceError, CadenceResult};

/// Number of history entries the calculators look at.
pub const RECENT_WINDOW: usize = 5;

/// Lower bound for difficulty.
pub const MIN_DIFFICULTY: f64 = 1.0;
/// Upper bound for difficulty.
pub const MAX_DIFFICULTY: f64 = 10.0;
/// Floor for stability after an update.
pub const MIN_STABILITY: f64 = 0.1;
/// Lower bound for retrievability.
pub const MIN_RETRIEVABILITY: f64 = 0.01;
/// Upper bound for retrievability.
pub const MAX_RETRIEVABILITY: f64 = 0.99;

/// Stability moving by less than this fraction counts as stable.
const TREND_BAND: f64 = 0.05;
/// Smoothing for the per-card running signals.
const SIGNAL_ALPHA: f64 = 0.2;

/// One past review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub rating: Rating,
    pub timestamp: DateTime<Utc>,
}

/// Direction stability has been moving in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StabilityTrend {
    Increasing,
    Decreasing,
    #[default]
    Stable,
}

/// Snapshot of a card's memory state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardMemoryState {
    pub card_id: String,
    /// Intrinsic difficulty, 1..10.
    pub difficulty: f64,
    /// Days until recall probability decays to about 1/e.
    pub stability: f64,
    /// Recall probability as of the last computation.
    pub retrievability: f64,
    /// Personal average response time in milliseconds.
    pub average_response_time: f64,
    /// Review history, most recent last.
    pub performance_history: Vec<PerformanceRecord>,
    pub cognitive_load_index: f64,
    pub stability_trend: StabilityTrend,
    /// Modifiers keyed by hour (`"0"`..`"23"`) and weekday name (`"Monday"`).
    pub contextual_difficulty: HashMap<String, f64>,
    pub last_reviewed: Option<DateTime<Utc>>,
}

impl Default for CardMemoryState {
    fn default() -> Self {
        Self {
            card_id: String::new(),
            difficulty: 5.0,
            stability: 1.0,
            retrievability: 0.5,
            average_response_time: 0.0,
            performance_history: Vec::new(),
            cognitive_load_index: 0.0,
            stability_trend: StabilityTrend::Stable,
            contextual_difficulty: HashMap::new(),
            last_reviewed: None,
        }
    }
}

impl CardMemoryState {
    /// Create a never-reviewed card with default memory state.
    pub fn new(card_id: impl Into<String>) -> Self {
        Self {
            card_id: card_id.into(),
            ..Default::default()
        }
    }

    /// Builder: set difficulty.
    pub fn with_difficulty(mut self, difficulty: f64) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Builder: set stability.
    pub fn with_stability(mut self, stability: f64) -> Self {
        self.stability = stability;
        self
    }

    /// Builder: set the last review instant.
    pub fn with_last_reviewed(mut self, at: DateTime<Utc>) -> Self {
        self.last_reviewed = Some(at);
        self
    }

    /// Builder: set the personal average response time.
    pub fn with_average_response_time(mut self, millis: f64) -> Self {
        self.average_response_time = millis;
        self
    }

    /// Builder: append history records.
    pub fn with_history(mut self, ratings: &[Rating], at: DateTime<Utc>) -> Self {
        self.performance_history
            .extend(ratings.iter().map(|&rating| PerformanceRecord { rating, timestamp: at }));
        self
    }

    /// The last (up to) five ratings, oldest first.
    pub fn recent_ratings(&self) -> &[PerformanceRecord] {
        let len = self.performance_history.len();
        &self.performance_history[len.saturating_sub(RECENT_WINDOW)..]
    }

    /// Whole days since the last review, zero when never reviewed or when
    /// `now` precedes the last review.
    pub fn days_since_last_review(&self, now: DateTime<Utc>) -> i64 {
        match self.last_reviewed {
            Some(last) => now.signed_duration_since(last).num_days().max(0),
            None => 0,
        }
    }

    /// Stability safe to divide by: zero, negative or NaN become 1.
    pub fn effective_stability(&self) -> f64 {
        if self.stability.is_finite() && self.stability > 0.0 {
            self.stability
        } else {
            1.0
        }
    }

    /// Contextual modifier for a bucket key, zero when absent.
    pub fn contextual_modifier(&self, key: &str) -> f64 {
        self.contextual_difficulty.get(key).copied().unwrap_or(0.0)
    }

    /// Check that a persisted snapshot is usable by the engine.
    pub fn validate(&self) -> CadenceResult<()> {
        for (field, value) in [
            ("difficulty", self.difficulty),
            ("stability", self.stability),
            ("retrievability", self.retrievability),
            ("average_response_time", self.average_response_time),
            ("cognitive_load_index", self.cognitive_load_index),
        ] {
            if !value.is_finite() {
                return Err(CadenceError::not_finite(field));
            }
        }
        if self.card_id.is_empty() {
            return Err(CadenceError::validation("card_id must not be empty"));
        }
        Ok(())
    }

    /// Next snapshot after a review.
    ///
    /// Applies the computed DSR values, appends the rating to the history,
    /// folds the response time into the running average, and nudges the
    /// cognitive load index and the hour/weekday difficulty buckets.
    pub fn with_review(&self, result: &DsrUpdateResult, response: &ReviewResponse) -> Self {
        let at = response.reviewed_at();
        let mut next = self.clone();

        next.difficulty = result.difficulty;
        next.stability = result.stability;
        next.retrievability = result.retrievability;
        next.stability_trend = trend_between(self.stability, result.stability);

        let n = self.performance_history.len() as f64;
        next.average_response_time = if n == 0.0 || self.average_response_time <= 0.0 {
            response.response_time
        } else {
            (self.average_response_time * n + response.response_time) / (n + 1.0)
        };

        let load = 1.0 - response.contextual_factors.cognitive_load_at_time;
        next.cognitive_load_index =
            self.cognitive_load_index * (1.0 - SIGNAL_ALPHA) + load * SIGNAL_ALPHA;

        let signal = context_signal(response.rating);
        for key in [hour_key(at), weekday_key(at).to_string()] {
            let prior = self.contextual_modifier(&key);
            next.contextual_difficulty
                .insert(key, prior * (1.0 - SIGNAL_ALPHA) + signal * SIGNAL_ALPHA);
        }

        next.performance_history.push(PerformanceRecord {
            rating: response.rating,
            timestamp: at,
        });
        next.last_reviewed = Some(at);
        next
    }
}

/// Bucket key for the hour of an instant (`"0"`..`"23"`).
pub fn hour_key(at: DateTime<Utc>) -> String {
    at.hour().to_string()
}

/// Bucket key for the weekday of an instant (`"Monday"`..`"Sunday"`).
pub fn weekday_key(at: DateTime<Utc>) -> &'static str {
    match at.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn trend_between(prior: f64, next: f64) -> StabilityTrend {
    if prior <= 0.0 || !prior.is_finite() {
        return StabilityTrend::Stable;
    }
    let ratio = next / prior;
    if ratio > 1.0 + TREND_BAND {
        StabilityTrend::Increasing
    } else if ratio < 1.0 - TREND_BAND {
        StabilityTrend::Decreasing
    } else {
        StabilityTrend::Stable
    }
}

// Positive means the context made the card harder.
fn context_signal(rating: Rating) -> f64 {
    match rating {
        Rating::Again => 1.5,
        Rating::Hard => 0.5,
        Rating::Good => -0.5,
        Rating::Easy => -1.5,
    }
}
