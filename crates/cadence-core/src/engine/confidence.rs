//! How far to trust an update.

use crate::types::{CardMemoryState, ReviewResponse};

const BASE_CONFIDENCE: f64 = 0.7;
/// Plausible human response window in milliseconds (exclusive).
const PLAUSIBLE_RESPONSE_MS: (f64, f64) = (1000.0, 30000.0);

/// Scores an update by history depth, rating consistency, and response-time
/// plausibility.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceEstimator;

impl ConfidenceEstimator {
    pub fn new() -> Self {
        Self
    }

    /// Confidence within [0, 1].
    pub fn compute(&self, card: &CardMemoryState, response: &ReviewResponse) -> f64 {
        let history = &card.performance_history;
        let mut confidence = BASE_CONFIDENCE;

        if history.len() > 10 {
            confidence += 0.2;
        } else if history.len() > 5 {
            confidence += 0.1;
        }

        if history.len() >= 3 {
            let last_three = &history[history.len() - 3..];
            if last_three.iter().all(|r| r.rating == last_three[0].rating) {
                confidence += 0.1;
            }
        }

        let (low, high) = PLAUSIBLE_RESPONSE_MS;
        if response.response_time > low && response.response_time < high {
            confidence += 0.1;
        }

        confidence.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rating;
    use chrono::Utc;

    fn response(millis: f64) -> ReviewResponse {
        ReviewResponse::new(Rating::Good, millis, Utc::now())
    }

    #[test]
    fn test_base_confidence() {
        let est = ConfidenceEstimator::new();
        let card = CardMemoryState::new("c1");
        assert!((est.compute(&card, &response(500.0)) - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_plausible_response_time_bonus() {
        let est = ConfidenceEstimator::new();
        let card = CardMemoryState::new("c1");
        assert!((est.compute(&card, &response(2500.0)) - 0.8).abs() < 1e-12);
        // Bounds are exclusive.
        assert!((est.compute(&card, &response(1000.0)) - 0.7).abs() < 1e-12);
        assert!((est.compute(&card, &response(30000.0)) - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_history_depth_bonus() {
        let est = ConfidenceEstimator::new();
        let now = Utc::now();
        let mixed = [Rating::Good, Rating::Hard];

        let six = CardMemoryState::new("c1").with_history(&[mixed, mixed, mixed].concat(), now);
        assert!((est.compute(&six, &response(500.0)) - 0.8).abs() < 1e-12);

        let eleven = CardMemoryState::new("c1")
            .with_history(&[mixed, mixed, mixed, mixed, mixed].concat(), now)
            .with_history(&[Rating::Easy], now);
        assert!((est.compute(&eleven, &response(500.0)) - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_consistency_bonus() {
        let est = ConfidenceEstimator::new();
        let now = Utc::now();
        let card = CardMemoryState::new("c1").with_history(&[Rating::Hard, Rating::Good, Rating::Good, Rating::Good], now);
        assert!((est.compute(&card, &response(500.0)) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_capped_at_one() {
        let est = ConfidenceEstimator::new();
        let card = CardMemoryState::new("c1").with_history(&[Rating::Good; 12], Utc::now());
        assert_eq!(est.compute(&card, &response(2500.0)), 1.0);
    }
}
