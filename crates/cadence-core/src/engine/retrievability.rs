//! Current recall probability.

use super::stability::retention;
use crate::types::{
    CardMemoryState, ReviewResponse, MAX_RETRIEVABILITY, MIN_RETRIEVABILITY,
};

/// Fewest history samples needed before a trend is fitted.
const MIN_TREND_SAMPLES: usize = 3;

/// Computes retrievability at review time, adjusted for cognitive state and
/// the short-term performance trend.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetrievabilityCalculator;

impl RetrievabilityCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Retrievability within [0.01, 0.99].
    pub fn compute(&self, card: &CardMemoryState, response: &ReviewResponse) -> f64 {
        let ctx = &response.contextual_factors;
        let base = retention(card, response.reviewed_at());

        let r = base
            * (1.0 - (1.0 - ctx.cognitive_load_at_time) * 0.1)
            * (1.0 - ctx.session_fatigue_index * 0.05)
            * (1.0 + performance_trend(card) * 0.1);

        if r.is_finite() {
            r.clamp(MIN_RETRIEVABILITY, MAX_RETRIEVABILITY)
        } else {
            MIN_RETRIEVABILITY
        }
    }
}

/// Least-squares slope of the recent numeric ratings against their position.
///
/// Zero with fewer than three samples or when the fit is degenerate.
pub fn performance_trend(card: &CardMemoryState) -> f64 {
    let ratings: Vec<f64> = card.recent_ratings().iter().map(|r| r.rating.as_f64()).collect();
    linear_slope(&ratings)
}

fn linear_slope(ys: &[f64]) -> f64 {
    if ys.len() < MIN_TREND_SAMPLES {
        return 0.0;
    }
    let n = ys.len() as f64;
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = ys.iter().sum::<f64>() / n;

    let (mut num, mut den) = (0.0, 0.0);
    for (i, y) in ys.iter().enumerate() {
        let dx = i as f64 - mean_x;
        num += dx * (y - mean_y);
        den += dx * dx;
    }

    let slope = num / den;
    if slope.is_finite() { slope } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rating;
    use chrono::{Duration, Utc};

    #[test]
    fn test_slope_requires_three_samples() {
        assert_eq!(linear_slope(&[]), 0.0);
        assert_eq!(linear_slope(&[1.0, 4.0]), 0.0);
    }

    #[test]
    fn test_slope_of_straight_lines() {
        assert!((linear_slope(&[1.0, 2.0, 3.0, 4.0]) - 1.0).abs() < 1e-12);
        assert!((linear_slope(&[4.0, 3.0, 2.0]) + 1.0).abs() < 1e-12);
        assert_eq!(linear_slope(&[3.0, 3.0, 3.0, 3.0, 3.0]), 0.0);
    }

    #[test]
    fn test_slope_non_finite_input_falls_back_to_zero() {
        assert_eq!(linear_slope(&[1.0, f64::NAN, 3.0]), 0.0);
    }

    #[test]
    fn test_trend_reads_only_recent_window() {
        let now = Utc::now();
        // Long decline followed by five improving reviews.
        let card = CardMemoryState::new("c1")
            .with_history(&[Rating::Easy, Rating::Easy, Rating::Again], now)
            .with_history(&[Rating::Again, Rating::Hard, Rating::Hard, Rating::Good, Rating::Easy], now);
        assert!(performance_trend(&card) > 0.0);
    }

    #[test]
    fn test_never_reviewed_clamps_to_upper_bound() {
        let calc = RetrievabilityCalculator::new();
        let card = CardMemoryState::new("c1");
        let r = calc.compute(&card, &ReviewResponse::new(Rating::Good, 2000.0, Utc::now()));
        assert_eq!(r, MAX_RETRIEVABILITY);
    }

    #[test]
    fn test_long_gap_clamps_to_lower_bound() {
        let now = Utc::now();
        let calc = RetrievabilityCalculator::new();
        let card = CardMemoryState::new("c1")
            .with_stability(0.5)
            .with_last_reviewed(now - Duration::days(400));
        let r = calc.compute(&card, &ReviewResponse::new(Rating::Again, 2000.0, now));
        assert_eq!(r, MIN_RETRIEVABILITY);
    }

    #[test]
    fn test_cognitive_state_lowers_retrievability() {
        let now = Utc::now();
        let calc = RetrievabilityCalculator::new();
        let card = CardMemoryState::new("c1")
            .with_stability(10.0)
            .with_last_reviewed(now - Duration::days(5));
        let rested = calc.compute(&card, &ReviewResponse::new(Rating::Good, 2000.0, now));
        let tired = calc.compute(
            &card,
            &ReviewResponse::new(Rating::Good, 2000.0, now)
                .with_fatigue(1.0)
                .with_cognitive_load(0.0),
        );
        let expected = (-0.5f64).exp() * 0.9 * 0.95;
        assert!((tired - expected).abs() < 1e-12);
        assert!(tired < rested);
    }
}
