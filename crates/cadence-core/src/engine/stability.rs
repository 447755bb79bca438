//! Memory stability.
//!
//! FSRS-style stability update branching on the rating, followed by
//! multiplicative situational modifiers:
//!
//! ```text
//! R  = exp(-days / max(S, eps))
//! again: S * w11
//! hard:  S * (1 + e^w5  * (w6 - R) * w7)
//! good:  S * (1 + e^w8  * (11 - D) * w9^(-R) * (e^((1 - R) * w10) - 1))
//! easy:  S * (1 + e^w15 * (w16 - R) * w17)
//! S' = max(0.1, base * fatigue * environment * consistency)
//! ```

use chrono::{DateTime, Utc};

use crate::types::{
    AmbientNoise, CardMemoryState, EnvironmentalFactors, FsrsParameters, Lighting, Rating,
    ReviewResponse, MIN_STABILITY,
};

/// Floor on the stability divisor in the forgetting curve.
pub const STABILITY_EPSILON: f64 = 0.1;

/// Computes updated memory stability.
#[derive(Debug, Clone, Copy, Default)]
pub struct StabilityCalculator;

impl StabilityCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Updated stability, never below 0.1.
    pub fn compute(
        &self,
        card: &CardMemoryState,
        response: &ReviewResponse,
        parameters: &FsrsParameters,
    ) -> f64 {
        let prior = card.effective_stability();
        let retention = retention(card, response.reviewed_at());
        let base = base_stability(prior, card.difficulty, retention, response.rating, parameters);

        let ctx = &response.contextual_factors;
        let stability = base
            * fatigue_modifier(ctx.session_fatigue_index)
            * environmental_modifier(&ctx.environmental_factors)
            * consistency_modifier(card);

        if stability.is_finite() {
            stability.max(MIN_STABILITY)
        } else {
            MIN_STABILITY
        }
    }
}

/// Exponential forgetting curve value for the card at `now`.
///
/// Degenerate stability (zero, negative, NaN) is treated as one day.
pub fn retention(card: &CardMemoryState, now: DateTime<Utc>) -> f64 {
    let days = card.days_since_last_review(now) as f64;
    (-days / card.effective_stability().max(STABILITY_EPSILON)).exp()
}

/// FSRS stability update before situational modifiers.
pub fn base_stability(
    prior: f64,
    difficulty: f64,
    retention: f64,
    rating: Rating,
    w: &FsrsParameters,
) -> f64 {
    match rating {
        Rating::Again => prior * w.w(11),
        Rating::Hard => prior * (1.0 + w.w(5).exp() * (w.w(6) - retention) * w.w(7)),
        Rating::Good => {
            prior
                * (1.0
                    + w.w(8).exp()
                        * (11.0 - difficulty)
                        * w.w(9).powf(-retention)
                        * (((1.0 - retention) * w.w(10)).exp() - 1.0))
        }
        Rating::Easy => prior * (1.0 + w.w(15).exp() * (w.w(16) - retention) * w.w(17)),
    }
}

/// Tired learners consolidate less.
pub fn fatigue_modifier(fatigue: f64) -> f64 {
    1.0 - 0.15 * fatigue
}

/// Noise and lighting effects, composed multiplicatively.
pub fn environmental_modifier(env: &EnvironmentalFactors) -> f64 {
    let noise = match env.ambient_noise {
        Some(AmbientNoise::Quiet) => 1.05,
        Some(AmbientNoise::Noisy) => 0.95,
        Some(AmbientNoise::Moderate) | None => 1.0,
    };
    let lighting = match env.lighting {
        Some(Lighting::Optimal) => 1.02,
        Some(Lighting::Dim) | Some(Lighting::Bright) => 0.98,
        None => 1.0,
    };
    noise * lighting
}

/// Penalty for erratic recent ratings: `max(0.95, 1 - 0.05 * variance)`.
///
/// Returns 1.0 with fewer than two recent ratings.
pub fn consistency_modifier(card: &CardMemoryState) -> f64 {
    let ratings: Vec<f64> = card.recent_ratings().iter().map(|r| r.rating.as_f64()).collect();
    if ratings.len() < 2 {
        return 1.0;
    }
    let n = ratings.len() as f64;
    let mean = ratings.iter().sum::<f64>() / n;
    let variance = ratings.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    (1.0 - 0.05 * variance).clamp(0.95, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DeviceKind, NetworkQuality};
    use chrono::Duration;

    fn review(rating: Rating, now: DateTime<Utc>) -> ReviewResponse {
        // Neutral environment so only the branch under test matters.
        ReviewResponse::new(rating, 2000.0, now).with_environment(EnvironmentalFactors::default())
    }

    #[test]
    fn test_retention_never_reviewed_is_one() {
        let card = CardMemoryState::new("c1");
        assert_eq!(retention(&card, Utc::now()), 1.0);
    }

    #[test]
    fn test_retention_decays_with_days() {
        let now = Utc::now();
        let card = CardMemoryState::new("c1")
            .with_stability(5.0)
            .with_last_reviewed(now - Duration::days(5));
        assert!((retention(&card, now) - (-1.0f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_retention_with_zero_stability_uses_one_day() {
        let now = Utc::now();
        let card = CardMemoryState::new("c1")
            .with_stability(0.0)
            .with_last_reviewed(now - Duration::days(2));
        assert!((retention(&card, now) - (-2.0f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_good_with_full_retention_keeps_prior() {
        // e^0 - 1 = 0, so the good branch is a no-op at R = 1.
        let w = FsrsParameters::default();
        let s = base_stability(3.0, 5.0, 1.0, Rating::Good, &w);
        assert!((s - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_good_grows_after_forgetting() {
        let w = FsrsParameters::default();
        assert!(base_stability(3.0, 5.0, 0.5, Rating::Good, &w) > 3.0);
    }

    #[test]
    fn test_branches_follow_formulas() {
        let w = FsrsParameters::new([1.0; 21]);
        let e = 1f64.exp();
        assert!((base_stability(2.0, 5.0, 0.5, Rating::Again, &w) - 2.0).abs() < 1e-12);
        assert!((base_stability(2.0, 5.0, 0.5, Rating::Hard, &w) - 2.0 * (1.0 + e * 0.5)).abs() < 1e-12);
        assert!((base_stability(2.0, 5.0, 0.5, Rating::Easy, &w) - 2.0 * (1.0 + e * 0.5)).abs() < 1e-12);
        let good = 2.0 * (1.0 + e * 6.0 * 1.0 * ((0.5f64).exp() - 1.0));
        assert!((base_stability(2.0, 5.0, 0.5, Rating::Good, &w) - good).abs() < 1e-9);
    }

    #[test]
    fn test_again_never_exceeds_easy() {
        let calc = StabilityCalculator::new();
        let params = FsrsParameters::default();
        let now = Utc::now();
        for days in [0, 1, 3, 10, 60] {
            for prior in [0.5, 1.0, 4.0, 30.0] {
                let card = CardMemoryState::new("c1")
                    .with_stability(prior)
                    .with_last_reviewed(now - Duration::days(days));
                let again = calc.compute(&card, &review(Rating::Again, now), &params);
                let easy = calc.compute(&card, &review(Rating::Easy, now), &params);
                assert!(again <= easy, "again {} > easy {} (prior {}, days {})", again, easy, prior, days);
            }
        }
    }

    #[test]
    fn test_fatigue_modifier() {
        assert_eq!(fatigue_modifier(0.0), 1.0);
        assert!((fatigue_modifier(1.0) - 0.85).abs() < 1e-12);
    }

    #[test]
    fn test_environmental_modifier_composes() {
        assert!((environmental_modifier(&EnvironmentalFactors::ideal()) - 1.05 * 1.02).abs() < 1e-12);
        let noisy_dim = EnvironmentalFactors {
            network_quality: NetworkQuality::Good,
            device: DeviceKind::Desktop,
            battery_level: None,
            ambient_noise: Some(AmbientNoise::Noisy),
            lighting: Some(Lighting::Dim),
        };
        assert!((environmental_modifier(&noisy_dim) - 0.95 * 0.98).abs() < 1e-12);
        assert_eq!(environmental_modifier(&EnvironmentalFactors::default()), 1.0);
    }

    #[test]
    fn test_consistency_modifier() {
        let now = Utc::now();
        let steady = CardMemoryState::new("c1").with_history(&[Rating::Good; 5], now);
        assert_eq!(consistency_modifier(&steady), 1.0);

        let erratic = CardMemoryState::new("c1")
            .with_history(&[Rating::Again, Rating::Easy, Rating::Again, Rating::Easy], now);
        assert!((consistency_modifier(&erratic) - 0.95).abs() < 1e-12);

        let single = CardMemoryState::new("c1").with_history(&[Rating::Again], now);
        assert_eq!(consistency_modifier(&single), 1.0);
    }

    #[test]
    fn test_result_floor() {
        let calc = StabilityCalculator::new();
        let params = FsrsParameters::new([0.0; 21]);
        let card = CardMemoryState::new("c1").with_stability(0.2);
        let s = calc.compute(&card, &review(Rating::Again, Utc::now()), &params);
        assert_eq!(s, MIN_STABILITY);
    }
}
