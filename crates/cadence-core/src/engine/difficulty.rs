//! Contextual difficulty.
//!
//! Maps the rating to a base difficulty, adds situational modifiers, and
//! blends the result with the prior difficulty:
//!
//! ```text
//! adjusted = clamp(base(rating) + fatigue + load + hour + environment + latency, 1, 10)
//! D' = D * 0.7 + adjusted * 0.3
//! ```

use chrono::Timelike;

use super::tables::ContextTables;
use crate::types::{
    CardMemoryState, DeviceKind, EnvironmentalFactors, NetworkQuality, Rating, ReviewResponse,
    MAX_DIFFICULTY, MIN_DIFFICULTY,
};

/// Weight of the new observation when blending with the prior.
pub const SMOOTHING_ALPHA: f64 = 0.3;

/// Computes the contextually adjusted difficulty for a review.
#[derive(Debug, Clone, Default)]
pub struct DifficultyCalculator {
    tables: ContextTables,
}

impl DifficultyCalculator {
    /// Create a calculator using the given context tables.
    pub fn new(tables: ContextTables) -> Self {
        Self { tables }
    }

    /// Updated difficulty, always within [1, 10].
    pub fn compute(
        &self,
        prior_difficulty: f64,
        response: &ReviewResponse,
        card: &CardMemoryState,
    ) -> f64 {
        let adjusted = self.adjusted_difficulty(response, card);
        let prior = if prior_difficulty.is_finite() {
            prior_difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
        } else {
            adjusted
        };

        let blended = prior * (1.0 - SMOOTHING_ALPHA) + adjusted * SMOOTHING_ALPHA;
        blended.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
    }

    /// Difficulty implied by this review alone, before blending.
    pub fn adjusted_difficulty(&self, response: &ReviewResponse, card: &CardMemoryState) -> f64 {
        let ctx = &response.contextual_factors;

        let adjusted = base_difficulty(response.rating)
            + 0.5 * ctx.session_fatigue_index
            + 0.3 * (1.0 - ctx.cognitive_load_at_time)
            + self.tables.time_of_day(ctx.time_of_day.hour())
            + environmental_modifier(&ctx.environmental_factors)
            + response_time_modifier(response.response_time, card.average_response_time);

        if adjusted.is_finite() {
            adjusted.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
        } else {
            base_difficulty(response.rating)
        }
    }
}

/// Base difficulty implied by a rating.
pub fn base_difficulty(rating: Rating) -> f64 {
    match rating {
        Rating::Again => 8.5,
        Rating::Hard => 6.5,
        Rating::Good => 4.5,
        Rating::Easy => 2.5,
    }
}

/// Additive penalty for a poor review environment.
pub fn environmental_modifier(env: &EnvironmentalFactors) -> f64 {
    let network = match env.network_quality {
        NetworkQuality::Poor => 0.2,
        NetworkQuality::Offline => 0.3,
        NetworkQuality::Good | NetworkQuality::Fair => 0.0,
    };
    let device = match env.device {
        DeviceKind::Mobile => 0.1,
        DeviceKind::Tablet => 0.05,
        DeviceKind::Desktop => 0.0,
    };
    let battery = match env.battery_level {
        Some(level) if level < 0.2 => 0.1,
        _ => 0.0,
    };
    network + device + battery
}

/// Additive modifier comparing latency with the learner's own average.
pub fn response_time_modifier(response_time: f64, average: f64) -> f64 {
    if average.is_nan() || average <= 0.0 || !response_time.is_finite() {
        return 0.0;
    }
    let ratio = response_time / average;
    if ratio > 2.0 {
        0.5
    } else if ratio > 1.5 {
        0.3
    } else if ratio < 0.5 {
        -0.3
    } else if ratio < 0.7 {
        -0.1
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AmbientNoise, Lighting};
    use chrono::{TimeZone, Utc};

    // Hour 8 carries a zero time-of-day modifier in the default table.
    fn neutral_response(rating: Rating) -> ReviewResponse {
        let at = Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap();
        ReviewResponse::new(rating, 2000.0, at)
    }

    #[test]
    fn test_base_difficulty_lookup() {
        assert_eq!(base_difficulty(Rating::Again), 8.5);
        assert_eq!(base_difficulty(Rating::Hard), 6.5);
        assert_eq!(base_difficulty(Rating::Good), 4.5);
        assert_eq!(base_difficulty(Rating::Easy), 2.5);
    }

    #[test]
    fn test_blend_with_prior() {
        let calc = DifficultyCalculator::default();
        let card = CardMemoryState::new("c1");
        let d = calc.compute(5.0, &neutral_response(Rating::Good), &card);
        // 5.0 * 0.7 + 4.5 * 0.3
        assert!((d - 4.85).abs() < 1e-9, "got {}", d);
    }

    #[test]
    fn test_fatigue_and_load_modifiers() {
        let calc = DifficultyCalculator::default();
        let card = CardMemoryState::new("c1");
        let response = neutral_response(Rating::Good)
            .with_fatigue(1.0)
            .with_cognitive_load(0.0);
        let adjusted = calc.adjusted_difficulty(&response, &card);
        assert!((adjusted - (4.5 + 0.5 + 0.3)).abs() < 1e-9);
    }

    #[test]
    fn test_higher_fatigue_never_lowers_difficulty() {
        let calc = DifficultyCalculator::default();
        let card = CardMemoryState::new("c1").with_average_response_time(2000.0);
        for rating in [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy] {
            let mut previous = f64::MIN;
            for step in 0..=10 {
                let fatigue = step as f64 / 10.0;
                let d = calc.compute(6.0, &neutral_response(rating).with_fatigue(fatigue), &card);
                assert!(d >= previous, "difficulty dropped at fatigue {}", fatigue);
                previous = d;
            }
        }
    }

    #[test]
    fn test_environmental_modifier_composes() {
        let env = EnvironmentalFactors {
            network_quality: NetworkQuality::Offline,
            device: DeviceKind::Mobile,
            battery_level: Some(0.1),
            ambient_noise: Some(AmbientNoise::Noisy),
            lighting: Some(Lighting::Dim),
        };
        assert!((environmental_modifier(&env) - 0.5).abs() < 1e-9);

        let env = EnvironmentalFactors {
            network_quality: NetworkQuality::Poor,
            device: DeviceKind::Tablet,
            battery_level: Some(0.5),
            ..Default::default()
        };
        assert!((environmental_modifier(&env) - 0.25).abs() < 1e-9);
        assert_eq!(environmental_modifier(&EnvironmentalFactors::ideal()), 0.0);
    }

    #[test]
    fn test_response_time_modifier_bands() {
        assert_eq!(response_time_modifier(5000.0, 2000.0), 0.5);
        assert_eq!(response_time_modifier(3500.0, 2000.0), 0.3);
        assert_eq!(response_time_modifier(2000.0, 2000.0), 0.0);
        assert_eq!(response_time_modifier(1200.0, 2000.0), -0.1);
        assert_eq!(response_time_modifier(500.0, 2000.0), -0.3);
        // No personal average yet.
        assert_eq!(response_time_modifier(500.0, 0.0), 0.0);
    }

    #[test]
    fn test_time_of_day_uses_table() {
        let calc = DifficultyCalculator::default();
        let card = CardMemoryState::new("c1");
        let night = ReviewResponse::new(Rating::Good, 2000.0, Utc.with_ymd_and_hms(2024, 3, 4, 3, 0, 0).unwrap());
        let noon = ReviewResponse::new(Rating::Good, 2000.0, Utc.with_ymd_and_hms(2024, 3, 4, 13, 0, 0).unwrap());
        assert!(calc.adjusted_difficulty(&night, &card) > calc.adjusted_difficulty(&noon, &card));
    }

    #[test]
    fn test_custom_tables_are_honored() {
        let mut tables = ContextTables::default();
        tables.time_of_day_difficulty[8] = 2.0;
        let calc = DifficultyCalculator::new(tables);
        let adjusted = calc.adjusted_difficulty(&neutral_response(Rating::Good), &CardMemoryState::new("c1"));
        assert!((adjusted - 6.5).abs() < 1e-9);
    }

    #[test]
    fn test_result_clamped() {
        let calc = DifficultyCalculator::default();
        let card = CardMemoryState::new("c1").with_average_response_time(100.0);
        let response = neutral_response(Rating::Again)
            .with_fatigue(1.0)
            .with_cognitive_load(0.0);
        let d = calc.compute(10.0, &response, &card);
        assert!(d <= MAX_DIFFICULTY);

        let d = calc.compute(-50.0, &neutral_response(Rating::Easy), &card);
        assert!(d >= MIN_DIFFICULTY);
    }
}
