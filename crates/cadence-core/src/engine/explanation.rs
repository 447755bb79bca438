//! Human-readable rationale for an update.
//!
//! Display only. Nothing in scheduling reads the explanation.

use crate::types::ReviewResponse;

/// Text returned when no clause applies.
pub const FALLBACK_EXPLANATION: &str = "Standard FSRS calculation applied";

const DIFFICULTY_DELTA_THRESHOLD: f64 = 0.5;
const STABILITY_GAIN_RATIO: f64 = 1.2;
const STABILITY_LOSS_RATIO: f64 = 0.8;
const HIGH_FATIGUE: f64 = 0.7;
const LOW_CAPACITY: f64 = 0.5;

/// Inputs and outputs the explanation compares.
#[derive(Debug, Clone, Copy)]
pub struct ExplanationInput {
    pub prior_difficulty: f64,
    pub new_difficulty: f64,
    pub prior_stability: f64,
    pub new_stability: f64,
}

/// Builds a semicolon-joined explanation from the update's inputs and outputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplanationGenerator;

impl ExplanationGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, input: &ExplanationInput, response: &ReviewResponse) -> String {
        let mut clauses: Vec<&str> = Vec::new();

        let delta = input.new_difficulty - input.prior_difficulty;
        if delta.abs() > DIFFICULTY_DELTA_THRESHOLD {
            clauses.push(if delta > 0.0 {
                "Difficulty increased due to challenging conditions"
            } else {
                "Difficulty decreased due to strong performance"
            });
        }

        if input.prior_stability > 0.0 {
            let ratio = input.new_stability / input.prior_stability;
            if ratio > STABILITY_GAIN_RATIO {
                clauses.push("Stability improved significantly");
            } else if ratio < STABILITY_LOSS_RATIO {
                clauses.push("Stability decreased due to poor performance");
            }
        }

        let ctx = &response.contextual_factors;
        if ctx.session_fatigue_index > HIGH_FATIGUE {
            clauses.push("High fatigue affected calculation");
        }
        if ctx.cognitive_load_at_time < LOW_CAPACITY {
            clauses.push("Low cognitive capacity considered");
        }

        if clauses.is_empty() {
            FALLBACK_EXPLANATION.to_string()
        } else {
            clauses.join("; ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rating;
    use chrono::Utc;

    fn input(pd: f64, nd: f64, ps: f64, ns: f64) -> ExplanationInput {
        ExplanationInput {
            prior_difficulty: pd,
            new_difficulty: nd,
            prior_stability: ps,
            new_stability: ns,
        }
    }

    #[test]
    fn test_fallback_when_nothing_triggers() {
        let generator = ExplanationGenerator::new();
        let response = ReviewResponse::new(Rating::Good, 2000.0, Utc::now());
        assert_eq!(generator.generate(&input(5.0, 5.2, 2.0, 2.1), &response), FALLBACK_EXPLANATION);
    }

    #[test]
    fn test_difficulty_clause_depends_on_sign() {
        let generator = ExplanationGenerator::new();
        let response = ReviewResponse::new(Rating::Good, 2000.0, Utc::now());
        assert_eq!(
            generator.generate(&input(5.0, 6.0, 2.0, 2.0), &response),
            "Difficulty increased due to challenging conditions"
        );
        assert_eq!(
            generator.generate(&input(5.0, 4.0, 2.0, 2.0), &response),
            "Difficulty decreased due to strong performance"
        );
    }

    #[test]
    fn test_clauses_join_in_order() {
        let generator = ExplanationGenerator::new();
        let response = ReviewResponse::new(Rating::Again, 2000.0, Utc::now())
            .with_fatigue(0.9)
            .with_cognitive_load(0.2);
        let text = generator.generate(&input(5.0, 6.0, 4.0, 1.0), &response);
        assert_eq!(
            text,
            "Difficulty increased due to challenging conditions; \
             Stability decreased due to poor performance; \
             High fatigue affected calculation; \
             Low cognitive capacity considered"
        );
    }

    #[test]
    fn test_stability_gain_clause() {
        let generator = ExplanationGenerator::new();
        let response = ReviewResponse::new(Rating::Easy, 2000.0, Utc::now());
        assert_eq!(
            generator.generate(&input(5.0, 5.0, 2.0, 5.0), &response),
            "Stability improved significantly"
        );
    }
}
