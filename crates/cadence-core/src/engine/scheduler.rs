//! Scheduling engine.
//!
//! Composes the calculators in a fixed order and optionally memoizes the
//! result in the shared cache.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::confidence::ConfidenceEstimator;
use super::difficulty::DifficultyCalculator;
use super::explanation::{ExplanationGenerator, ExplanationInput};
use super::interval::IntervalOptimizer;
use super::retrievability::RetrievabilityCalculator;
use super::stability::StabilityCalculator;
use crate::cache::{keys, CacheCategory, MemoCache};
use crate::config::EngineConfig;
use crate::types::{
    CardMemoryState, DsrUpdateResult, FsrsParameters, LearnerProfile, ReviewResponse,
};

/// A scheduled review: the DSR update, the next interval and the snapshot
/// the caller should persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledReview {
    pub result: DsrUpdateResult,
    pub interval_days: u32,
    pub due_at: DateTime<Utc>,
    /// Card snapshot after applying this review.
    pub card: CardMemoryState,
}

/// Stateless DSR engine.
///
/// Holds no per-card state between calls; share it behind an `Arc`. When
/// built with a cache handle and `cache_results` is on, results are memoized
/// under [`CacheCategory::DsrCalculations`] keyed by the card snapshot, the
/// response and the learner's weights.
///
/// # Example
///
/// ```ignore
/// use cadence_core::engine::SchedulingEngine;
/// use cadence_core::config::EngineConfig;
/// use cadence_core::types::{CardMemoryState, Rating, ReviewResponse};
///
/// let engine = SchedulingEngine::new(EngineConfig::default(), None);
/// let card = CardMemoryState::new("card-1");
/// let response = ReviewResponse::new(Rating::Good, 4000.0, chrono::Utc::now());
/// let scheduled = engine.schedule(&card, &response, None);
/// println!("next review in {} days", scheduled.interval_days);
/// ```
#[derive(Debug, Clone)]
pub struct SchedulingEngine {
    config: EngineConfig,
    difficulty: DifficultyCalculator,
    stability: StabilityCalculator,
    retrievability: RetrievabilityCalculator,
    confidence: ConfidenceEstimator,
    explanation: ExplanationGenerator,
    interval: IntervalOptimizer,
    cache: Option<Arc<MemoCache>>,
}

impl SchedulingEngine {
    pub fn new(config: EngineConfig, cache: Option<Arc<MemoCache>>) -> Self {
        Self {
            difficulty: DifficultyCalculator::new(config.tables.clone()),
            stability: StabilityCalculator::new(),
            retrievability: RetrievabilityCalculator::new(),
            confidence: ConfidenceEstimator::new(),
            explanation: ExplanationGenerator::new(),
            interval: IntervalOptimizer::new(config.maximum_interval_days),
            config,
            cache,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> Option<&Arc<MemoCache>> {
        self.cache.as_ref()
    }

    /// Compute the DSR update for one review.
    ///
    /// Never fails; every output is clamped to its valid range.
    pub fn update_card(
        &self,
        card: &CardMemoryState,
        response: &ReviewResponse,
        profile: Option<&LearnerProfile>,
    ) -> DsrUpdateResult {
        let parameters = profile.map(LearnerProfile::parameters).unwrap_or_default();
        let memo = self
            .cache
            .as_ref()
            .filter(|_| self.config.cache_results)
            .and_then(|cache| keys::dsr(card, response, &parameters).map(|key| (cache, key)));
        let Some((cache, key)) = memo else {
            return self.calculate(card, response, &parameters);
        };

        cache.get_or_insert_with(CacheCategory::DsrCalculations, &key, || {
            self.calculate(card, response, &parameters)
        })
    }

    /// Next interval in days for a card snapshot.
    ///
    /// Uses the profile's target retention when set, otherwise the engine
    /// default.
    pub fn compute_interval(
        &self,
        card: &CardMemoryState,
        profile: Option<&LearnerProfile>,
        now: DateTime<Utc>,
    ) -> u32 {
        let target = profile
            .and_then(|p| p.target_retention)
            .unwrap_or(self.config.target_retention);
        self.interval.compute(card, target, now)
    }

    /// Update the card and project its next review in one call.
    ///
    /// The interval is computed on the updated snapshot.
    pub fn schedule(
        &self,
        card: &CardMemoryState,
        response: &ReviewResponse,
        profile: Option<&LearnerProfile>,
    ) -> ScheduledReview {
        let result = self.update_card(card, response, profile);
        let updated = card.with_review(&result, response);
        let reviewed_at = response.reviewed_at();
        let interval_days = self.compute_interval(&updated, profile, reviewed_at);

        debug!(
            card_id = %card.card_id,
            rating = %response.rating,
            interval_days,
            "Scheduled review"
        );

        ScheduledReview {
            result,
            interval_days,
            due_at: reviewed_at + Duration::days(i64::from(interval_days)),
            card: updated,
        }
    }

    fn calculate(
        &self,
        card: &CardMemoryState,
        response: &ReviewResponse,
        parameters: &FsrsParameters,
    ) -> DsrUpdateResult {
        let difficulty = self.difficulty.compute(card.difficulty, response, card);
        let stability = self.stability.compute(card, response, parameters);
        let retrievability = self.retrievability.compute(card, response);
        let confidence = self.confidence.compute(card, response);
        let explanation = self.explanation.generate(
            &ExplanationInput {
                prior_difficulty: card.difficulty,
                new_difficulty: difficulty,
                prior_stability: card.effective_stability(),
                new_stability: stability,
            },
            response,
        );

        debug!(
            card_id = %card.card_id,
            difficulty,
            stability,
            retrievability,
            confidence,
            "Computed DSR update"
        );

        DsrUpdateResult {
            difficulty,
            stability,
            retrievability,
            confidence,
            explanation,
        }
    }
}

impl Default for SchedulingEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default(), None)
    }
}
