//! DSR scheduling engine.
//!
//! One calculator per output, composed by [`SchedulingEngine`] in a fixed
//! order: difficulty, stability, retrievability, confidence, explanation.
//! The interval optimizer runs separately and is never cached.

pub mod confidence;
pub mod difficulty;
pub mod explanation;
pub mod interval;
pub mod retrievability;
mod scheduler;
pub mod stability;
mod tables;

pub use confidence::ConfidenceEstimator;
pub use difficulty::DifficultyCalculator;
pub use explanation::{ExplanationGenerator, ExplanationInput, FALLBACK_EXPLANATION};
pub use interval::{IntervalOptimizer, DEFAULT_MAXIMUM_INTERVAL_DAYS, DEFAULT_TARGET_RETENTION};
pub use retrievability::RetrievabilityCalculator;
pub use scheduler::{ScheduledReview, SchedulingEngine};
pub use stability::StabilityCalculator;
pub use tables::{ContextTables, DEFAULT_TIME_OF_DAY_DIFFICULTY};
