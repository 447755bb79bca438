//! cadence-core - Contextual spaced-repetition scheduling.
//!
//! Computes, for each flashcard review, an updated difficulty, stability and
//! retrievability adjusted by situational signals (fatigue, cognitive load,
//! time of day, environment, response latency), a confidence score and an
//! explanation, and projects the next review interval. A category-partitioned
//! memo cache makes repeated computations free within their TTL.
//!
//! # Example
//!
//! ```ignore
//! use cadence_core::{CadenceConfig, SchedulingRuntime};
//! use cadence_core::types::{CardMemoryState, Rating, ReviewResponse};
//!
//! let mut runtime = SchedulingRuntime::new(CadenceConfig::default()).await?;
//! runtime.start().await?;
//!
//! let card = CardMemoryState::new("card-42");
//! let response = ReviewResponse::new(Rating::Good, 3500.0, chrono::Utc::now());
//! let scheduled = runtime.engine().schedule(&card, &response, None);
//! println!("due {} ({})", scheduled.due_at, scheduled.result.explanation);
//!
//! runtime.shutdown().await?;
//! ```

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod runtime;
pub mod types;

// Re-export commonly used types
pub use cache::{CacheCategory, CacheStats, MaintenanceScheduler, MemoCache};
pub use config::{CacheConfig, CadenceConfig, EngineConfig, MaintenanceConfig};
pub use engine::{ScheduledReview, SchedulingEngine};
pub use error::{CadenceError, CadenceResult, ErrorCode};
pub use runtime::SchedulingRuntime;
pub use types::{
    CardMemoryState, ContextualFactors, DsrUpdateResult, EnvironmentalFactors, FsrsParameters,
    LearnerProfile, Rating, ReviewResponse,
};
