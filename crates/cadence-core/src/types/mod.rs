//! Core value types for cadence.
//!
//! Card snapshots, review responses with their situational context, FSRS
//! weights, and the engine's result type. All plain data; no behavior that
//! touches shared state.

mod card;
mod fsrs;
mod review;

pub use card::{
    hour_key, weekday_key, CardMemoryState, PerformanceRecord, StabilityTrend, MAX_DIFFICULTY,
    MAX_RETRIEVABILITY, MIN_DIFFICULTY, MIN_RETRIEVABILITY, MIN_STABILITY, RECENT_WINDOW,
};
pub use fsrs::{DsrUpdateResult, FsrsParameters, LearnerProfile, WEIGHT_COUNT};
pub use review::{
    AmbientNoise, ContextualFactors, DeviceKind, EnvironmentalFactors, Lighting, NetworkQuality,
    Rating, ReviewResponse,
};
