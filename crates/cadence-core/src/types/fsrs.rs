//! FSRS weight vector and engine result types.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Number of FSRS-6 weights (w0..w20).
pub const WEIGHT_COUNT: usize = 21;

/// FSRS-6 default weights, widened to f64.
static DEFAULT_WEIGHTS: Lazy<[f64; WEIGHT_COUNT]> = Lazy::new(|| {
    let mut weights = [0.0; WEIGHT_COUNT];
    for (slot, &w) in weights.iter_mut().zip(fsrs::DEFAULT_PARAMETERS.iter()) {
        *slot = w as f64;
    }
    weights
});

/// Per-user FSRS weights.
///
/// Learned elsewhere and treated as immutable input; the engine only reads
/// them. Missing profiles fall back to [`FsrsParameters::default`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FsrsParameters {
    weights: [f64; WEIGHT_COUNT],
}

impl FsrsParameters {
    /// Wrap a full weight vector.
    pub fn new(weights: [f64; WEIGHT_COUNT]) -> Self {
        Self { weights }
    }

    /// Build from a slice; None unless it holds exactly 21 weights.
    pub fn from_slice(weights: &[f64]) -> Option<Self> {
        let weights: [f64; WEIGHT_COUNT] = weights.try_into().ok()?;
        Some(Self { weights })
    }

    /// Weight `w{index}`.
    ///
    /// # Panics
    /// Panics when `index >= 21`.
    pub fn w(&self, index: usize) -> f64 {
        self.weights[index]
    }

    /// All weights in order.
    pub fn weights(&self) -> &[f64; WEIGHT_COUNT] {
        &self.weights
    }
}

impl Default for FsrsParameters {
    fn default() -> Self {
        Self {
            weights: *DEFAULT_WEIGHTS,
        }
    }
}

/// Output of one engine update.
///
/// The persistence layer decides how to store it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DsrUpdateResult {
    pub difficulty: f64,
    pub stability: f64,
    pub retrievability: f64,
    /// Trust in this update, 0..1.
    pub confidence: f64,
    /// Display-only rationale.
    pub explanation: String,
}

/// What the engine needs to know about the learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LearnerProfile {
    pub user_id: String,
    /// Personal FSRS weights, when an optimizer has produced them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fsrs_parameters: Option<FsrsParameters>,
    /// Personal target retention, overriding the engine default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_retention: Option<f64>,
}

impl LearnerProfile {
    /// Profile with default weights and retention.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    /// Builder: set personal weights.
    pub fn with_parameters(mut self, parameters: FsrsParameters) -> Self {
        self.fsrs_parameters = Some(parameters);
        self
    }

    /// Builder: set target retention.
    pub fn with_target_retention(mut self, retention: f64) -> Self {
        self.target_retention = Some(retention);
        self
    }

    /// Personal weights or the built-in defaults.
    pub fn parameters(&self) -> FsrsParameters {
        self.fsrs_parameters.unwrap_or_default()
    }
}
