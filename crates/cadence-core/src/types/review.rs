//! Review response and situational context types.
//!
//! A [`ReviewResponse`] is built by the caller for a single review event and
//! is never persisted verbatim. Validation happens at the boundary through
//! [`ReviewResponse::validate`]; the engine assumes validated input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::{CadenceError, CadenceResult};

/// Rating given by the learner for one review (numeric value 1-4).
///
/// - Again (1): Failed to recall
/// - Hard (2): Recalled with serious difficulty
/// - Good (3): Recalled after some hesitation
/// - Easy (4): Recalled effortlessly
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Rating {
    Again = 1,
    Hard = 2,
    Good = 3,
    Easy = 4,
}

impl Rating {
    /// Numeric encoding used by the trend and variance calculations.
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Numeric encoding as a float.
    pub fn as_f64(self) -> f64 {
        self.value() as f64
    }

    /// Create from a numeric rating. Returns None outside 1-4.
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Rating::Again),
            2 => Some(Rating::Hard),
            3 => Some(Rating::Good),
            4 => Some(Rating::Easy),
            _ => None,
        }
    }

    /// Parse a rating name (`again`, `hard`, `good`, `easy`), rejecting anything else.
    pub fn parse(raw: &str) -> CadenceResult<Self> {
        raw.trim()
            .parse::<Rating>()
            .map_err(|_| CadenceError::invalid_rating(raw))
    }
}

impl TryFrom<u8> for Rating {
    type Error = CadenceError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rating::from_value(value).ok_or_else(|| CadenceError::invalid_rating(value.to_string()))
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.value()
    }
}

/// Network connectivity during the review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NetworkQuality {
    #[default]
    Good,
    Fair,
    Poor,
    Offline,
}

/// Device the review happened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeviceKind {
    #[default]
    Desktop,
    Tablet,
    Mobile,
}

/// Ambient noise level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AmbientNoise {
    Quiet,
    Moderate,
    Noisy,
}

/// Lighting conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Lighting {
    Dim,
    Optimal,
    Bright,
}

/// Physical environment of a review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EnvironmentalFactors {
    pub network_quality: NetworkQuality,
    pub device: DeviceKind,
    /// Battery charge in 0..1, absent on mains power or when unknown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_level: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ambient_noise: Option<AmbientNoise>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lighting: Option<Lighting>,
}

impl EnvironmentalFactors {
    /// Desktop on a good network in a quiet, well lit room.
    pub fn ideal() -> Self {
        Self {
            network_quality: NetworkQuality::Good,
            device: DeviceKind::Desktop,
            battery_level: None,
            ambient_noise: Some(AmbientNoise::Quiet),
            lighting: Some(Lighting::Optimal),
        }
    }
}

/// Situational signals captured alongside a review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextualFactors {
    /// Session fatigue in 0..1 (0 = fresh).
    pub session_fatigue_index: f64,
    /// Available cognitive capacity in 0..1 (1 = full capacity).
    pub cognitive_load_at_time: f64,
    /// Instant of the review. The engine treats it as "now".
    pub time_of_day: DateTime<Utc>,
    #[serde(default)]
    pub environmental_factors: EnvironmentalFactors,
}

impl ContextualFactors {
    /// Fresh learner at full capacity in an ideal environment.
    pub fn rested(at: DateTime<Utc>) -> Self {
        Self {
            session_fatigue_index: 0.0,
            cognitive_load_at_time: 1.0,
            time_of_day: at,
            environmental_factors: EnvironmentalFactors::ideal(),
        }
    }
}

/// A single review response with its context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewResponse {
    pub rating: Rating,
    /// Response latency in milliseconds.
    pub response_time: f64,
    pub contextual_factors: ContextualFactors,
}

impl ReviewResponse {
    /// Create a response with rested context at the given instant.
    pub fn new(rating: Rating, response_time: f64, at: DateTime<Utc>) -> Self {
        Self {
            rating,
            response_time,
            contextual_factors: ContextualFactors::rested(at),
        }
    }

    /// Set the session fatigue index.
    pub fn with_fatigue(mut self, fatigue: f64) -> Self {
        self.contextual_factors.session_fatigue_index = fatigue;
        self
    }

    /// Set the cognitive capacity at review time.
    pub fn with_cognitive_load(mut self, load: f64) -> Self {
        self.contextual_factors.cognitive_load_at_time = load;
        self
    }

    /// Replace the environmental factors.
    pub fn with_environment(mut self, env: EnvironmentalFactors) -> Self {
        self.contextual_factors.environmental_factors = env;
        self
    }

    /// Instant of the review.
    pub fn reviewed_at(&self) -> DateTime<Utc> {
        self.contextual_factors.time_of_day
    }

    /// Check the input contract the engine relies on.
    ///
    /// Callers run this before handing the response to the engine.
    pub fn validate(&self) -> CadenceResult<()> {
        if !self.response_time.is_finite() {
            return Err(CadenceError::not_finite("response_time"));
        }
        if self.response_time < 0.0 {
            return Err(CadenceError::out_of_range(
                "response_time",
                self.response_time,
                0.0,
                f64::MAX,
            ));
        }

        let ctx = &self.contextual_factors;
        check_unit("session_fatigue_index", ctx.session_fatigue_index)?;
        check_unit("cognitive_load_at_time", ctx.cognitive_load_at_time)?;
        if let Some(battery) = ctx.environmental_factors.battery_level {
            check_unit("battery_level", battery)?;
        }
        Ok(())
    }
}

fn check_unit(field: &str, value: f64) -> CadenceResult<()> {
    if !value.is_finite() {
        return Err(CadenceError::not_finite(field));
    }
    if !(0.0..=1.0).contains(&value) {
        return Err(CadenceError::out_of_range(field, value, 0.0, 1.0));
    }
    Ok(())
}
