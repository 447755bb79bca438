//! Error types for cadence operations.
//!
//! The scheduling calculators and the memo cache are total and never fail.
//! Errors only arise at the boundary: validating caller input before it
//! enters the engine, loading configuration, and managing the background
//! maintenance job.

use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for cadence operations.
pub type CadenceResult<T> = Result<T, CadenceError>;

/// Main error type for all cadence operations.
#[derive(Error, Debug)]
pub enum CadenceError {
    /// Input validation failed.
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        code: ErrorCode,
        details: HashMap<String, String>,
        suggestion: Option<String>,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Configuration { message: String, code: ErrorCode },

    /// Background scheduler failed to start, run, or stop.
    #[error("Scheduler error: {message}")]
    Scheduler {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Validation (VAL_xxx)
    ValInvalidInput,
    ValInvalidRating,
    ValOutOfRange,
    ValNotFinite,

    // Configuration (CFG_xxx)
    CfgInvalidFormat,
    CfgParseFailed,

    // Scheduler (SCH_xxx)
    SchStartFailed,
    SchShutdownFailed,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValInvalidInput => "VAL_001",
            ErrorCode::ValInvalidRating => "VAL_002",
            ErrorCode::ValOutOfRange => "VAL_003",
            ErrorCode::ValNotFinite => "VAL_004",
            ErrorCode::CfgInvalidFormat => "CFG_001",
            ErrorCode::CfgParseFailed => "CFG_002",
            ErrorCode::SchStartFailed => "SCH_001",
            ErrorCode::SchShutdownFailed => "SCH_002",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl CadenceError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
            details: HashMap::new(),
            suggestion: None,
        }
    }

    /// Create a validation error for a field outside its documented range.
    pub fn out_of_range(field: &str, value: f64, min: f64, max: f64) -> Self {
        let mut details = HashMap::new();
        details.insert("field".to_string(), field.to_string());
        details.insert("value".to_string(), value.to_string());
        Self::Validation {
            message: format!("{} must be within [{}, {}], got {}", field, min, max, value),
            code: ErrorCode::ValOutOfRange,
            details,
            suggestion: Some(format!("Clamp {} to [{}, {}] before scheduling", field, min, max)),
        }
    }

    /// Create a validation error for a NaN or infinite field.
    pub fn not_finite(field: &str) -> Self {
        let mut details = HashMap::new();
        details.insert("field".to_string(), field.to_string());
        Self::Validation {
            message: format!("{} must be a finite number", field),
            code: ErrorCode::ValNotFinite,
            details,
            suggestion: None,
        }
    }

    /// Create an invalid rating error.
    pub fn invalid_rating(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let mut details = HashMap::new();
        details.insert("rating".to_string(), raw.clone());
        Self::Validation {
            message: format!("Unknown rating '{}'", raw),
            code: ErrorCode::ValInvalidRating,
            details,
            suggestion: Some("Use one of: again, hard, good, easy (or 1-4)".to_string()),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            code: ErrorCode::CfgParseFailed,
        }
    }

    /// Create a scheduler error.
    pub fn scheduler(message: impl Into<String>) -> Self {
        Self::Scheduler {
            message: message.into(),
            code: ErrorCode::SchStartFailed,
            source: None,
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { code, .. } => *code,
            Self::Configuration { code, .. } => *code,
            Self::Scheduler { code, .. } => *code,
            Self::Io(_) => ErrorCode::Internal,
        }
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Validation { suggestion, .. } => suggestion.as_deref(),
            Self::Configuration { .. } => Some("Please check the configuration file and CADENCE_* environment variables"),
            _ => None,
        }
    }
}

impl From<tokio_cron_scheduler::JobSchedulerError> for CadenceError {
    fn from(err: tokio_cron_scheduler::JobSchedulerError) -> Self {
        Self::Scheduler {
            message: err.to_string(),
            code: ErrorCode::SchStartFailed,
            source: Some(Box::new(err)),
        }
    }
}

impl From<toml::de::Error> for CadenceError {
    fn from(err: toml::de::Error) -> Self {
        Self::configuration(err.to_string())
    }
}

impl From<serde_yaml::Error> for CadenceError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::configuration(err.to_string())
    }
}

impl From<serde_json::Error> for CadenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = CadenceError::validation("Invalid input");
        assert_eq!(err.code(), ErrorCode::ValInvalidInput);
        assert!(err.to_string().contains("Invalid input"));
    }

    #[test]
    fn test_out_of_range_error() {
        let err = CadenceError::out_of_range("session_fatigue_index", 1.5, 0.0, 1.0);
        assert_eq!(err.code(), ErrorCode::ValOutOfRange);
        assert!(err.to_string().contains("session_fatigue_index"));
        assert!(err.suggestion().is_some());
    }

    #[test]
    fn test_invalid_rating_error() {
        let err = CadenceError::invalid_rating("perfect");
        assert_eq!(err.code(), ErrorCode::ValInvalidRating);
        assert!(err.to_string().contains("perfect"));
    }

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(ErrorCode::ValInvalidInput.as_str(), "VAL_001");
        assert_eq!(ErrorCode::CfgParseFailed.as_str(), "CFG_002");
        assert_eq!(ErrorCode::Internal.as_str(), "INT_001");
    }

    #[test]
    fn test_io_error_maps_to_internal_code() {
        let err: CadenceError = std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
        assert_eq!(err.code(), ErrorCode::Internal);
    }

    #[test]
    fn test_json_error_is_a_configuration_error() {
        let err: CadenceError = serde_json::from_str::<u32>("{").unwrap_err().into();
        assert_eq!(err.code(), ErrorCode::CfgParseFailed);
        assert!(err.suggestion().is_some());
    }
}
