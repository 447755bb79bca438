//! Configuration system for cadence.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::engine::{ContextTables, DEFAULT_MAXIMUM_INTERVAL_DAYS, DEFAULT_TARGET_RETENTION};
use crate::error::{CadenceError, CadenceResult, ErrorCode};

/// Default cache memory budget (50 MiB).
pub const DEFAULT_MEMORY_BUDGET_BYTES: usize = 50 * 1024 * 1024;

/// Default interval between maintenance passes (5 minutes).
pub const DEFAULT_MAINTENANCE_INTERVAL_SECONDS: u64 = 300;

/// Scheduling engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Recall probability to schedule for when the learner has none.
    pub target_retention: f64,
    /// Upper bound on a single interval in days.
    pub maximum_interval_days: u32,
    /// Memoize engine results in the shared cache.
    pub cache_results: bool,
    /// Situational lookup tables.
    pub tables: ContextTables,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_retention: DEFAULT_TARGET_RETENTION,
            maximum_interval_days: DEFAULT_MAXIMUM_INTERVAL_DAYS,
            cache_results: true,
            tables: ContextTables::default(),
        }
    }
}

/// Memo cache settings. Category TTLs and capacities are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Estimated size above which compaction evicts.
    pub memory_budget_bytes: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            memory_budget_bytes: DEFAULT_MEMORY_BUDGET_BYTES,
        }
    }
}

/// Background maintenance settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceConfig {
    /// Seconds between passes (minimum 1).
    pub interval_seconds: u64,
    /// Run one pass immediately on start.
    pub run_on_start: bool,
    /// Whether the runtime starts the maintenance scheduler at all.
    pub enabled: bool,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            interval_seconds: DEFAULT_MAINTENANCE_INTERVAL_SECONDS,
            run_on_start: false,
            enabled: true,
        }
    }
}

impl MaintenanceConfig {
    /// Config with a custom interval.
    pub fn with_interval(interval_seconds: u64) -> Self {
        Self {
            interval_seconds: interval_seconds.max(1),
            ..Default::default()
        }
    }

    /// Enable a maintenance pass immediately on start.
    pub fn with_run_on_start(mut self) -> Self {
        self.run_on_start = true;
        self
    }

    /// Never start the background scheduler.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CadenceConfig {
    pub engine: EngineConfig,
    pub cache: CacheConfig,
    pub maintenance: MaintenanceConfig,
}

impl CadenceConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    ///
    /// Missing fields take their defaults. The result is validated.
    pub fn from_file(path: impl AsRef<Path>) -> CadenceResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let ext = path.extension().and_then(|e| e.to_str());

        let config: Self = match ext {
            Some("toml") => toml::from_str(&content)?,
            Some("json") => serde_json::from_str(&content)?,
            Some("yaml" | "yml") => serde_yaml::from_str(&content)?,
            _ => {
                return Err(CadenceError::Configuration {
                    message: "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
                    code: ErrorCode::CfgInvalidFormat,
                })
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables.
    ///
    /// Reads:
    /// - `CADENCE_TARGET_RETENTION` (default: 0.9)
    /// - `CADENCE_MAXIMUM_INTERVAL_DAYS` (default: 36500)
    /// - `CADENCE_DISABLE_RESULT_CACHE` (default: unset = cache results)
    /// - `CADENCE_CACHE_MEMORY_BUDGET_BYTES` (default: 52428800)
    /// - `CADENCE_MAINTENANCE_INTERVAL_SECONDS` (default: 300)
    /// - `CADENCE_MAINTENANCE_RUN_ON_START` (default: false)
    /// - `CADENCE_DISABLE_MAINTENANCE` (default: unset = enabled)
    ///
    /// Unparseable values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// [`CadenceConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(target) = lookup("CADENCE_TARGET_RETENTION").and_then(|v| v.parse().ok()) {
            config.engine.target_retention = target;
        }
        if let Some(days) = lookup("CADENCE_MAXIMUM_INTERVAL_DAYS").and_then(|v| v.parse().ok()) {
            config.engine.maximum_interval_days = days;
        }
        if lookup("CADENCE_DISABLE_RESULT_CACHE").is_some() {
            config.engine.cache_results = false;
        }

        if let Some(bytes) = lookup("CADENCE_CACHE_MEMORY_BUDGET_BYTES").and_then(|v| v.parse().ok()) {
            config.cache.memory_budget_bytes = bytes;
        }

        if let Some(secs) = lookup("CADENCE_MAINTENANCE_INTERVAL_SECONDS").and_then(|v| v.parse::<u64>().ok()) {
            config.maintenance.interval_seconds = secs.max(1);
        }
        if lookup("CADENCE_MAINTENANCE_RUN_ON_START").is_some() {
            config.maintenance.run_on_start = true;
        }
        if lookup("CADENCE_DISABLE_MAINTENANCE").is_some() {
            config.maintenance.enabled = false;
        }

        config
    }

    /// Check ranges the engine and scheduler rely on.
    pub fn validate(&self) -> CadenceResult<()> {
        let target = self.engine.target_retention;
        if !target.is_finite() || target <= 0.0 || target >= 1.0 {
            return Err(CadenceError::configuration(format!(
                "engine.target_retention must be within (0, 1), got {}",
                target
            )));
        }
        if self.engine.maximum_interval_days == 0 {
            return Err(CadenceError::configuration(
                "engine.maximum_interval_days must be at least 1",
            ));
        }
        if self.maintenance.interval_seconds == 0 {
            return Err(CadenceError::configuration(
                "maintenance.interval_seconds must be at least 1",
            ));
        }
        Ok(())
    }

    /// Build configuration using builder pattern.
    pub fn builder() -> CadenceConfigBuilder {
        CadenceConfigBuilder::default()
    }
}

/// Builder for CadenceConfig.
#[derive(Default)]
pub struct CadenceConfigBuilder {
    config: CadenceConfig,
}

impl CadenceConfigBuilder {
    pub fn engine(mut self, config: EngineConfig) -> Self {
        self.config.engine = config;
        self
    }

    pub fn cache(mut self, config: CacheConfig) -> Self {
        self.config.cache = config;
        self
    }

    pub fn maintenance(mut self, config: MaintenanceConfig) -> Self {
        self.config.maintenance = config;
        self
    }

    pub fn target_retention(mut self, retention: f64) -> Self {
        self.config.engine.target_retention = retention;
        self
    }

    pub fn maximum_interval_days(mut self, days: u32) -> Self {
        self.config.engine.maximum_interval_days = days;
        self
    }

    pub fn memory_budget_bytes(mut self, bytes: usize) -> Self {
        self.config.cache.memory_budget_bytes = bytes;
        self
    }

    pub fn build(self) -> CadenceConfig {
        self.config
    }
}
