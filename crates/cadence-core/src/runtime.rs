//! Runtime for the scheduling engine and its cache.
//!
//! Owns the shared cache, the engine, and the maintenance scheduler, with
//! unified startup and graceful shutdown.

use std::sync::Arc;

use tracing::{debug, info};

use crate::cache::{run_maintenance, CacheStats, MaintenanceScheduler, MemoCache};
use crate::config::CadenceConfig;
use crate::engine::SchedulingEngine;
use crate::error::{CadenceError, CadenceResult, ErrorCode};

/// Composition root for a scheduling process.
///
/// # Example
///
/// ```ignore
/// use cadence_core::{CadenceConfig, SchedulingRuntime};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut runtime = SchedulingRuntime::new(CadenceConfig::from_env()).await?;
///     runtime.start().await?;
///
///     let engine = runtime.engine();
///     // ... schedule reviews ...
///
///     runtime.shutdown().await?;
///     Ok(())
/// }
/// ```
pub struct SchedulingRuntime {
    cache: Arc<MemoCache>,
    engine: Arc<SchedulingEngine>,
    /// Present unless maintenance is disabled.
    maintenance: Option<MaintenanceScheduler>,
    config: CadenceConfig,
    started: bool,
}

impl SchedulingRuntime {
    /// Build the cache, engine and scheduler. Nothing runs until `start()`.
    pub async fn new(config: CadenceConfig) -> CadenceResult<Self> {
        config.validate()?;
        debug!(
            maintenance_enabled = config.maintenance.enabled,
            maintenance_interval = config.maintenance.interval_seconds,
            memory_budget = config.cache.memory_budget_bytes,
            "Creating SchedulingRuntime"
        );

        let cache = Arc::new(MemoCache::new(&config.cache));
        let engine = Arc::new(SchedulingEngine::new(config.engine.clone(), Some(cache.clone())));

        let maintenance = if config.maintenance.enabled {
            let scheduler = MaintenanceScheduler::new(cache.clone(), config.maintenance)
                .await
                .map_err(|e| CadenceError::scheduler(format!("Failed to create maintenance scheduler: {}", e)))?;
            Some(scheduler)
        } else {
            None
        };

        Ok(Self {
            cache,
            engine,
            maintenance,
            config,
            started: false,
        })
    }

    /// Start background maintenance.
    pub async fn start(&mut self) -> CadenceResult<()> {
        if self.started {
            debug!("SchedulingRuntime already started");
            return Ok(());
        }
        if let Some(ref scheduler) = self.maintenance {
            scheduler.start().await.map_err(|e| {
                CadenceError::scheduler(format!("Failed to start maintenance scheduler: {}", e))
            })?;
        }
        self.started = true;
        info!("Scheduling runtime started");
        Ok(())
    }

    /// Stop maintenance, run a final sweep, and log the cache statistics.
    pub async fn shutdown(&mut self) -> CadenceResult<CacheStats> {
        debug!("Shutting down scheduling runtime");

        if self.started {
            if let Some(ref mut scheduler) = self.maintenance {
                scheduler.shutdown().await.map_err(|e| CadenceError::Scheduler {
                    message: format!("Failed to shutdown maintenance scheduler: {}", e),
                    code: ErrorCode::SchShutdownFailed,
                    source: Some(Box::new(e)),
                })?;
                debug!("Maintenance scheduler stopped");
            }
            self.started = false;
        }

        run_maintenance(&self.cache);
        let stats = self.cache.stats();
        info!(
            items = stats.total_items,
            hits = stats.hits,
            misses = stats.misses,
            hit_rate = stats.hit_rate,
            evictions = stats.eviction_count,
            "Scheduling runtime stopped"
        );
        Ok(stats)
    }

    pub fn engine(&self) -> Arc<SchedulingEngine> {
        self.engine.clone()
    }

    pub fn cache(&self) -> Arc<MemoCache> {
        self.cache.clone()
    }

    pub fn maintenance_scheduler(&self) -> Option<&MaintenanceScheduler> {
        self.maintenance.as_ref()
    }

    pub fn config(&self) -> &CadenceConfig {
        &self.config
    }

    pub fn is_started(&self) -> bool {
        self.started
    }
}
