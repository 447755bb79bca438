//! Periodic cache maintenance.
//!
//! Uses tokio-cron-scheduler to sweep expired entries and compact the cache
//! at a fixed interval, off the request path.

use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use tracing::{debug, info};

use super::store::MemoCache;
use crate::config::MaintenanceConfig;

/// Outcome of one maintenance pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaintenanceReport {
    /// Expired entries swept.
    pub expired: usize,
    /// Entries evicted by memory compaction.
    pub compacted: usize,
    /// Entries left afterwards.
    pub remaining: usize,
}

/// Run one sweep and compaction pass against a cache.
pub fn run_maintenance(cache: &MemoCache) -> MaintenanceReport {
    let expired = cache.perform_maintenance();
    let compacted = cache.compact_memory();
    let stats = cache.stats();

    info!(
        expired,
        compacted,
        remaining = stats.total_items,
        memory_bytes = stats.total_memory_usage,
        hit_rate = stats.hit_rate,
        evictions = stats.eviction_count,
        "Cache maintenance complete"
    );

    MaintenanceReport {
        expired,
        compacted,
        remaining: stats.total_items,
    }
}

/// Scheduler for periodic cache maintenance.
///
/// # Example
///
/// ```ignore
/// use cadence_core::cache::{MaintenanceScheduler, MemoCache};
/// use cadence_core::config::MaintenanceConfig;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let cache = Arc::new(MemoCache::default());
/// let mut scheduler = MaintenanceScheduler::new(cache, MaintenanceConfig::with_interval(60)).await?;
/// scheduler.start().await?;
/// scheduler.shutdown().await?;
/// # Ok(())
/// # }
/// ```
pub struct MaintenanceScheduler {
    scheduler: JobScheduler,
    cache: Arc<MemoCache>,
    config: MaintenanceConfig,
}

impl MaintenanceScheduler {
    /// Create a new scheduler. Call `start()` to begin periodic execution.
    pub async fn new(cache: Arc<MemoCache>, config: MaintenanceConfig) -> Result<Self, JobSchedulerError> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            scheduler,
            cache,
            config,
        })
    }

    pub fn config(&self) -> &MaintenanceConfig {
        &self.config
    }

    /// Start periodic maintenance at the configured interval.
    pub async fn start(&self) -> Result<(), JobSchedulerError> {
        let cache = self.cache.clone();
        let interval_secs = self.config.interval_seconds.max(1);

        let job = Job::new_repeated_async(
            std::time::Duration::from_secs(interval_secs),
            move |_uuid, _lock| {
                let cache = cache.clone();
                Box::pin(async move {
                    debug!("Starting periodic cache maintenance");
                    run_maintenance(&cache);
                })
            },
        )?;

        self.scheduler.add(job).await?;

        if self.config.run_on_start {
            debug!("Running initial cache maintenance on start");
            run_maintenance(&self.cache);
        }

        self.scheduler.start().await?;

        info!(interval_seconds = interval_secs, "Cache maintenance scheduler started");

        Ok(())
    }

    /// Stop the scheduler gracefully.
    pub async fn shutdown(&mut self) -> Result<(), JobSchedulerError> {
        info!("Shutting down cache maintenance scheduler");
        self.scheduler.shutdown().await
    }

    /// Run maintenance outside the scheduled interval.
    pub fn run_now(&self) -> MaintenanceReport {
        run_maintenance(&self.cache)
    }

    pub fn cache(&self) -> &Arc<MemoCache> {
        &self.cache
    }
}
