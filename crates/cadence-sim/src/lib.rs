//! cadence-sim - replay a review log through the scheduling engine.
//!
//! The log is a JSON array of `{ card, response, profile? }` records. Each
//! record is scheduled in order; with chaining on, a later record for the
//! same card starts from the snapshot produced by the previous one.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use cadence_core::{
    CacheStats, CardMemoryState, LearnerProfile, ReviewResponse, ScheduledReview, SchedulingEngine,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One entry of the review log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub card: CardMemoryState,
    pub response: ReviewResponse,
    #[serde(default)]
    pub profile: Option<LearnerProfile>,
}

/// Result of scheduling one record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayOutcome {
    pub card_id: String,
    #[serde(flatten)]
    pub scheduled: ScheduledReview,
}

/// Everything the replayer prints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayReport {
    pub results: Vec<ReplayOutcome>,
    /// Records rejected by validation, by index.
    pub rejected: Vec<RejectedRecord>,
    pub cache: Option<CacheStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectedRecord {
    pub index: usize,
    pub code: String,
    pub message: String,
}

/// Read and parse a review log.
pub fn load_reviews(path: impl AsRef<Path>) -> anyhow::Result<Vec<ReviewRecord>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read review log {}", path.display()))?;
    let records = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse review log {}", path.display()))?;
    Ok(records)
}

/// Schedule every record in order.
///
/// Invalid records are reported and skipped; they never reach the engine.
pub fn replay(engine: &SchedulingEngine, records: &[ReviewRecord], chain: bool) -> ReplayReport {
    let mut latest: HashMap<String, CardMemoryState> = HashMap::new();
    let mut results = Vec::with_capacity(records.len());
    let mut rejected = Vec::new();

    for (index, record) in records.iter().enumerate() {
        if let Err(e) = record.response.validate().and_then(|_| record.card.validate()) {
            warn!(index, error = %e, "Skipping invalid review record");
            rejected.push(RejectedRecord {
                index,
                code: e.code().as_str().to_string(),
                message: e.to_string(),
            });
            continue;
        }

        let card = match latest.get(&record.card.card_id) {
            Some(previous) if chain => previous,
            _ => &record.card,
        };
        let scheduled = engine.schedule(card, &record.response, record.profile.as_ref());
        debug!(
            index,
            card_id = %record.card.card_id,
            interval_days = scheduled.interval_days,
            "Replayed review"
        );

        if chain {
            latest.insert(record.card.card_id.clone(), scheduled.card.clone());
        }
        results.push(ReplayOutcome {
            card_id: record.card.card_id.clone(),
            scheduled,
        });
    }

    ReplayReport {
        results,
        rejected,
        cache: engine.cache().map(|cache| cache.stats()),
    }
}
