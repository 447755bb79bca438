//! Cache key builders.
//!
//! Keys are opaque to the cache. These helpers give every category a stable
//! prefix and hash structured inputs with md5 so keys stay short.
//!
//! Builders that hash return `None` when the input cannot be serialized;
//! callers skip the cache rather than share a key.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::types::{CardMemoryState, FsrsParameters, ReviewResponse};

/// Hex md5 of a value's JSON form.
pub fn content_hash<T: Serialize + ?Sized>(value: &T) -> Option<String> {
    match serde_json::to_vec(value) {
        Ok(bytes) => Some(format!("{:x}", md5::compute(bytes))),
        Err(e) => {
            warn!(error = %e, "Cannot hash cache key input");
            None
        }
    }
}

/// `dsr:<card_id>:<md5(card, response, parameters)>`
///
/// Every input of the DSR update is hashed, so a different snapshot of the
/// same card or another learner's weights never share an entry.
pub fn dsr(
    card: &CardMemoryState,
    response: &ReviewResponse,
    parameters: &FsrsParameters,
) -> Option<String> {
    let hash = content_hash(&(card, response, parameters))?;
    Some(format!("dsr:{}:{}", card.card_id, hash))
}

/// `selection:<user_id>:<md5(card ids)>`
pub fn card_selection(user_id: &str, card_ids: &[String]) -> Option<String> {
    Some(format!("selection:{}:{}", user_id, content_hash(card_ids)?))
}

/// `profile:<user_id>`
pub fn user_profile(user_id: &str) -> String {
    format!("profile:{}", user_id)
}

/// `cognitive:<user_id>:<hour bucket>`
pub fn cognitive_analysis(user_id: &str, at: DateTime<Utc>) -> String {
    format!("cognitive:{}:{}", user_id, at.format("%Y%m%d%H"))
}

/// `environment:<md5(factors)>`
pub fn environmental_context<T: Serialize + ?Sized>(factors: &T) -> Option<String> {
    Some(format!("environment:{}", content_hash(factors)?))
}

/// `session:<session_id>`
pub fn session_state(session_id: &str) -> String {
    format!("session:{}", session_id)
}
