//! Integration tests for the memo cache and its maintenance runtime.

use std::sync::Arc;

use cadence_core::cache::{keys, Clock, ManualClock};
use cadence_core::config::MaintenanceConfig;
use cadence_core::types::CardMemoryState;
use cadence_core::{
    CacheCategory, CacheConfig, CadenceConfig, EngineConfig, MemoCache, Rating, ReviewResponse,
    SchedulingEngine, SchedulingRuntime,
};
use chrono::{Duration, Utc};
use tokio_test::assert_ok;

fn manual_cache() -> (Arc<MemoCache>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let cache = Arc::new(MemoCache::with_clock(&CacheConfig::default(), clock.clone()));
    (cache, clock)
}

#[test]
fn test_card_selection_overflow_evicts_first_key() {
    let (cache, _clock) = manual_cache();
    for i in 0..501 {
        cache.set(
            CacheCategory::CardSelections,
            format!("selection-{}", i),
            vec![format!("card-{}", i)],
        );
    }

    assert_eq!(cache.len(CacheCategory::CardSelections), 500);
    assert_eq!(cache.stats().eviction_count, 1);
    assert!(!cache.contains(CacheCategory::CardSelections, "selection-0"));
    assert!(cache.contains(CacheCategory::CardSelections, "selection-1"));
    assert!(cache.contains(CacheCategory::CardSelections, "selection-500"));
}

#[test]
fn test_set_get_then_expire() {
    let (cache, clock) = manual_cache();
    let key = keys::user_profile("u1");
    cache.set(CacheCategory::UserProfiles, key.clone(), 0.92_f64);

    assert_eq!(cache.get::<f64>(CacheCategory::UserProfiles, &key), Some(0.92));
    clock.advance(Duration::minutes(15) + Duration::milliseconds(1));
    assert_eq!(cache.get::<f64>(CacheCategory::UserProfiles, &key), None);

    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.total_items, 0);
}

#[test]
fn test_repeated_reads_leave_value_unchanged() {
    let (cache, clock) = manual_cache();
    let key = keys::session_state("s1");
    cache.set(CacheCategory::SessionStates, key.clone(), vec![1u32, 2, 3]);

    for _ in 0..10 {
        clock.advance(Duration::seconds(5));
        assert_eq!(
            cache.get::<Vec<u32>>(CacheCategory::SessionStates, &key),
            Some(vec![1, 2, 3])
        );
    }
    let (count, last) = cache.entry_info(CacheCategory::SessionStates, &key).unwrap();
    assert_eq!(count, 10);
    assert_eq!(last, clock.now());
}

#[test]
fn test_engine_results_are_memoized_per_response() {
    let (cache, _clock) = manual_cache();
    let engine = SchedulingEngine::new(EngineConfig::default(), Some(cache.clone()));
    let card = CardMemoryState::new("c1");
    let at = Utc::now();

    let good = ReviewResponse::new(Rating::Good, 4000.0, at);
    let hard = ReviewResponse::new(Rating::Hard, 4000.0, at);
    engine.update_card(&card, &good, None);
    engine.update_card(&card, &good, None);
    engine.update_card(&card, &hard, None);

    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 2);
    assert_eq!(stats.per_category[&CacheCategory::DsrCalculations].items, 2);
}

#[test]
fn test_compaction_respects_budget() {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let cache = MemoCache::with_clock(&CacheConfig { memory_budget_bytes: 1000 }, clock.clone());
    for i in 0..20 {
        cache.set_with_size(CacheCategory::CognitiveAnalysis, format!("a{}", i), i, 100);
    }
    clock.advance(Duration::seconds(1));

    assert_eq!(cache.compact_memory(), 4);
    assert_eq!(cache.len(CacheCategory::CognitiveAnalysis), 16);
    assert_eq!(cache.stats().total_memory_usage, 1600);
}

#[tokio::test]
async fn test_runtime_drains_on_shutdown() {
    let config = CadenceConfig::builder()
        .maintenance(MaintenanceConfig::with_interval(3600).with_run_on_start())
        .build();
    let mut runtime = assert_ok!(SchedulingRuntime::new(config).await);
    assert_ok!(runtime.start().await);

    let engine = runtime.engine();
    let at = Utc::now();
    for i in 0..5 {
        let card = CardMemoryState::new(format!("card-{}", i));
        engine.schedule(&card, &ReviewResponse::new(Rating::Good, 3000.0, at), None);
    }
    runtime
        .cache()
        .set(CacheCategory::EnvironmentalContext, "env", 1u8);

    let stats = assert_ok!(runtime.shutdown().await);
    assert_eq!(stats.per_category[&CacheCategory::DsrCalculations].items, 5);
    assert_eq!(stats.misses, 5);
}
