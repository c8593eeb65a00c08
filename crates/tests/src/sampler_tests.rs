//! Periodic sampler and session sweeper behavior under a live runtime.

use std::{collections::HashMap, sync::Arc, time::Duration};

use pulse_core::{EngineConfig, MetricsEngine, RequestSample, SystemSampler};
use tokio::sync::broadcast;

fn shared_engine() -> Arc<MetricsEngine> {
    Arc::new(MetricsEngine::with_defaults())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_sampler_feeds_health_immediately() {
    let engine = shared_engine();
    let sampler = SystemSampler::with_interval(Arc::clone(&engine), Duration::from_secs(3600));

    sampler.activate();
    tokio::time::sleep(Duration::from_millis(300)).await;

    // The first tick fires on activation, so health reflects a real sample
    // long before the hour-long interval elapses.
    let health = engine.system_health(HashMap::new());
    assert!(health.heap_total_bytes > 0);

    sampler.deactivate();
    assert!(!sampler.is_active());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_reactivation_keeps_a_single_timer() {
    let engine = shared_engine();
    let sampler = SystemSampler::with_interval(Arc::clone(&engine), Duration::from_secs(3600));

    sampler.activate();
    sampler.activate();
    sampler.activate();
    assert!(sampler.is_active());

    // One deactivation stops sampling entirely; there is no second timer
    // left behind by the earlier activations.
    sampler.deactivate();
    assert!(!sampler.is_active());

    sampler.deactivate(); // idempotent
    assert!(!sampler.is_active());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_no_samples_after_deactivation() {
    let engine = shared_engine();
    let sampler = SystemSampler::with_interval(Arc::clone(&engine), Duration::from_millis(50));

    sampler.activate();
    tokio::time::sleep(Duration::from_millis(200)).await;
    sampler.deactivate();

    let before = engine.system_health(HashMap::new()).timestamp;
    tokio::time::sleep(Duration::from_millis(200)).await;
    let after = engine.system_health(HashMap::new());

    // Health still reads the last sample taken before deactivation; the
    // report timestamp moves but the underlying sample does not grow.
    assert!(after.heap_total_bytes > 0);
    assert!(after.timestamp >= before);
    assert!(!sampler.is_active());
}

#[tokio::test]
async fn test_session_sweeper_lifecycle() {
    let config = EngineConfig {
        session_ttl_seconds: 300,
        session_sweep_interval_seconds: 1,
        ..EngineConfig::default()
    };
    let engine = Arc::new(MetricsEngine::new(config));

    engine.record_request(RequestSample::new("/", "GET", 200, 1.0).with_user_id("alice"));
    assert_eq!(engine.active_sessions(), 1);

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let handle = engine.start_session_sweeper(shutdown_rx);

    shutdown_tx.send(()).expect("send should succeed");
    let result = tokio::time::timeout(Duration::from_secs(1), handle).await;
    assert!(result.is_ok(), "sweeper should exit on shutdown");

    // The session itself is still active; shutdown only stops the sweep.
    assert_eq!(engine.active_sessions(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_sampled_resource_breach_raises_alert() {
    let engine = shared_engine();

    // Force an impossible-to-miss threshold so the very first real sample
    // breaches it.
    engine.update_thresholds(&pulse_core::ThresholdOverrides {
        memory_percent: Some(0.000_001),
        ..pulse_core::ThresholdOverrides::default()
    });

    let sampler = SystemSampler::with_interval(Arc::clone(&engine), Duration::from_secs(3600));
    sampler.activate();
    tokio::time::sleep(Duration::from_millis(300)).await;
    sampler.deactivate();

    assert!(
        engine
            .active_alerts()
            .iter()
            .any(|a| a.kind == pulse_core::AlertKind::Memory),
        "a real sample should have breached the absurd memory threshold"
    );
}
