//! End-to-end ingestion and query scenarios.

use std::collections::HashMap;

use pulse_core::{
    EngineConfig, ErrorSample, HealthStatus, MetricsEngine, RequestSample, SystemSample,
};

fn engine() -> MetricsEngine {
    MetricsEngine::with_defaults()
}

#[test]
fn test_full_request_flow_shows_up_in_every_read_model() {
    let engine = engine();

    for n in 0..20 {
        let status = if n % 5 == 0 { 500 } else { 200 };
        engine.record_request(
            RequestSample::new("/api/orders", "GET", status, 40.0 + f64::from(n))
                .with_user_id(format!("user-{}", n % 3)),
        );
    }

    // Real-time stats see everything inside the 1-minute window.
    let stats = engine.realtime_stats();
    assert_eq!(stats.requests_per_minute, 20);
    assert!((stats.error_rate_percent - 20.0).abs() < f64::EPSILON);
    assert_eq!(stats.active_sessions, 3);
    assert!(stats.average_response_time_ms > 40.0);

    // The endpoint table groups all of them under one key.
    let top = engine.top_endpoints(10);
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].request_count, 20);
    assert!((top[0].error_rate_percent - 20.0).abs() < f64::EPSILON);

    // Histogram covers every sample exactly once.
    let histogram = engine.response_time_histogram();
    let bucketed: usize = histogram.iter().map(|b| b.count).sum();
    assert_eq!(bucketed, 20);

    // Hourly traffic is complete and accounts for all samples.
    let hourly = engine.hourly_traffic();
    assert_eq!(hourly.len(), 24);
    assert_eq!(hourly.iter().map(|h| h.request_count).sum::<usize>(), 20);

    let summary = engine.metrics_summary();
    assert_eq!(summary.total_requests, 20);
    assert_eq!(summary.total_errors, 0);
}

#[test]
fn test_buffer_bound_drops_oldest_requests() {
    let config = EngineConfig { request_buffer_capacity: 3, ..EngineConfig::default() };
    let engine = MetricsEngine::new(config);

    for endpoint in ["/a", "/b", "/c", "/d"] {
        engine.record_request(RequestSample::new(endpoint, "GET", 200, 1.0));
    }

    // Capacity 3 after pushes A, B, C, D: B, C, D survive.
    let top = engine.top_endpoints(10);
    let endpoints: Vec<&str> = top.iter().map(|s| s.endpoint.as_str()).collect();
    assert_eq!(top.len(), 3);
    assert!(!endpoints.contains(&"/a"));
    assert!(endpoints.contains(&"/b"));
    assert!(endpoints.contains(&"/d"));

    engine.record_request(RequestSample::new("/e", "GET", 200, 1.0));
    let top = engine.top_endpoints(10);
    let endpoints: Vec<&str> = top.iter().map(|s| s.endpoint.as_str()).collect();
    assert!(!endpoints.contains(&"/b"));
    assert!(endpoints.contains(&"/e"));
}

#[test]
fn test_percentiles_per_endpoint_group() {
    let engine = engine();

    // 100 samples with known distribution on one endpoint.
    for n in 1..=100 {
        engine.record_request(RequestSample::new("/api/report", "GET", 200, f64::from(n)));
    }

    let top = engine.top_endpoints(10);
    let report = &top[0];
    assert!(report.p99_response_time_ms >= report.p95_response_time_ms);
    assert_eq!(report.p95_response_time_ms, 96.0);
    assert_eq!(report.p99_response_time_ms, 100.0);
}

#[test]
fn test_empty_engine_reads_are_defined() {
    let engine = engine();

    let stats = engine.realtime_stats();
    assert_eq!(stats.requests_per_minute, 0);
    assert_eq!(stats.average_response_time_ms, 0.0);
    assert_eq!(stats.error_rate_percent, 0.0);
    assert_eq!(stats.recent_errors, 0);

    assert!(engine.top_endpoints(10).is_empty());
    assert!(engine.response_time_histogram().is_empty(), "no zero-filled buckets when empty");
    assert_eq!(engine.hourly_traffic().len(), 24);

    let summary = engine.metrics_summary();
    assert_eq!(summary.total_requests, 0);
    assert_eq!(summary.peak_requests_per_minute, 0);
}

#[test]
fn test_health_tracks_latest_sample_only() {
    let engine = engine();

    engine.record_system_sample(SystemSample {
        cpu_percent: 95.0,
        memory_percent: 40.0,
        ..SystemSample::empty()
    });
    engine.record_system_sample(SystemSample {
        cpu_percent: 10.0,
        memory_percent: 10.0,
        ..SystemSample::empty()
    });

    // The earlier critical sample no longer dictates the verdict.
    let health = engine.system_health(HashMap::new());
    assert_eq!(health.status, HealthStatus::Healthy);
    assert_eq!(health.cpu_percent, 10.0);
}

#[test]
fn test_health_degraded_band_end_to_end() {
    let engine = engine();

    // 70% CPU is above 80% of the default 80% threshold.
    engine.record_system_sample(SystemSample {
        cpu_percent: 70.0,
        memory_percent: 10.0,
        ..SystemSample::empty()
    });

    let mut dependencies = HashMap::new();
    dependencies.insert("datastore".to_string(), "connected".to_string());
    let health = engine.system_health(dependencies);

    assert_eq!(health.status, HealthStatus::Degraded);
    assert_eq!(health.dependencies.get("datastore").map(String::as_str), Some("connected"));
}

#[test]
fn test_error_buffer_is_separate_and_smaller() {
    let config = EngineConfig {
        request_buffer_capacity: 100,
        error_buffer_capacity: 2,
        ..EngineConfig::default()
    };
    let engine = MetricsEngine::new(config);

    for n in 0..5 {
        engine.record_error(ErrorSample::new("/", "GET", "IoError", format!("error {n}")));
    }

    // Only the last two errors are retained; the request buffer is untouched.
    let summary = engine.metrics_summary();
    assert_eq!(summary.total_errors, 2);
    assert_eq!(summary.total_requests, 0);
}

#[test]
fn test_read_models_serialize_for_http_hosts() {
    let engine = engine();
    engine.record_request(RequestSample::new("/api/orders", "GET", 200, 12.0));

    let stats = engine.realtime_stats();
    let json = serde_json::to_value(&stats).expect("stats serialize");
    assert_eq!(json["requests_per_minute"], 1);

    let health = engine.system_health(HashMap::new());
    let json = serde_json::to_value(&health).expect("health serialize");
    assert_eq!(json["status"], "healthy");
}
