//! Alert creation, deduplication, severity, and resolution scenarios
//! driven through the ingestion paths.

use pulse_core::{
    AlertKind, AlertSeverity, ErrorSample, MetricsEngine, RequestSample, SystemSample,
    ThresholdOverrides,
};

fn engine() -> MetricsEngine {
    MetricsEngine::with_defaults()
}

#[test]
fn test_repeated_slow_requests_create_one_critical_alert() {
    let engine = engine();

    // Five requests: [10, 2000, 2000, 2000, 10] ms against a 1000ms
    // threshold. Only the first breach creates an alert, and 2000 >= 2x1000
    // makes it critical.
    for rt in [10.0, 2000.0, 2000.0, 2000.0, 10.0] {
        engine.record_request(RequestSample::new("/api/report", "GET", 200, rt));
    }

    let active = engine.active_alerts();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].kind, AlertKind::ResponseTime);
    assert_eq!(active[0].severity, AlertSeverity::Critical);
    assert!(active[0].id.starts_with("response_time-"));
}

#[test]
fn test_resolution_allows_a_new_alert() {
    let engine = engine();

    engine.record_request(RequestSample::new("/slow", "GET", 200, 1500.0));
    let first = engine.active_alerts().pop().expect("first alert");

    // Suppressed while the first alert is unresolved.
    engine.record_request(RequestSample::new("/slow", "GET", 200, 1500.0));
    assert_eq!(engine.active_alerts().len(), 1);

    assert!(engine.resolve_alert(&first.id));
    assert!(engine.active_alerts().is_empty());

    // A breach after resolution creates a fresh alert with a fresh id.
    engine.record_request(RequestSample::new("/slow", "GET", 200, 1500.0));
    let second = engine.active_alerts().pop().expect("second alert");
    assert_ne!(first.id, second.id);
}

#[test]
fn test_resolving_twice_reports_failure_not_error() {
    let engine = engine();
    engine.record_request(RequestSample::new("/slow", "GET", 200, 1500.0));
    let alert = engine.active_alerts().pop().expect("alert");

    assert!(engine.resolve_alert(&alert.id));
    assert!(!engine.resolve_alert(&alert.id));
    assert!(!engine.resolve_alert("response_time-0"), "unknown id fails quietly");
}

#[test]
fn test_error_rate_guard_scenario() {
    let engine = engine();

    // Status codes [200,200,200,200,500,500,500]: a ~43% error rate, but
    // only 7 in-window requests. 7 > 10 is false, so the alert is
    // suppressed by the minimum-sample guard.
    for status in [200, 200, 200, 200, 500, 500, 500] {
        engine.record_request(RequestSample::new("/api/orders", "POST", status, 20.0));
    }
    engine.record_error(ErrorSample::new("/api/orders", "POST", "ServerError", "boom"));

    assert!(engine.active_alerts().is_empty());
}

#[test]
fn test_error_rate_fires_with_sufficient_traffic() {
    let engine = engine();

    // 12 requests with 6 errors: 50% rate over more than 10 samples.
    for status in [200, 200, 200, 200, 200, 200, 500, 500, 500, 500, 500, 500] {
        engine.record_request(RequestSample::new("/api/orders", "POST", status, 20.0));
    }
    engine.record_error(ErrorSample::new("/api/orders", "POST", "ServerError", "boom"));

    let active = engine.active_alerts();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].kind, AlertKind::ErrorRate);
    // 50% >= 2 x 5% threshold.
    assert_eq!(active[0].severity, AlertSeverity::Critical);
    assert_eq!(active[0].threshold, 5.0);
}

#[test]
fn test_cpu_and_memory_alerts_are_distinct_kinds() {
    let engine = engine();

    engine.record_system_sample(SystemSample {
        cpu_percent: 85.0,
        memory_percent: 90.0,
        ..SystemSample::empty()
    });

    let mut kinds: Vec<AlertKind> = engine.active_alerts().iter().map(|a| a.kind).collect();
    kinds.sort_by_key(|k| k.as_str());
    assert_eq!(kinds, vec![AlertKind::Cpu, AlertKind::Memory]);

    // A second breaching sample inside the hysteresis window adds nothing.
    engine.record_system_sample(SystemSample {
        cpu_percent: 99.0,
        memory_percent: 99.0,
        ..SystemSample::empty()
    });
    assert_eq!(engine.active_alerts().len(), 2);
}

#[test]
fn test_threshold_override_applies_to_subsequent_checks() {
    let engine = engine();

    // Tighten only the response-time threshold at runtime.
    let merged = engine.update_thresholds(&ThresholdOverrides {
        response_time_ms: Some(50.0),
        ..ThresholdOverrides::default()
    });
    assert_eq!(merged.response_time_ms, 50.0);
    assert_eq!(merged.error_rate_percent, 5.0, "unnamed fields unchanged");

    engine.record_request(RequestSample::new("/", "GET", 200, 80.0));

    let active = engine.active_alerts();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].threshold, 50.0);
    assert_eq!(active[0].value, 80.0);
}

#[test]
fn test_alert_messages_carry_both_forms() {
    let engine = engine();
    engine.record_request(RequestSample::new("/api/report", "GET", 200, 2400.0));

    let alert = engine.active_alerts().pop().expect("alert");
    assert!(alert.message.contains("2400ms"));
    assert!(alert.message.contains("/api/report"));
    assert!(alert.message_localized.contains("Response time"));
    assert!(alert.message_localized.contains("threshold"));
}

#[test]
fn test_alert_registry_survives_buffer_reset() {
    let engine = engine();
    engine.record_request(RequestSample::new("/slow", "GET", 200, 1500.0));
    assert_eq!(engine.active_alerts().len(), 1);

    engine.reset();

    // Buffers are empty, but the alert registry is not purged by reset.
    assert_eq!(engine.metrics_summary().total_requests, 0);
    assert_eq!(engine.active_alerts().len(), 1);
}
