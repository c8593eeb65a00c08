//! # Metrics Engine
//!
//! Ingestion and query facade over the bounded metric buffers.
//!
//! ## Write Path
//!
//! Three narrow ingestion operations — [`record_request`], [`record_error`],
//! [`record_system_sample`] — each a short critical section: one buffer push
//! under a write lock plus an inline threshold check. Nothing on the write
//! path blocks on I/O and nothing validates beyond type shape: malformed but
//! type-correct samples are accepted unconditionally (garbage in, garbage
//! reported), because this engine exists to observe the host process and
//! must never take it down.
//!
//! ## Read Path
//!
//! Every query clones a snapshot of the relevant buffer under a read lock
//! and aggregates after releasing it, so results are consistent for the
//! duration of one query even while ingestion continues concurrently.
//!
//! ## Ownership
//!
//! One engine instance per process, constructed explicitly by the host and
//! shared as `Arc<MetricsEngine>` — no hidden global state.
//!
//! [`record_request`]: MetricsEngine::record_request
//! [`record_error`]: MetricsEngine::record_error
//! [`record_system_sample`]: MetricsEngine::record_system_sample

mod aggregate;

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use chrono::Utc;
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::debug;

use crate::{
    alerts::{Alert, AlertManager, ThresholdEvaluator},
    buffer::RingBuffer,
    config::{AlertThresholds, EngineConfig, ThresholdOverrides},
    events::{EngineEvent, ObserverId, ObserverRegistry},
    health,
    sessions::SessionTracker,
    types::{
        EndpointStats, ErrorSample, HealthReport, HistogramBucket, HourlyTraffic, MetricsSummary,
        RealtimeStats, RequestSample, SystemSample,
    },
};

/// Trailing window for request volume and error rate, in seconds.
const REALTIME_WINDOW_SECS: i64 = 60;

/// Trailing window for the recent-error count, in seconds.
const RECENT_ERROR_WINDOW_SECS: i64 = 300;

/// Default number of endpoint groups returned by [`MetricsEngine::top_endpoints`].
pub const DEFAULT_TOP_ENDPOINTS: usize = 10;

/// The real-time metrics and alerting engine.
///
/// Owns the three sample buffers, the active-session tracker, the alert
/// registry, and the observer registry. See the module docs for the
/// concurrency contract.
pub struct MetricsEngine {
    requests: RwLock<RingBuffer<RequestSample>>,
    errors: RwLock<RingBuffer<ErrorSample>>,
    system: RwLock<RingBuffer<SystemSample>>,
    sessions: Arc<SessionTracker>,
    alerts: Arc<AlertManager>,
    evaluator: ThresholdEvaluator,
    observers: ObserverRegistry,
    /// Host-reported concurrent connection count, copied into each sample
    /// taken by the periodic sampler.
    active_connections: AtomicU64,
    started_at: Instant,
    config: EngineConfig,
}

impl MetricsEngine {
    /// Creates an engine from the given configuration.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let alerts = Arc::new(AlertManager::new());
        let evaluator = ThresholdEvaluator::new(Arc::clone(&alerts), config.thresholds.clone());

        Self {
            requests: RwLock::new(RingBuffer::new(config.request_buffer_capacity)),
            errors: RwLock::new(RingBuffer::new(config.error_buffer_capacity)),
            system: RwLock::new(RingBuffer::new(config.system_buffer_capacity)),
            sessions: Arc::new(SessionTracker::new(config.session_ttl_seconds)),
            alerts,
            evaluator,
            observers: ObserverRegistry::new(),
            active_connections: AtomicU64::new(0),
            started_at: Instant::now(),
            config,
        }
    }

    /// Creates an engine with compiled-default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default())
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ========== Ingestion ==========

    /// Records a completed request.
    ///
    /// Pushes into the request buffer, refreshes the user's session when the
    /// sample is attributed, runs the response-time threshold check, and
    /// notifies observers.
    pub fn record_request(&self, sample: RequestSample) {
        let sample = Arc::new(sample);

        self.requests.write().push((*sample).clone());

        if let Some(user_id) = &sample.user_id {
            self.sessions.touch(user_id);
        }

        self.evaluator.check_response_time(&sample);
        self.observers.notify(&EngineEvent::RequestObserved(sample));
    }

    /// Records an application error.
    ///
    /// Pushes into the error buffer, runs the windowed error-rate check
    /// against the request history, and notifies observers.
    pub fn record_error(&self, sample: ErrorSample) {
        let sample = Arc::new(sample);

        self.errors.write().push((*sample).clone());

        let requests = self.requests.read().snapshot();
        let cutoff = Utc::now() - chrono::Duration::seconds(REALTIME_WINDOW_SECS);
        let (in_window, _, error_rate) = aggregate::window_stats(&requests, cutoff);
        self.evaluator.check_error_rate(in_window, error_rate);

        self.observers.notify(&EngineEvent::ErrorObserved(sample));
    }

    /// Records a system resource sample and runs the CPU/memory checks.
    pub fn record_system_sample(&self, sample: SystemSample) {
        self.evaluator.check_system(&sample);
        debug!(
            cpu_percent = sample.cpu_percent,
            memory_percent = sample.memory_percent,
            "system sample recorded"
        );
        self.system.write().push(sample);
    }

    // ========== Host hooks ==========

    /// Sets the concurrent-connection gauge the sampler folds into each
    /// system sample. Connection counts are owned by the host's server loop.
    pub fn set_active_connections(&self, count: u64) {
        self.active_connections.store(count, Ordering::Relaxed);
    }

    #[must_use]
    pub fn active_connections(&self) -> u64 {
        self.active_connections.load(Ordering::Relaxed)
    }

    // ========== Observers ==========

    /// Registers an ingestion observer. Callbacks run synchronously on the
    /// ingesting thread and must stay cheap.
    pub fn subscribe<F>(&self, callback: F) -> ObserverId
    where
        F: Fn(&EngineEvent) + Send + Sync + 'static,
    {
        self.observers.subscribe(callback)
    }

    /// Removes a previously registered observer.
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    // ========== Queries ==========

    /// Live traffic statistics over the trailing windows.
    #[must_use]
    pub fn realtime_stats(&self) -> RealtimeStats {
        let requests = self.requests.read().snapshot();
        let errors = self.errors.read().snapshot();

        let now = Utc::now();
        let request_cutoff = now - chrono::Duration::seconds(REALTIME_WINDOW_SECS);
        let error_cutoff = now - chrono::Duration::seconds(RECENT_ERROR_WINDOW_SECS);

        let (requests_per_minute, average_response_time_ms, error_rate_percent) =
            aggregate::window_stats(&requests, request_cutoff);
        let recent_errors = errors.iter().filter(|e| e.timestamp > error_cutoff).count();

        RealtimeStats {
            requests_per_minute,
            average_response_time_ms,
            error_rate_percent,
            recent_errors,
            active_sessions: self.sessions.active_count(),
            timestamp: now,
        }
    }

    /// Busiest endpoint groups over the full retained buffer.
    #[must_use]
    pub fn top_endpoints(&self, limit: usize) -> Vec<EndpointStats> {
        let requests = self.requests.read().snapshot();
        aggregate::top_endpoints(&requests, limit)
    }

    /// Response-time distribution over the full retained buffer.
    ///
    /// Empty when nothing has been recorded.
    #[must_use]
    pub fn response_time_histogram(&self) -> Vec<HistogramBucket> {
        let requests = self.requests.read().snapshot();
        aggregate::response_time_histogram(&requests)
    }

    /// Request volume by hour of day; always exactly 24 entries.
    #[must_use]
    pub fn hourly_traffic(&self) -> Vec<HourlyTraffic> {
        let requests = self.requests.read().snapshot();
        aggregate::hourly_traffic(&requests)
    }

    /// Totals over the full retained buffers plus uptime.
    #[must_use]
    pub fn metrics_summary(&self) -> MetricsSummary {
        let requests = self.requests.read().snapshot();
        let total_errors = self.errors.read().len();
        let hourly = aggregate::hourly_traffic(&requests);

        MetricsSummary {
            total_requests: requests.len(),
            total_errors,
            uptime: self.uptime_string(),
            peak_requests_per_minute: aggregate::peak_requests_per_minute(&hourly),
        }
    }

    /// Health verdict from the most recent system sample.
    ///
    /// `dependencies` are opaque downstream states supplied by the host,
    /// reported but not evaluated here.
    #[must_use]
    pub fn system_health(&self, dependencies: HashMap<String, String>) -> HealthReport {
        let latest = self.system.read().last().cloned();
        health::evaluate(
            latest.as_ref(),
            &self.evaluator.thresholds(),
            self.uptime().as_secs(),
            self.uptime_string(),
            dependencies,
        )
    }

    /// Distinct users with activity inside the session TTL.
    #[must_use]
    pub fn active_sessions(&self) -> usize {
        self.sessions.active_count()
    }

    // ========== Alerts ==========

    #[must_use]
    pub fn alert_manager(&self) -> &Arc<AlertManager> {
        &self.alerts
    }

    /// All unresolved alerts, in insertion order.
    #[must_use]
    pub fn active_alerts(&self) -> Vec<Alert> {
        self.alerts.active_alerts()
    }

    /// Resolves an alert by id; `false` for unknown or already-resolved ids.
    pub fn resolve_alert(&self, alert_id: &str) -> bool {
        self.alerts.resolve(alert_id)
    }

    /// Current alert thresholds.
    #[must_use]
    pub fn thresholds(&self) -> Arc<AlertThresholds> {
        self.evaluator.thresholds()
    }

    /// Merges a partial override over the current thresholds, returning the
    /// new snapshot.
    pub fn update_thresholds(&self, overrides: &ThresholdOverrides) -> AlertThresholds {
        self.evaluator.update_thresholds(overrides)
    }

    // ========== Lifecycle ==========

    /// Wall-clock time since the engine was constructed.
    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Uptime formatted as `{d}d {h}h {m}m`.
    #[must_use]
    pub fn uptime_string(&self) -> String {
        aggregate::format_uptime(self.uptime().as_secs())
    }

    /// The session tracker, for hosts that want to drive the sweeper
    /// themselves.
    #[must_use]
    pub fn sessions(&self) -> &Arc<SessionTracker> {
        &self.sessions
    }

    /// Starts the session sweep task at the configured interval.
    #[must_use]
    pub fn start_session_sweeper(
        &self,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> tokio::task::JoinHandle<()> {
        self.sessions.start_sweeper(
            Duration::from_secs(self.config.session_sweep_interval_seconds),
            shutdown_rx,
        )
    }

    /// Clears the sample buffers and the session set.
    ///
    /// The alert registry is left intact: alerts record history and are
    /// bounded by resolution, not by reset.
    pub fn reset(&self) {
        self.requests.write().clear();
        self.errors.write().clear();
        self.system.write().clear();
        self.sessions.clear();
        tracing::info!("metrics buffers reset");
    }
}
