//! Core sample and read-model type definitions.
//!
//! # Type Categories
//!
//! ## Ingested Samples
//! - [`RequestSample`], [`ErrorSample`], [`SystemSample`]: immutable observations
//!   pushed into the engine's ring buffers and discarded by buffer overwrite
//!
//! ## Derived Read Models
//! - [`RealtimeStats`], [`EndpointStats`], [`HistogramBucket`], [`HourlyTraffic`],
//!   [`MetricsSummary`], [`HealthReport`]: recomputed from buffer snapshots on
//!   every query, never stored
//!
//! All read models are serde-serializable and carry `utoipa` schemas so a host
//! HTTP layer can expose them directly.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A completed request observation.
///
/// Created by the host's request lifecycle hook with timing measured from
/// request start to response completion. Immutable once created; lives only
/// inside the request ring buffer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RequestSample {
    /// Request path or route template (e.g. `/api/orders`).
    pub endpoint: String,
    /// HTTP method (e.g. `GET`).
    pub method: String,
    /// Response status code; `>= 400` counts toward the error rate.
    pub status_code: u16,
    /// Wall-clock request duration in milliseconds.
    pub response_time_ms: f64,
    /// When the response completed.
    pub timestamp: DateTime<Utc>,
    /// Authenticated user, when known. Feeds the active-session tracker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<String>,
}

impl RequestSample {
    /// Creates a sample stamped with the current time.
    #[must_use]
    pub fn new(
        endpoint: impl Into<String>,
        method: impl Into<String>,
        status_code: u16,
        response_time_ms: f64,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            method: method.into(),
            status_code,
            response_time_ms,
            timestamp: Utc::now(),
            user_id: None,
            user_agent: None,
            client_ip: None,
        }
    }

    #[must_use]
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    #[must_use]
    pub fn with_client_ip(mut self, client_ip: impl Into<String>) -> Self {
        self.client_ip = Some(client_ip.into());
        self
    }

    /// Whether this request counts toward the error rate.
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status_code >= 400
    }
}

/// An application error observation.
///
/// Retained in a dedicated buffer, smaller than the request buffer, so a
/// burst of errors does not evict the request history used for rate
/// computation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorSample {
    pub endpoint: String,
    pub method: String,
    /// Error class or exception name (e.g. `TimeoutError`).
    pub error_type: String,
    pub error_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl ErrorSample {
    /// Creates a sample stamped with the current time.
    #[must_use]
    pub fn new(
        endpoint: impl Into<String>,
        method: impl Into<String>,
        error_type: impl Into<String>,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            method: method.into(),
            error_type: error_type.into(),
            error_message: error_message.into(),
            stack_trace: None,
            timestamp: Utc::now(),
            user_id: None,
        }
    }

    #[must_use]
    pub fn with_stack_trace(mut self, stack_trace: impl Into<String>) -> Self {
        self.stack_trace = Some(stack_trace.into());
        self
    }

    #[must_use]
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

/// A point-in-time resource snapshot, produced only by the periodic sampler.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SystemSample {
    /// Process CPU usage as a share of the whole machine (0–100).
    pub cpu_percent: f64,
    /// System memory usage (0–100).
    pub memory_percent: f64,
    /// Resident memory of this process, in bytes.
    pub heap_used_bytes: u64,
    /// Total system memory, in bytes.
    pub heap_total_bytes: u64,
    /// Host-reported concurrent connection count at sampling time.
    pub active_connections: u64,
    pub timestamp: DateTime<Utc>,
}

impl SystemSample {
    /// An all-zero sample, used when nothing has been sampled yet.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            cpu_percent: 0.0,
            memory_percent: 0.0,
            heap_used_bytes: 0,
            heap_total_bytes: 0,
            active_connections: 0,
            timestamp: Utc::now(),
        }
    }
}

/// Live traffic statistics over the trailing windows.
///
/// Request volume and error rate use a 1-minute window; the error count uses
/// a 5-minute window over the dedicated error buffer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RealtimeStats {
    /// Requests observed in the last 60 seconds.
    pub requests_per_minute: usize,
    /// Mean response time over the 1-minute window; `0` when empty.
    pub average_response_time_ms: f64,
    /// Share of `status >= 400` requests in the 1-minute window, 0–100.
    pub error_rate_percent: f64,
    /// Errors observed in the last 5 minutes.
    pub recent_errors: usize,
    /// Distinct users with activity inside the session TTL.
    pub active_sessions: usize,
    pub timestamp: DateTime<Utc>,
}

/// Per-endpoint aggregate, recomputed from the full request buffer on query.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EndpointStats {
    pub endpoint: String,
    pub method: String,
    pub request_count: usize,
    pub average_response_time_ms: f64,
    pub error_rate_percent: f64,
    pub p95_response_time_ms: f64,
    pub p99_response_time_ms: f64,
}

/// One response-time histogram bucket.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HistogramBucket {
    /// Human-readable bucket label (e.g. `100-200ms`).
    pub range: String,
    pub count: usize,
    /// Share of all buffered samples, 0–100.
    pub percentage: f64,
}

/// Request volume for one hour of the day.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HourlyTraffic {
    /// Hour of day, 0–23.
    pub hour: u32,
    pub request_count: usize,
    /// Requests with `status >= 400` in this hour.
    pub error_count: usize,
}

/// Totals over the full retained buffers plus engine lifetime information.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MetricsSummary {
    pub total_requests: usize,
    pub total_errors: usize,
    /// Engine uptime formatted as `{d}d {h}h {m}m`.
    pub uptime: String,
    /// Busiest hourly bucket divided by 60, rounded.
    pub peak_requests_per_minute: u64,
}

/// Tri-state health verdict derived from resource thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Critical,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Degraded => write!(f, "degraded"),
            HealthStatus::Critical => write!(f, "critical"),
        }
    }
}

/// Current system health derived from the most recent [`SystemSample`].
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub uptime_seconds: u64,
    /// Uptime formatted as `{d}d {h}h {m}m`.
    pub uptime: String,
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub heap_used_bytes: u64,
    pub heap_total_bytes: u64,
    pub active_connections: u64,
    /// Opaque downstream dependency states supplied by the host
    /// (e.g. `datastore -> "connected"`), reported but not evaluated here.
    pub dependencies: HashMap<String, String>,
    pub timestamp: DateTime<Utc>,
}
