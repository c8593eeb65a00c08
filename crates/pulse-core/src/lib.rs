//! # Pulse Core
//!
//! In-process real-time metrics and alerting engine: ingests request,
//! error, and system events from a running service, maintains bounded
//! rolling history, derives live statistics, and raises deduplicated
//! threshold alerts.
//!
//! This crate provides:
//!
//! - **[`buffer`]**: fixed-capacity ring buffers backing every metric
//!   stream, oldest-out on overflow.
//!
//! - **[`metrics`]**: the [`MetricsEngine`] facade — three narrow ingestion
//!   paths plus snapshot-based query operations (real-time stats, top
//!   endpoints, histogram, hourly traffic, summary).
//!
//! - **[`alerts`]**: threshold alerting with a 5-minute same-kind
//!   hysteresis window, severity derived from breach magnitude, and an
//!   explicitly resolvable registry.
//!
//! - **[`sessions`]**: the active-user set with TTL-based expiry.
//!
//! - **[`health`]**: tri-state health verdicts from resource thresholds.
//!
//! - **[`sampler`]**: the timer-driven system resource producer.
//!
//! - **[`events`]**: synchronous observer notifications for each ingested
//!   request and error.
//!
//! - **[`config`]**: layered configuration with runtime-replaceable alert
//!   thresholds.
//!
//! ## Architecture
//!
//! ```text
//!  host hooks                 MetricsEngine                 read APIs
//!  ──────────    ┌───────────────────────────────────┐    ──────────
//!  record_request│  ┌─────────┐  ┌─────────────────┐ │ realtime_stats
//!  record_error ─┼─►│ buffers │─►│ RollingAggregate│─┼─► top_endpoints
//!       ▲        │  └─────────┘  └─────────────────┘ │ histogram / hourly
//!       │        │       │        ┌───────────────┐  │ summary / health
//!  ┌────┴─────┐  │       └───────►│ AlertManager  │──┼─► active_alerts
//!  │ Sampler  │  │                └───────────────┘  │    resolve_alert
//!  └──────────┘  │  SessionTracker    ObserverRegistry
//!                └───────────────────────────────────┘
//! ```
//!
//! Data flows one direction: ingestion fills the buffers, the aggregator
//! and alert checks read them, and query operations expose derived state.
//! The periodic sampler is the only internal producer.
//!
//! ## Ownership
//!
//! The host constructs one [`MetricsEngine`] per process and shares it as
//! `Arc<MetricsEngine>` with its request hooks and HTTP layer. Nothing here
//! persists across restarts, aggregates across instances, or delivers
//! notifications — the engine exposes computed state and emits local
//! events a caller may forward.

pub mod alerts;
pub mod buffer;
pub mod config;
pub mod events;
pub mod health;
pub mod metrics;
pub mod sampler;
pub mod sessions;
pub mod types;

pub use alerts::{Alert, AlertKind, AlertManager, AlertSeverity};
pub use buffer::RingBuffer;
pub use config::{AlertThresholds, EngineConfig, ThresholdOverrides};
pub use events::{EngineEvent, ObserverId};
pub use metrics::MetricsEngine;
pub use sampler::{SystemProbe, SystemSampler};
pub use sessions::SessionTracker;
pub use types::{
    EndpointStats, ErrorSample, HealthReport, HealthStatus, HistogramBucket, HourlyTraffic,
    MetricsSummary, RealtimeStats, RequestSample, SystemSample,
};
