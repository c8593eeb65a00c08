//! Health verdict derivation.
//!
//! Combines the most recent system sample with the configured thresholds
//! into a tri-state verdict. A missing sample (nothing sampled yet)
//! evaluates as all-zero, which reads as healthy.

use std::collections::HashMap;

use chrono::Utc;

use crate::{
    config::AlertThresholds,
    types::{HealthReport, HealthStatus, SystemSample},
};

/// Fraction of a threshold at which the verdict degrades before going
/// critical.
const DEGRADED_FRACTION: f64 = 0.8;

/// Derives the verdict alone, without building a full report.
#[must_use]
pub fn status_for(sample: &SystemSample, thresholds: &AlertThresholds) -> HealthStatus {
    if sample.cpu_percent > thresholds.cpu_percent ||
        sample.memory_percent > thresholds.memory_percent
    {
        HealthStatus::Critical
    } else if sample.cpu_percent > thresholds.cpu_percent * DEGRADED_FRACTION ||
        sample.memory_percent > thresholds.memory_percent * DEGRADED_FRACTION
    {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    }
}

/// Builds a [`HealthReport`] from the latest sample, thresholds, uptime, and
/// host-supplied dependency states.
///
/// Dependency states are opaque strings (e.g. `datastore -> "connected"`)
/// passed through untouched; this engine does not probe downstream systems.
#[must_use]
pub fn evaluate(
    latest: Option<&SystemSample>,
    thresholds: &AlertThresholds,
    uptime_seconds: u64,
    uptime: String,
    dependencies: HashMap<String, String>,
) -> HealthReport {
    let fallback = SystemSample::empty();
    let sample = latest.unwrap_or(&fallback);

    HealthReport {
        status: status_for(sample, thresholds),
        uptime_seconds,
        uptime,
        cpu_percent: sample.cpu_percent,
        memory_percent: sample.memory_percent,
        heap_used_bytes: sample.heap_used_bytes,
        heap_total_bytes: sample.heap_total_bytes,
        active_connections: sample.active_connections,
        dependencies,
        timestamp: Utc::now(),
    }
}
