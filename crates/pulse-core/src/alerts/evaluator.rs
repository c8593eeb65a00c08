//! Threshold evaluation at ingestion and sampling time.
//!
//! Unlike a background rule scanner, these checks run inline: the response
//! time check on every recorded request, the error-rate check on every
//! recorded error, and the resource checks on every system sample. Each
//! check is a read of the current threshold snapshot plus at most one
//! registry insert, so the ingestion path stays cheap.

use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::info;

use super::{manager::AlertManager, types::AlertKind};
use crate::{
    config::{AlertThresholds, ThresholdOverrides},
    types::{RequestSample, SystemSample},
};

/// Minimum in-window request count before the error rate is evaluated.
/// Below this, a couple of failures would dominate the rate and cause
/// alert noise on low traffic.
const ERROR_RATE_MIN_REQUESTS: usize = 10;

/// Runs threshold checks and raises alerts through the [`AlertManager`].
///
/// Thresholds are held in an [`ArcSwap`] so reads on the ingestion path are
/// lock-free and a partial override replaces the whole snapshot atomically.
pub struct ThresholdEvaluator {
    manager: Arc<AlertManager>,
    thresholds: ArcSwap<AlertThresholds>,
}

impl ThresholdEvaluator {
    #[must_use]
    pub fn new(manager: Arc<AlertManager>, thresholds: AlertThresholds) -> Self {
        Self { manager, thresholds: ArcSwap::from_pointee(thresholds) }
    }

    /// Current threshold snapshot.
    #[must_use]
    pub fn thresholds(&self) -> Arc<AlertThresholds> {
        self.thresholds.load_full()
    }

    /// Merges a partial override over the current thresholds and installs
    /// the result, returning the new snapshot.
    pub fn update_thresholds(&self, overrides: &ThresholdOverrides) -> AlertThresholds {
        let merged = self.thresholds.load().merged(overrides);
        self.thresholds.store(Arc::new(merged.clone()));

        info!(
            error_rate_percent = merged.error_rate_percent,
            response_time_ms = merged.response_time_ms,
            cpu_percent = merged.cpu_percent,
            memory_percent = merged.memory_percent,
            "alert thresholds updated"
        );

        merged
    }

    /// Checks a single request's response time against the threshold.
    pub fn check_response_time(&self, sample: &RequestSample) {
        let thresholds = self.thresholds.load();
        if sample.response_time_ms > thresholds.response_time_ms {
            self.manager.raise(
                AlertKind::ResponseTime,
                sample.response_time_ms,
                thresholds.response_time_ms,
                format!(
                    "response time {:.0}ms exceeded {:.0}ms on {} {}",
                    sample.response_time_ms,
                    thresholds.response_time_ms,
                    sample.method,
                    sample.endpoint
                ),
                format!(
                    "Response time of {:.0} ms on {} {} exceeded the configured threshold of {:.0} ms",
                    sample.response_time_ms,
                    sample.method,
                    sample.endpoint,
                    thresholds.response_time_ms
                ),
            );
        }
    }

    /// Checks the trailing-window error rate against the threshold.
    ///
    /// Skipped entirely unless more than [`ERROR_RATE_MIN_REQUESTS`] requests
    /// fall inside the window.
    pub fn check_error_rate(&self, in_window_requests: usize, error_rate_percent: f64) {
        if in_window_requests <= ERROR_RATE_MIN_REQUESTS {
            return;
        }

        let thresholds = self.thresholds.load();
        if error_rate_percent > thresholds.error_rate_percent {
            self.manager.raise(
                AlertKind::ErrorRate,
                error_rate_percent,
                thresholds.error_rate_percent,
                format!(
                    "error rate {:.1}% exceeded {:.1}% over the last minute ({} requests)",
                    error_rate_percent, thresholds.error_rate_percent, in_window_requests
                ),
                format!(
                    "Error rate of {:.1}% over the last minute exceeded the configured threshold of {:.1}%",
                    error_rate_percent, thresholds.error_rate_percent
                ),
            );
        }
    }

    /// Checks a system sample's CPU and memory usage against their thresholds.
    pub fn check_system(&self, sample: &SystemSample) {
        let thresholds = self.thresholds.load();

        if sample.cpu_percent > thresholds.cpu_percent {
            self.manager.raise(
                AlertKind::Cpu,
                sample.cpu_percent,
                thresholds.cpu_percent,
                format!(
                    "cpu usage {:.1}% exceeded {:.1}%",
                    sample.cpu_percent, thresholds.cpu_percent
                ),
                format!(
                    "CPU usage of {:.1}% exceeded the configured threshold of {:.1}%",
                    sample.cpu_percent, thresholds.cpu_percent
                ),
            );
        }

        if sample.memory_percent > thresholds.memory_percent {
            self.manager.raise(
                AlertKind::Memory,
                sample.memory_percent,
                thresholds.memory_percent,
                format!(
                    "memory usage {:.1}% exceeded {:.1}%",
                    sample.memory_percent, thresholds.memory_percent
                ),
                format!(
                    "Memory usage of {:.1}% exceeded the configured threshold of {:.1}%",
                    sample.memory_percent, thresholds.memory_percent
                ),
            );
        }
    }
}
