//! Alert type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Condition category an alert was raised for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Windowed error rate exceeded its threshold.
    ErrorRate,
    /// A single request's response time exceeded its threshold.
    ResponseTime,
    /// CPU usage exceeded its threshold.
    Cpu,
    /// Memory usage exceeded its threshold.
    Memory,
    /// Host-detected downtime; no engine-side check produces this kind.
    Downtime,
}

impl AlertKind {
    /// Stable identifier used in alert ids and log fields.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::ErrorRate => "error_rate",
            AlertKind::ResponseTime => "response_time",
            AlertKind::Cpu => "cpu",
            AlertKind::Memory => "memory",
            AlertKind::Downtime => "downtime",
        }
    }
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity level of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    /// Threshold breached.
    Warning,
    /// Threshold breached by at least 2x.
    Critical,
}

impl AlertSeverity {
    /// Derives severity from how far the observed value exceeds the threshold.
    #[must_use]
    pub fn for_breach(value: f64, threshold: f64) -> Self {
        if value >= threshold * 2.0 {
            AlertSeverity::Critical
        } else {
            AlertSeverity::Warning
        }
    }
}

/// An active or historical alert instance.
///
/// Created by [`AlertManager::raise`](super::AlertManager::raise); mutated
/// only by resolution. Retained in the registry until the process exits —
/// bounding registry growth through periodic resolution is the caller's
/// responsibility.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Alert {
    /// Unique id derived from the kind and creation time
    /// (e.g. `response_time-1717430400123`).
    pub id: String,
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    /// Terse, log-style description of the breach.
    pub message: String,
    /// Full human-readable sentence describing the breach.
    pub message_localized: String,
    /// The observed value that breached the threshold.
    pub value: f64,
    /// The threshold in force when the alert was created.
    pub threshold: f64,
    pub timestamp: DateTime<Utc>,
    pub resolved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Alert {
    /// Creates a new active alert stamped with the current time.
    #[must_use]
    pub fn new(
        kind: AlertKind,
        severity: AlertSeverity,
        message: String,
        message_localized: String,
        value: f64,
        threshold: f64,
    ) -> Self {
        let timestamp = Utc::now();
        Self {
            id: format!("{}-{}", kind.as_str(), timestamp.timestamp_millis()),
            kind,
            severity,
            message,
            message_localized,
            value,
            threshold,
            timestamp,
            resolved: false,
            resolved_at: None,
        }
    }

    /// Marks the alert as resolved. Resolution is terminal and idempotent.
    pub fn resolve(&mut self) {
        if !self.resolved {
            self.resolved = true;
            self.resolved_at = Some(Utc::now());
        }
    }

    /// Whether the alert has not yet been resolved.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.resolved
    }
}
