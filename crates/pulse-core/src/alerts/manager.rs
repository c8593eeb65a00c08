//! Alert registry with hysteresis and explicit resolution.

use chrono::{Duration, Utc};
use parking_lot::RwLock;
use tracing::{info, warn};

use super::types::{Alert, AlertKind, AlertSeverity};

/// Seconds an unresolved alert suppresses new alerts of the same kind.
const HYSTERESIS_WINDOW_SECS: i64 = 300;

/// Manages the in-memory alert registry.
///
/// Alerts are kept in insertion order and never purged automatically: the
/// registry grows until the process exits unless callers resolve alerts and
/// bound growth themselves. This differs deliberately from caps-and-evict
/// registries — an unresolved alert must stay visible however old it is.
pub struct AlertManager {
    alerts: RwLock<Vec<Alert>>,
}

impl AlertManager {
    #[must_use]
    pub fn new() -> Self {
        Self { alerts: RwLock::new(Vec::new()) }
    }

    /// Creates an alert for a threshold breach, unless suppressed.
    ///
    /// Suppression (hysteresis): if an unresolved alert of the same kind was
    /// created within the last 5 minutes, no new alert is created and `None`
    /// is returned. Severity is [`AlertSeverity::Critical`] when the observed
    /// value reaches twice the threshold, [`AlertSeverity::Warning`] otherwise.
    pub fn raise(
        &self,
        kind: AlertKind,
        value: f64,
        threshold: f64,
        message: String,
        message_localized: String,
    ) -> Option<Alert> {
        let mut alerts = self.alerts.write();

        let cutoff = Utc::now() - Duration::seconds(HYSTERESIS_WINDOW_SECS);
        let suppressed =
            alerts.iter().any(|a| a.kind == kind && !a.resolved && a.timestamp > cutoff);
        if suppressed {
            return None;
        }

        let severity = AlertSeverity::for_breach(value, threshold);
        let mut alert = Alert::new(kind, severity, message, message_localized, value, threshold);

        // Millisecond timestamps can collide when a same-kind alert is
        // resolved and re-raised within the same tick; ids must stay unique.
        let mut sequence = 1;
        while alerts.iter().any(|a| a.id == alert.id) {
            alert.id =
                format!("{}-{}-{}", kind.as_str(), alert.timestamp.timestamp_millis(), sequence);
            sequence += 1;
        }

        warn!(
            alert_id = %alert.id,
            kind = %kind,
            severity = ?severity,
            value,
            threshold,
            "alert raised"
        );

        alerts.push(alert.clone());
        Some(alert)
    }

    /// Resolves an alert by id.
    ///
    /// Returns `false` for an unknown or already-resolved id; this is a
    /// normal outcome, not an error.
    pub fn resolve(&self, alert_id: &str) -> bool {
        let mut alerts = self.alerts.write();

        match alerts.iter_mut().find(|a| a.id == alert_id) {
            Some(alert) if !alert.resolved => {
                alert.resolve();
                info!(alert_id = %alert.id, kind = %alert.kind, "alert resolved");
                true
            }
            _ => false,
        }
    }

    /// All unresolved alerts, in insertion order.
    #[must_use]
    pub fn active_alerts(&self) -> Vec<Alert> {
        self.alerts.read().iter().filter(|a| a.is_active()).cloned().collect()
    }

    /// All alerts ever raised, in insertion order.
    #[must_use]
    pub fn all_alerts(&self) -> Vec<Alert> {
        self.alerts.read().clone()
    }

    /// Looks up a single alert by id.
    #[must_use]
    pub fn get(&self, alert_id: &str) -> Option<Alert> {
        self.alerts.read().iter().find(|a| a.id == alert_id).cloned()
    }

    /// Number of unresolved alerts.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.alerts.read().iter().filter(|a| a.is_active()).count()
    }
}

impl Default for AlertManager {
    fn default() -> Self {
        Self::new()
    }
}
