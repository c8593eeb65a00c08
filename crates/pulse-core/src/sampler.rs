//! Periodic system sampling.
//!
//! A timer-driven producer that snapshots host resources at a fixed
//! interval and feeds the result through the same ingestion path the
//! health and alert checks hang off. The sampler is the engine's only
//! internal producer; everything else is pushed by external callers.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use parking_lot::Mutex;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};
use tracing::{debug, info};

use crate::{metrics::MetricsEngine, types::SystemSample};

/// Captures [`SystemSample`]s from the host via `sysinfo`.
///
/// One `System` instance is kept across ticks so `cpu_usage()` reports a
/// rate over the elapsed interval rather than an instantaneous guess; the
/// process share is normalized by core count so 100 means the whole
/// machine.
pub struct SystemProbe {
    sys: System,
    pid: Pid,
}

impl SystemProbe {
    /// Creates a probe and takes the baseline refresh the first CPU rate
    /// needs.
    #[must_use]
    pub fn new() -> Self {
        let mut sys = System::new();
        let pid = Pid::from_u32(std::process::id());

        sys.refresh_memory();
        sys.refresh_cpu_usage();
        sys.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::new().with_cpu().with_memory(),
        );

        Self { sys, pid }
    }

    /// Takes a resource snapshot.
    ///
    /// `active_connections` is the host-reported gauge folded into the
    /// sample, since connection counts live in the host's server loop.
    pub fn sample(&mut self, active_connections: u64) -> SystemSample {
        self.sys.refresh_memory();
        self.sys.refresh_cpu_usage();
        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[self.pid]),
            true,
            ProcessRefreshKind::new().with_cpu().with_memory(),
        );

        let core_count = self.sys.cpus().len().max(1);
        let (process_cpu, process_memory) = self
            .sys
            .process(self.pid)
            .map(|p| (p.cpu_usage(), p.memory()))
            .unwrap_or((0.0, 0));

        let total_memory = self.sys.total_memory();
        let used_memory = self.sys.used_memory();

        #[allow(clippy::cast_precision_loss)]
        let cpu_percent = f64::from(process_cpu) / core_count as f64;
        #[allow(clippy::cast_precision_loss)]
        let memory_percent = if total_memory > 0 {
            used_memory as f64 / total_memory as f64 * 100.0
        } else {
            0.0
        };

        SystemSample {
            cpu_percent,
            memory_percent,
            heap_used_bytes: process_memory,
            heap_total_bytes: total_memory,
            active_connections,
            timestamp: Utc::now(),
        }
    }
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::new()
    }
}

/// Timer-driven producer feeding [`SystemSample`]s into the engine.
///
/// At most one sampling task runs per sampler: re-activating cancels and
/// replaces the prior task, deactivating cancels it, and both are safe to
/// call from any task at any time. The first sample is taken immediately
/// upon activation.
pub struct SystemSampler {
    engine: Arc<MetricsEngine>,
    interval: Duration,
    handle: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl SystemSampler {
    /// Creates a sampler using the engine's configured interval.
    #[must_use]
    pub fn new(engine: Arc<MetricsEngine>) -> Self {
        let interval = Duration::from_secs(engine.config().sample_interval_seconds);
        Self::with_interval(engine, interval)
    }

    #[must_use]
    pub fn with_interval(engine: Arc<MetricsEngine>, interval: Duration) -> Self {
        Self { engine, interval, handle: Mutex::new(None) }
    }

    /// Starts (or restarts) the sampling task.
    ///
    /// Must be called from within a tokio runtime. Any previously running
    /// task is aborted first, so exactly one timer is live afterwards; no
    /// sample is taken by a replaced task after this returns.
    pub fn activate(&self) {
        let mut guard = self.handle.lock();

        if let Some(prior) = guard.take() {
            prior.abort();
            debug!("replacing previously active sampling task");
        }

        let engine = Arc::clone(&self.engine);
        let interval = self.interval;

        *guard = Some(tokio::spawn(async move {
            let mut probe = SystemProbe::new();
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                let sample = probe.sample(engine.active_connections());
                engine.record_system_sample(sample);
            }
        }));

        info!(interval_seconds = self.interval.as_secs(), "system sampler activated");
    }

    /// Stops the sampling task. No sample is taken after this returns.
    ///
    /// Idempotent: deactivating an inactive sampler is a no-op.
    pub fn deactivate(&self) {
        if let Some(handle) = self.handle.lock().take() {
            handle.abort();
            info!("system sampler deactivated");
        }
    }

    /// Whether a sampling task is currently live.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.handle.lock().as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for SystemSampler {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.lock().take() {
            handle.abort();
        }
    }
}
