//! Active-session tracking with periodic expiry.
//!
//! Tracks the set of user identifiers with recent activity. Each attributed
//! request refreshes the user's last-seen timestamp; a user counts as active
//! until idle for longer than the configured TTL.
//!
//! Expiry is a single periodic sweep rather than one deferred removal per
//! request: behaviorally equivalent, resource-bounded, and a sweep firing
//! after a user has been re-touched simply leaves the fresh entry in place.
//! [`active_count`] additionally filters expired-but-unswept entries at read
//! time, so the reported count never depends on sweep timing.
//!
//! [`active_count`]: SessionTracker::active_count

use std::{sync::Arc, time::Duration as StdDuration};

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Concurrent set of active user identifiers with per-entry last-seen stamps.
pub struct SessionTracker {
    sessions: DashMap<String, DateTime<Utc>>,
    ttl: Duration,
}

impl SessionTracker {
    /// Creates a tracker that considers a user active for `ttl_seconds`
    /// after their most recent request.
    #[must_use]
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl: Duration::seconds(i64::try_from(ttl_seconds).unwrap_or(i64::MAX)),
        }
    }

    /// Marks a user as active now, refreshing any existing entry.
    pub fn touch(&self, user_id: &str) {
        self.sessions.insert(user_id.to_string(), Utc::now());
    }

    /// Number of users active within the TTL.
    ///
    /// Entries past the TTL are excluded even if the sweeper has not yet
    /// evicted them.
    #[must_use]
    pub fn active_count(&self) -> usize {
        let cutoff = Utc::now() - self.ttl;
        self.sessions.iter().filter(|entry| *entry.value() > cutoff).count()
    }

    /// Whether the given user is currently active.
    #[must_use]
    pub fn is_active(&self, user_id: &str) -> bool {
        let cutoff = Utc::now() - self.ttl;
        self.sessions.get(user_id).is_some_and(|entry| *entry.value() > cutoff)
    }

    /// Removes all entries idle past the TTL, returning how many were evicted.
    pub fn evict_expired(&self) -> usize {
        let cutoff = Utc::now() - self.ttl;
        let before = self.sessions.len();
        self.sessions.retain(|_, last_seen| *last_seen > cutoff);
        before - self.sessions.len()
    }

    /// Drops all entries.
    pub fn clear(&self) {
        self.sessions.clear();
    }

    /// Starts the background sweep task.
    ///
    /// Evicts expired entries every `sweep_interval` until the shutdown
    /// channel fires. Only memory is at stake here: [`active_count`] is
    /// already expiry-aware.
    ///
    /// [`active_count`]: SessionTracker::active_count
    #[must_use]
    pub fn start_sweeper(
        self: &Arc<Self>,
        sweep_interval: StdDuration,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> tokio::task::JoinHandle<()> {
        let tracker = Arc::clone(self);

        tokio::spawn(async move {
            info!(
                interval_seconds = sweep_interval.as_secs(),
                "starting session sweep task"
            );
            let mut ticker = tokio::time::interval(sweep_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let evicted = tracker.evict_expired();
                        if evicted > 0 {
                            debug!(evicted, "session sweep evicted expired entries");
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        info!("session sweeper shutting down");
                        break;
                    }
                }
            }
        })
    }
}
