//! Threshold alerting with deduplication and explicit resolution.
//!
//! ## Components
//!
//! - **[`AlertManager`]**: insertion-ordered alert registry with same-kind
//!   hysteresis and id-keyed resolution
//! - **[`ThresholdEvaluator`]**: the threshold checks run at ingestion and
//!   sampling time, with runtime-replaceable thresholds
//! - **[`Alert`]**: individual alert instances
//! - **[`AlertKind`] / [`AlertSeverity`]**: alert classification
//!
//! ## Lifecycle
//!
//! An alert moves `none -> active -> resolved` and never back. Creation is
//! suppressed while an unresolved alert of the same kind exists within the
//! 5-minute hysteresis window; resolution happens only by explicit id and
//! resolving an unknown or already-resolved id reports failure to the
//! caller rather than raising an error.
//!
//! ## Usage
//!
//! ```rust
//! use pulse_core::alerts::{AlertKind, AlertManager};
//!
//! let manager = AlertManager::new();
//!
//! let alert = manager
//!     .raise(
//!         AlertKind::ResponseTime,
//!         2400.0,
//!         1000.0,
//!         "response time 2400ms exceeded 1000ms".to_string(),
//!         "Response time of 2400 ms exceeded the configured threshold of 1000 ms".to_string(),
//!     )
//!     .expect("first breach creates an alert");
//!
//! assert!(manager.resolve(&alert.id));
//! assert!(!manager.resolve(&alert.id)); // already resolved
//! ```

pub mod evaluator;
pub mod manager;
pub mod types;

pub use evaluator::ThresholdEvaluator;
pub use manager::AlertManager;
pub use types::{Alert, AlertKind, AlertSeverity};
