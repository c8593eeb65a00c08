//! Integration and Scenario Tests for the Pulse Metrics Engine
//!
//! This crate contains cross-component test modules:
//!
//! - `engine_scenario_tests`: End-to-end ingestion and query scenarios through
//!   a single `MetricsEngine` instance
//! - `alert_lifecycle_tests`: Alert creation, deduplication, severity, and
//!   resolution driven through the ingestion paths
//! - `sampler_tests`: Periodic sampler and session sweeper behavior under a
//!   live tokio runtime
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --package tests
//! ```
//!
//! All tests run against in-memory engine instances; nothing here needs
//! external infrastructure.

#[cfg(test)]
mod engine_scenario_tests;

#[cfg(test)]
mod alert_lifecycle_tests;

#[cfg(test)]
mod sampler_tests;
