//! Engine configuration with layered loading.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//!
//! 1. **Compiled defaults**: hardcoded in the struct `Default` implementations
//! 2. **Config file**: TOML file specified by the `PULSE_CONFIG` env var
//! 3. **Environment variables**: `PULSE_*` env vars override specific fields
//!
//! # Validation
//!
//! Configuration is validated at load time. Invalid configurations (zero
//! buffer capacities, zero intervals, non-positive thresholds) return errors
//! rather than failing silently.
//!
//! # Example
//!
//! ```toml
//! request_buffer_capacity = 2000
//! sample_interval_seconds = 30
//!
//! [thresholds]
//! error_rate_percent = 10.0
//! response_time_ms = 500.0
//! ```

use std::path::Path;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// Alert threshold configuration, replaceable at runtime via partial merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(default)]
pub struct AlertThresholds {
    /// Windowed error rate (0–100) above which an error-rate alert fires.
    /// Defaults to `5`.
    pub error_rate_percent: f64,

    /// Per-request response time in milliseconds above which a
    /// response-time alert fires. Defaults to `1000`.
    pub response_time_ms: f64,

    /// CPU usage (0–100) above which a CPU alert fires. Defaults to `80`.
    pub cpu_percent: f64,

    /// Memory usage (0–100) above which a memory alert fires. Defaults to `85`.
    pub memory_percent: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            error_rate_percent: 5.0,
            response_time_ms: 1000.0,
            cpu_percent: 80.0,
            memory_percent: 85.0,
        }
    }
}

impl AlertThresholds {
    /// Returns a copy with the fields named in `overrides` replaced and all
    /// other fields unchanged.
    #[must_use]
    pub fn merged(&self, overrides: &ThresholdOverrides) -> Self {
        Self {
            error_rate_percent: overrides.error_rate_percent.unwrap_or(self.error_rate_percent),
            response_time_ms: overrides.response_time_ms.unwrap_or(self.response_time_ms),
            cpu_percent: overrides.cpu_percent.unwrap_or(self.cpu_percent),
            memory_percent: overrides.memory_percent.unwrap_or(self.memory_percent),
        }
    }
}

/// Partial threshold override, merged over the current thresholds.
///
/// Absent fields keep their current values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(default)]
pub struct ThresholdOverrides {
    pub error_rate_percent: Option<f64>,
    pub response_time_ms: Option<f64>,
    pub cpu_percent: Option<f64>,
    pub memory_percent: Option<f64>,
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Request ring buffer capacity. Defaults to `1000`.
    pub request_buffer_capacity: usize,

    /// Error ring buffer capacity, kept smaller than the request buffer so
    /// an error burst cannot evict the history the rate computation needs.
    /// Defaults to `100`.
    pub error_buffer_capacity: usize,

    /// System sample ring buffer capacity. Defaults to `60`.
    pub system_buffer_capacity: usize,

    /// Interval between periodic system samples, in seconds. Defaults to `60`.
    pub sample_interval_seconds: u64,

    /// How long a user counts as active after their last request, in seconds.
    /// Defaults to `300`.
    pub session_ttl_seconds: u64,

    /// Interval between session-expiry sweeps, in seconds. Defaults to `30`.
    pub session_sweep_interval_seconds: u64,

    /// Alert thresholds applied at ingestion and sampling time.
    pub thresholds: AlertThresholds,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            request_buffer_capacity: 1000,
            error_buffer_capacity: 100,
            system_buffer_capacity: 60,
            sample_interval_seconds: 60,
            session_ttl_seconds: 300,
            session_sweep_interval_seconds: 30,
            thresholds: AlertThresholds::default(),
        }
    }
}

/// Errors produced while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl EngineConfig {
    /// Loads configuration from defaults, the file named by `PULSE_CONFIG`
    /// (if set), and `PULSE_*` environment variables, then validates it.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read or the merged
    /// configuration fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Ok(path) = std::env::var("PULSE_CONFIG") {
            builder = builder.add_source(File::from(Path::new(&path)));
        }

        let settings = builder
            .add_source(Environment::with_prefix("PULSE").separator("__").try_parsing(true))
            .build()?;

        let engine_config: EngineConfig = settings.try_deserialize()?;
        engine_config.validate()?;
        Ok(engine_config)
    }

    /// Checks structural invariants the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_buffer_capacity == 0 {
            return Err(ConfigError::Invalid(
                "request_buffer_capacity must be greater than 0".to_string(),
            ));
        }
        if self.error_buffer_capacity == 0 {
            return Err(ConfigError::Invalid(
                "error_buffer_capacity must be greater than 0".to_string(),
            ));
        }
        if self.system_buffer_capacity == 0 {
            return Err(ConfigError::Invalid(
                "system_buffer_capacity must be greater than 0".to_string(),
            ));
        }
        if self.sample_interval_seconds == 0 {
            return Err(ConfigError::Invalid(
                "sample_interval_seconds must be greater than 0".to_string(),
            ));
        }
        if self.session_ttl_seconds == 0 {
            return Err(ConfigError::Invalid(
                "session_ttl_seconds must be greater than 0".to_string(),
            ));
        }
        if self.session_sweep_interval_seconds == 0 {
            return Err(ConfigError::Invalid(
                "session_sweep_interval_seconds must be greater than 0".to_string(),
            ));
        }

        let thresholds = &self.thresholds;
        if thresholds.error_rate_percent <= 0.0 ||
            thresholds.response_time_ms <= 0.0 ||
            thresholds.cpu_percent <= 0.0 ||
            thresholds.memory_percent <= 0.0
        {
            return Err(ConfigError::Invalid(
                "alert thresholds must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
