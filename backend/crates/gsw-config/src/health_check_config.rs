use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_CHECK_INTERVAL_SECONDS, DEFAULT_ERROR_HISTORY_CAPACITY,
    DEFAULT_ERROR_PATTERNS, DEFAULT_MAX_CONSECUTIVE_FAILURES, MAX_CHECK_INTERVAL_SECONDS,
    MAX_ERROR_HISTORY_CAPACITY, MAX_MAX_CONSECUTIVE_FAILURES, MIN_CHECK_INTERVAL_SECONDS,
    MIN_ERROR_HISTORY_CAPACITY, MIN_MAX_CONSECUTIVE_FAILURES,
};

use std::time::Duration;

use serde::Deserialize;

/// Health polling and restart-threshold settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Degraded/unhealthy polls in a row before a restart cycle
    pub max_consecutive_failures: u32,
    /// Seconds between health polls
    pub check_interval_seconds: u64,
    /// Case-insensitive substrings that flag a stdout line as an error
    pub error_patterns: Vec<String>,
    /// Number of recent error lines retained
    pub error_history_capacity: usize,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            max_consecutive_failures: DEFAULT_MAX_CONSECUTIVE_FAILURES,
            check_interval_seconds: DEFAULT_CHECK_INTERVAL_SECONDS,
            error_patterns: DEFAULT_ERROR_PATTERNS.iter().map(|p| p.to_string()).collect(),
            error_history_capacity: DEFAULT_ERROR_HISTORY_CAPACITY,
        }
    }
}

impl HealthCheckConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.max_consecutive_failures < MIN_MAX_CONSECUTIVE_FAILURES
            || self.max_consecutive_failures > MAX_MAX_CONSECUTIVE_FAILURES
        {
            return Err(ConfigError::health_check(format!(
                "health_check.max_consecutive_failures must be {}-{}, got {}",
                MIN_MAX_CONSECUTIVE_FAILURES,
                MAX_MAX_CONSECUTIVE_FAILURES,
                self.max_consecutive_failures
            )));
        }

        if self.check_interval_seconds < MIN_CHECK_INTERVAL_SECONDS
            || self.check_interval_seconds > MAX_CHECK_INTERVAL_SECONDS
        {
            return Err(ConfigError::health_check(format!(
                "health_check.check_interval_seconds must be {}-{}, got {}",
                MIN_CHECK_INTERVAL_SECONDS, MAX_CHECK_INTERVAL_SECONDS, self.check_interval_seconds
            )));
        }

        if self.error_history_capacity < MIN_ERROR_HISTORY_CAPACITY
            || self.error_history_capacity > MAX_ERROR_HISTORY_CAPACITY
        {
            return Err(ConfigError::health_check(format!(
                "health_check.error_history_capacity must be {}-{}, got {}",
                MIN_ERROR_HISTORY_CAPACITY, MAX_ERROR_HISTORY_CAPACITY, self.error_history_capacity
            )));
        }

        if self.error_patterns.iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::health_check(
                "health_check.error_patterns must not contain blank entries",
            ));
        }

        Ok(())
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_seconds)
    }
}
