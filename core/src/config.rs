//! Workload configuration types

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration for a single workload run.
///
/// Constructed once before the run starts and passed by value into the
/// controller; nothing mutates it afterwards. `read_ratio` doubles as the
/// fan-out multiple (read descriptors queued per successful write) and the
/// number of read consumer tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadConfig {
    /// Wall-clock duration of the run.
    pub duration: Duration,

    /// Read/check operations generated per write, and consumer task count.
    pub read_ratio: usize,

    /// When set, the run keeps its timing and worker structure but performs
    /// no external calls and records no outcomes.
    #[serde(default)]
    pub dry_run: bool,
}

impl WorkloadConfig {
    /// Create a new config with the given duration and read ratio.
    pub fn new(duration: Duration, read_ratio: usize) -> Self {
        Self {
            duration,
            read_ratio,
            dry_run: false,
        }
    }

    /// Set dry-run mode.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.duration.is_zero() {
            return Err(ConfigError::InvalidDuration(
                "duration must be non-zero".into(),
            ));
        }

        if self.read_ratio == 0 {
            return Err(ConfigError::InvalidReadRatio(
                "read ratio must be at least 1".into(),
            ));
        }

        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid run duration
    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    /// Invalid read ratio
    #[error("invalid read ratio: {0}")]
    InvalidReadRatio(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_defaults_to_live_mode() {
        let config = WorkloadConfig::new(Duration::from_secs(60), 10);
        assert_eq!(config.duration, Duration::from_secs(60));
        assert_eq!(config.read_ratio, 10);
        assert!(!config.dry_run);
    }

    #[test]
    fn test_with_dry_run() {
        let config = WorkloadConfig::new(Duration::from_secs(1), 1).with_dry_run(true);
        assert!(config.dry_run);
    }

    #[test]
    fn test_validation_valid() {
        let config = WorkloadConfig::new(Duration::from_secs(30), 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_zero_duration() {
        let config = WorkloadConfig::new(Duration::ZERO, 10);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_validation_zero_read_ratio() {
        let config = WorkloadConfig::new(Duration::from_secs(30), 0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidReadRatio(_))
        ));
    }

    #[test]
    fn test_config_serialization() {
        let config = WorkloadConfig::new(Duration::from_secs(5), 3).with_dry_run(true);

        let json = serde_json::to_string(&config).unwrap();
        let deserialized: WorkloadConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.duration, Duration::from_secs(5));
        assert_eq!(deserialized.read_ratio, 3);
        assert!(deserialized.dry_run);
    }
}
