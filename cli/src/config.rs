//! Workload configuration file handling
//!
//! The YAML file names the service endpoints and the workload shape; CLI
//! flags override the workload values. The result is one immutable
//! `WorkloadConfig` handed to the controller; nothing here is global or
//! mutated after load.

use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use ory_bench_core::WorkloadConfig;

/// Parsed workload configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Hydra endpoints.
    #[serde(default)]
    pub hydra: EndpointPair,
    /// Kratos endpoints.
    #[serde(default)]
    pub kratos: EndpointPair,
    /// Keto endpoints.
    #[serde(default)]
    pub keto: KetoEndpoints,
    /// Workload shape defaults.
    #[serde(default)]
    pub workload: WorkloadSection,
}

/// Admin/public endpoint pair used by Hydra and Kratos.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EndpointPair {
    /// Admin API base URL.
    pub admin_api: Option<String>,
    /// Public API base URL.
    pub public_api: Option<String>,
}

/// Keto splits its API by operation rather than audience.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KetoEndpoints {
    /// Write API base URL.
    pub write_api: Option<String>,
    /// Read API base URL.
    pub read_api: Option<String>,
}

/// Workload values from the file, overridable per flag.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkloadSection {
    /// Read/write ratio (readers per writer, fan-out per write).
    #[serde(default = "default_read_ratio")]
    pub read_ratio: usize,
    /// Run duration in seconds.
    #[serde(default = "default_duration_sec")]
    pub duration_sec: u64,
}

fn default_read_ratio() -> usize {
    10
}

fn default_duration_sec() -> u64 {
    60
}

impl Default for WorkloadSection {
    fn default() -> Self {
        Self {
            read_ratio: default_read_ratio(),
            duration_sec: default_duration_sec(),
        }
    }
}

impl AppConfig {
    /// Load and parse the YAML file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Build the immutable run configuration, applying CLI overrides.
    pub fn workload(
        &self,
        duration_override: Option<u64>,
        ratio_override: Option<usize>,
        dry_run: bool,
    ) -> WorkloadConfig {
        let duration_sec = duration_override.unwrap_or(self.workload.duration_sec);
        let read_ratio = ratio_override.unwrap_or(self.workload.read_ratio);
        WorkloadConfig::new(Duration::from_secs(duration_sec), read_ratio).with_dry_run(dry_run)
    }

    /// Hydra (admin, public) endpoints, required unless dry-running.
    pub fn hydra_endpoints(&self, dry_run: bool) -> Result<(String, String)> {
        Ok((
            require(&self.hydra.admin_api, "hydra admin_api", dry_run)?,
            require(&self.hydra.public_api, "hydra public_api", dry_run)?,
        ))
    }

    /// Kratos (admin, public) endpoints, required unless dry-running.
    pub fn kratos_endpoints(&self, dry_run: bool) -> Result<(String, String)> {
        Ok((
            require(&self.kratos.admin_api, "kratos admin_api", dry_run)?,
            require(&self.kratos.public_api, "kratos public_api", dry_run)?,
        ))
    }

    /// Keto (write, read) endpoints, required unless dry-running.
    pub fn keto_endpoints(&self, dry_run: bool) -> Result<(String, String)> {
        Ok((
            require(&self.keto.write_api, "keto write_api", dry_run)?,
            require(&self.keto.read_api, "keto read_api", dry_run)?,
        ))
    }
}

// Dry runs never dereference an endpoint, so a missing one is only fatal
// for live runs.
fn require(value: &Option<String>, what: &str, dry_run: bool) -> Result<String> {
    match value {
        Some(value) => Ok(value.clone()),
        None if dry_run => Ok(String::new()),
        None => Err(anyhow!("{what} endpoint is missing from the workload config")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_CONFIG: &str = r#"
hydra:
  admin_api: "http://localhost:4445"
  public_api: "http://localhost:4444"
kratos:
  admin_api: "http://localhost:4434"
  public_api: "http://localhost:4433"
keto:
  write_api: "http://localhost:4467"
  read_api: "http://localhost:4466"
workload:
  read_ratio: 100
  duration_sec: 120
"#;

    #[test]
    fn test_parse_full_config() {
        let config: AppConfig = serde_yaml::from_str(FULL_CONFIG).unwrap();
        assert_eq!(config.hydra.admin_api.as_deref(), Some("http://localhost:4445"));
        assert_eq!(config.keto.read_api.as_deref(), Some("http://localhost:4466"));
        assert_eq!(config.workload.read_ratio, 100);
        assert_eq!(config.workload.duration_sec, 120);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: AppConfig = serde_yaml::from_str("workload:\n  read_ratio: 5\n").unwrap();
        assert!(config.hydra.admin_api.is_none());
        assert_eq!(config.workload.read_ratio, 5);
        assert_eq!(config.workload.duration_sec, 60);
    }

    #[test]
    fn test_cli_overrides_win() {
        let config: AppConfig = serde_yaml::from_str(FULL_CONFIG).unwrap();
        let workload = config.workload(Some(30), Some(7), false);
        assert_eq!(workload.duration, Duration::from_secs(30));
        assert_eq!(workload.read_ratio, 7);
        assert!(!workload.dry_run);
    }

    #[test]
    fn test_file_values_used_without_overrides() {
        let config: AppConfig = serde_yaml::from_str(FULL_CONFIG).unwrap();
        let workload = config.workload(None, None, true);
        assert_eq!(workload.duration, Duration::from_secs(120));
        assert_eq!(workload.read_ratio, 100);
        assert!(workload.dry_run);
    }

    #[test]
    fn test_missing_endpoint_is_fatal_for_live_runs() {
        let config = AppConfig::default();
        let err = config.hydra_endpoints(false).unwrap_err();
        assert!(err.to_string().contains("hydra admin_api"));

        let err = config.keto_endpoints(false).unwrap_err();
        assert!(err.to_string().contains("keto write_api"));
    }

    #[test]
    fn test_missing_endpoint_tolerated_for_dry_runs() {
        let config = AppConfig::default();
        assert!(config.hydra_endpoints(true).is_ok());
        assert!(config.kratos_endpoints(true).is_ok());
        assert!(config.keto_endpoints(true).is_ok());
    }
}
