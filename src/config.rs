//! Layered configuration.
//!
//! Sources, lowest priority first:
//!
//! 1. Built-in defaults
//! 2. Optional TOML file passed with `--config`
//! 3. `ECO_DASHBOARD_*` environment variables (e.g. `ECO_DASHBOARD_ENDPOINT`)
//! 4. Command-line flags, applied by the binary
//!
//! ```toml
//! endpoint = "http://localhost:8080"
//! poll_interval_ms = 5000
//! request_timeout_ms = 10000
//! verify = "every-poll"
//! log_level = "info"
//! log_file = "eco-dashboard.log"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::poller::{VerifyMode, DEFAULT_POLL_INTERVAL};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "ECO_DASHBOARD";

/// Runtime configuration for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Origin of the measurement service.
    pub endpoint: String,
    /// Refresh period in milliseconds.
    pub poll_interval_ms: u64,
    /// Per-request transport timeout in milliseconds.
    pub request_timeout_ms: u64,
    pub verify: VerifyMode,
    /// Default tracing filter; `RUST_LOG` takes precedence.
    pub log_level: String,
    /// Log destination while the terminal UI owns the screen.
    pub log_file: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            endpoint: crate::source::DEFAULT_ENDPOINT.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            request_timeout_ms: 10_000,
            verify: VerifyMode::default(),
            log_level: "info".to_string(),
            log_file: PathBuf::from("eco-dashboard.log"),
        }
    }
}

impl DashboardConfig {
    /// Load defaults, then the optional file, then the environment.
    ///
    /// The result is not validated; callers apply their own overrides first
    /// and then call [`DashboardConfig::validate`].
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let config = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .context("Failed to read configuration")?;

        config.try_deserialize().context("Invalid configuration")
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            bail!("poll_interval_ms must be greater than zero");
        }
        if self.request_timeout_ms == 0 {
            bail!("request_timeout_ms must be greater than zero");
        }
        if self.endpoint.trim().is_empty() {
            bail!("endpoint must not be empty");
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn toml_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(file, "{}", content).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.endpoint, "http://localhost:8080");
        assert_eq!(config.poll_interval(), Duration::from_millis(5000));
        assert_eq!(config.verify, VerifyMode::EveryPoll);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_file_overrides_defaults() {
        let file = toml_file(
            r#"
            endpoint = "http://api:8080"
            poll_interval_ms = 2000
            verify = "first-batch"
            "#,
        );

        let config = DashboardConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.endpoint, "http://api:8080");
        assert_eq!(config.poll_interval_ms, 2000);
        assert_eq!(config.verify, VerifyMode::FirstBatch);
        assert_eq!(config.request_timeout_ms, 10_000);
    }

    #[test]
    fn test_zero_interval_can_be_overridden() {
        let file = toml_file("poll_interval_ms = 0");
        let mut config = DashboardConfig::load(Some(file.path())).unwrap();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("poll_interval_ms"));

        config.poll_interval_ms = 1000;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(DashboardConfig::load(Some(Path::new("/nonexistent/eco.toml"))).is_err());
    }

    #[test]
    fn test_unknown_verify_mode() {
        let file = toml_file(r#"verify = "sometimes""#);
        assert!(DashboardConfig::load(Some(file.path())).is_err());
    }
}
