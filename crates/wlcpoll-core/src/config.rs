// ── Runtime configuration ──
//
// Resolved settings handed to the core by the CLI. File and environment
// loading live in `wlcpoll-config`; this is the validated result.

use std::path::PathBuf;
use std::time::Duration;

use wlcpoll_api::{TransportConfig, parse_identifier};

use crate::error::CoreError;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_DATABASE: &str = "wifi.db";

/// Everything needed to start polling.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub transport: TransportConfig,
    /// Time between cycle starts.
    pub interval: Duration,
    pub database: PathBuf,
    /// Metric groups to walk; empty means every catalog prefix.
    pub groups: Vec<String>,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::default(),
            interval: DEFAULT_INTERVAL,
            database: PathBuf::from(DEFAULT_DATABASE),
            groups: Vec::new(),
        }
    }
}

impl PollerConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.interval.is_zero() {
            return Err(CoreError::Config {
                message: "poll interval must be greater than zero".into(),
            });
        }
        if self.transport.timeout.is_zero() {
            return Err(CoreError::Config {
                message: "transport timeout must be greater than zero".into(),
            });
        }
        if self.transport.max_repetitions == 0 {
            return Err(CoreError::Config {
                message: "max_repetitions must be at least 1".into(),
            });
        }
        if self.database.as_os_str().is_empty() {
            return Err(CoreError::Config {
                message: "database path is empty".into(),
            });
        }
        for group in &self.groups {
            parse_identifier(group).map_err(|e| CoreError::Config {
                message: e.to_string(),
            })?;
        }
        Ok(())
    }
}
