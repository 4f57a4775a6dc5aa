//! Configuration for the wlcpoll poller.
//!
//! TOML file + `WLCPOLL_` environment overrides, SNMP community
//! resolution (env var + keyring + plaintext), and translation to
//! `wlcpoll_core::PollerConfig`. The CLI layers its flag overrides on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use wlcpoll_core::{PollerConfig, TransportConfig};

/// Keyring service name for stored communities.
pub const KEYRING_SERVICE: &str = "wlcpoll";

/// SNMP's well-known read community, used when nothing else is set.
pub const DEFAULT_COMMUNITY: &str = "public";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub controller: ControllerSection,

    #[serde(default)]
    pub poll: PollSection,

    #[serde(default)]
    pub storage: StorageSection,
}

/// The polled SNMP agent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ControllerSection {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Read community (plaintext, lowest priority).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community: Option<String>,

    /// Environment variable holding the community.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community_env: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_retries")]
    pub retries: u32,

    #[serde(default = "default_max_repetitions")]
    pub max_repetitions: u32,
}

impl Default for ControllerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            community: None,
            community_env: None,
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
            max_repetitions: default_max_repetitions(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    161
}
fn default_timeout_secs() -> u64 {
    2
}
fn default_retries() -> u32 {
    1
}
fn default_max_repetitions() -> u32 {
    25
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PollSection {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Metric groups to walk; empty walks every known metric.
    #[serde(default)]
    pub groups: Vec<String>,
}

impl Default for PollSection {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            groups: Vec::new(),
        }
    }
}

fn default_interval_secs() -> u64 {
    10
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StorageSection {
    #[serde(default = "default_database")]
    pub database: PathBuf,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            database: default_database(),
        }
    }
}

fn default_database() -> PathBuf {
    PathBuf::from("wifi.db")
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("", "", "wlcpoll").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("wlcpoll");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Layered figment: defaults, then the TOML file, then `WLCPOLL_*` env.
pub fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("WLCPOLL_").split("__"))
}

/// Load the config at `path`. A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = figment(path).extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Community resolution ────────────────────────────────────────────

fn keyring_entry(host: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{host}/community"))
}

/// Resolve the read community: `community_env` variable, then the
/// system keyring, then plaintext, then [`DEFAULT_COMMUNITY`].
pub fn resolve_community(section: &ControllerSection) -> SecretString {
    resolve_community_with(section, |name| std::env::var(name).ok(), |host| {
        keyring_entry(host).and_then(|e| e.get_password()).ok()
    })
}

fn resolve_community_with(
    section: &ControllerSection,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> SecretString {
    // 1. Named env var
    if let Some(value) = section.community_env.as_deref().and_then(&env) {
        return SecretString::from(value);
    }

    // 2. System keyring
    if let Some(value) = keyring(&section.host) {
        return SecretString::from(value);
    }

    // 3. Plaintext in config
    if let Some(ref value) = section.community {
        return SecretString::from(value.clone());
    }

    SecretString::from(DEFAULT_COMMUNITY.to_owned())
}

/// Store a community for `host` in the system keyring.
pub fn store_community(host: &str, community: &SecretString) -> Result<(), ConfigError> {
    keyring_entry(host)?.set_password(community.expose_secret())?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// `host:port`, bracketing bare IPv6 literals.
pub fn agent_target(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.controller.host.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "controller.host".into(),
                reason: "must not be empty".into(),
            });
        }
        if self.controller.timeout_secs == 0 {
            return Err(ConfigError::Validation {
                field: "controller.timeout_secs".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.controller.max_repetitions == 0 {
            return Err(ConfigError::Validation {
                field: "controller.max_repetitions".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.poll.interval_secs == 0 {
            return Err(ConfigError::Validation {
                field: "poll.interval_secs".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.storage.database.as_os_str().is_empty() {
            return Err(ConfigError::Validation {
                field: "storage.database".into(),
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Build a `PollerConfig`, resolving the community through the
    /// credential chain.
    pub fn to_poller_config(&self) -> Result<PollerConfig, ConfigError> {
        self.to_poller_config_with(resolve_community(&self.controller))
    }

    /// Build a `PollerConfig` with an already-resolved community.
    pub fn to_poller_config_with(
        &self,
        community: SecretString,
    ) -> Result<PollerConfig, ConfigError> {
        self.validate()?;
        let c = &self.controller;
        Ok(PollerConfig {
            transport: TransportConfig {
                target: agent_target(&c.host, c.port),
                community,
                timeout: Duration::from_secs(c.timeout_secs),
                retries: c.retries,
                max_repetitions: c.max_repetitions,
            },
            interval: Duration::from_secs(self.poll.interval_secs),
            database: self.storage.database.clone(),
            groups: self.poll.groups.clone(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_mirror_the_classic_flags() {
        let cfg = Config::default();
        assert_eq!(cfg.controller.host, "127.0.0.1");
        assert_eq!(cfg.controller.port, 161);
        assert_eq!(cfg.controller.timeout_secs, 2);
        assert_eq!(cfg.poll.interval_secs, 10);
        assert_eq!(cfg.storage.database, PathBuf::from("wifi.db"));
    }

    #[test]
    fn community_chain_order() {
        let mut section = ControllerSection {
            community: Some("plain".into()),
            community_env: Some("WLC_COMMUNITY".into()),
            ..ControllerSection::default()
        };
        let env = |name: &str| (name == "WLC_COMMUNITY").then(|| "from-env".to_owned());
        let keyring = |_: &str| Some("from-keyring".to_owned());
        let none = |_: &str| None;

        let c = resolve_community_with(&section, env, keyring);
        assert_eq!(c.expose_secret(), "from-env");

        let c = resolve_community_with(&section, none, keyring);
        assert_eq!(c.expose_secret(), "from-keyring");

        let c = resolve_community_with(&section, none, none);
        assert_eq!(c.expose_secret(), "plain");

        section.community = None;
        let c = resolve_community_with(&section, none, none);
        assert_eq!(c.expose_secret(), DEFAULT_COMMUNITY);
    }

    #[test]
    fn ipv6_hosts_are_bracketed() {
        assert_eq!(agent_target("10.0.0.2", 161), "10.0.0.2:161");
        assert_eq!(agent_target("fd00::2", 1161), "[fd00::2]:1161");
        assert_eq!(agent_target("[fd00::2]", 161), "[fd00::2]:161");
    }

    #[test]
    fn poller_config_translation() {
        let cfg = Config {
            controller: ControllerSection {
                host: "wlc.example.net".into(),
                timeout_secs: 5,
                ..ControllerSection::default()
            },
            poll: PollSection {
                interval_secs: 30,
                groups: vec![".1.3.6.1.4.1.14179.2.2.1.1.3".into()],
            },
            storage: StorageSection {
                database: PathBuf::from("/var/lib/wlcpoll/wifi.db"),
            },
        };
        let poller = cfg
            .to_poller_config_with(SecretString::from("s3cret".to_owned()))
            .unwrap();
        assert_eq!(poller.transport.target, "wlc.example.net:161");
        assert_eq!(poller.transport.timeout, Duration::from_secs(5));
        assert_eq!(poller.transport.community.expose_secret(), "s3cret");
        assert_eq!(poller.interval, Duration::from_secs(30));
        assert_eq!(poller.groups.len(), 1);
    }

    #[test]
    fn zero_interval_fails_validation() {
        let mut cfg = Config::default();
        cfg.poll.interval_secs = 0;
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "poll.interval_secs"));
    }
}
