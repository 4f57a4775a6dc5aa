//! CLI configuration: thin wrapper around `wlcpoll_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--host, --community, --db, etc.).

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use wlcpoll_core::PollerConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use wlcpoll_config::{Config, save_config_to, store_community};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Config file in effect: `--config` flag, else the platform path.
pub fn active_config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(wlcpoll_config::config_path)
}

/// Load the config file and apply flag overrides on top.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = wlcpoll_config::load_config_from(&active_config_path(global))?;
    apply_overrides(&mut cfg, global)?;
    Ok(cfg)
}

/// Flags win over file and environment values.
pub fn apply_overrides(cfg: &mut Config, global: &GlobalOpts) -> Result<(), CliError> {
    if let Some(ref host) = global.host {
        cfg.controller.host.clone_from(host);
    }
    if let Some(port) = global.port {
        cfg.controller.port = port;
    }
    if let Some(ref db) = global.db {
        cfg.storage.database.clone_from(db);
    }
    if let Some(interval) = global.interval {
        cfg.poll.interval_secs = whole_secs(interval);
    }
    if let Some(timeout) = global.timeout {
        cfg.controller.timeout_secs = whole_secs(timeout);
    }
    if let Some(ref community) = global.community {
        if community.is_empty() {
            return Err(CliError::Validation {
                field: "--community".into(),
                reason: "must not be empty".into(),
            });
        }
    }
    Ok(())
}

/// Non-zero sub-second durations round up to one second.
fn whole_secs(d: Duration) -> u64 {
    d.as_secs().max(u64::from(!d.is_zero()))
}

/// Resolve the full `PollerConfig` the core needs.
///
/// `--community` short-circuits the env / keyring / plaintext chain.
pub fn resolve_poller_config(global: &GlobalOpts) -> Result<PollerConfig, CliError> {
    let cfg = load(global)?;
    let mut poller = match global.community {
        Some(ref flag) => cfg.to_poller_config_with(SecretString::from(flag.clone()))?,
        None => cfg.to_poller_config()?,
    };
    // keep sub-second precision the config file cannot express
    if let Some(timeout) = global.timeout.filter(|t| !t.is_zero()) {
        poller.transport.timeout = timeout;
    }
    if let Some(interval) = global.interval.filter(|i| !i.is_zero()) {
        poller.interval = interval;
    }
    Ok(poller)
}
