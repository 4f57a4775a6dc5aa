//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use wlcpoll_config::ConfigError;
use wlcpoll_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONNECTION: i32 = 7;
    pub const STORAGE: i32 = 9;
    pub const CONFIG: i32 = 10;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the SNMP agent")]
    #[diagnostic(
        code(wlcpoll::connection_failed),
        help(
            "Check the controller address and that SNMP is enabled for this host.\n\
             Try: wlcpoll poll --dry-run --host <controller> -v"
        )
    )]
    ConnectionFailed {
        #[source]
        source: wlcpoll_core::CoreError,
    },

    // ── Storage ──────────────────────────────────────────────────────
    #[error("Snapshot database error: {message}")]
    #[diagnostic(
        code(wlcpoll::storage),
        help("Check that the database path is writable: {path}")
    )]
    Storage { message: String, path: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Invalid configuration: {field}: {reason}")]
    #[diagnostic(
        code(wlcpoll::config_invalid),
        help("Fix the value in your config file or pass the matching flag.")
    )]
    InvalidConfig { field: String, reason: String },

    #[error("Configuration file already exists at {path}")]
    #[diagnostic(
        code(wlcpoll::config_exists),
        help("Use --force to overwrite it.")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(wlcpoll::config))]
    Config(Box<figment::Error>),

    #[error("Keyring error: {0}")]
    #[diagnostic(
        code(wlcpoll::keyring),
        help("Set community_env in the config file or pass --community instead.")
    )]
    Keyring(String),

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(wlcpoll::validation))]
    Validation { field: String, reason: String },

    // ── Internal ─────────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    #[diagnostic(code(wlcpoll::internal))]
    Internal(String),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(wlcpoll::render))]
    Render(String),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Storage { .. } => exit_code::STORAGE,
            Self::InvalidConfig { .. }
            | Self::ConfigExists { .. }
            | Self::Config(_)
            | Self::Keyring(_) => exit_code::CONFIG,
            Self::Validation { .. } => exit_code::USAGE,
            Self::Internal(_) | Self::Io(_) | Self::Render(_) => exit_code::GENERAL,
        }
    }

    /// Attach the database path to storage errors.
    pub fn with_database(self, database: &std::path::Path) -> Self {
        match self {
            Self::Storage { message, .. } => Self::Storage {
                message,
                path: database.display().to_string(),
            },
            other => other,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Transport(_) => Self::ConnectionFailed { source: err },

            CoreError::Persistence(e) => Self::Storage {
                message: e.to_string(),
                path: String::new(),
            },

            CoreError::StorageIo { path, source } => Self::Storage {
                message: source.to_string(),
                path,
            },

            CoreError::Catalog { message } => Self::InvalidConfig {
                field: "catalog".into(),
                reason: message,
            },

            CoreError::Config { message } => Self::InvalidConfig {
                field: "poller".into(),
                reason: message,
            },

            CoreError::Internal(message) => Self::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::InvalidConfig { field, reason },
            ConfigError::Figment(e) => Self::Config(e),
            ConfigError::Keyring(e) => Self::Keyring(e.to_string()),
            ConfigError::Serialization(e) => Self::Render(e.to_string()),
            ConfigError::Io(e) => Self::Io(e),
        }
    }
}
