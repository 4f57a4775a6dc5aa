//! Clap derive structures for the `wlcpoll` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// wlcpoll -- SNMP poller for wireless LAN controllers
#[derive(Debug, Parser)]
#[command(
    name = "wlcpoll",
    version,
    about = "Poll a wireless LAN controller and store AP and client snapshots",
    long_about = "Walks the controller's access point and mobile station tables over SNMP\n\
        on a fixed interval, rebuilds per-AP and per-client records, and writes\n\
        each poll as one timestamped snapshot to a SQLite database.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config dir)
    #[arg(long, env = "WLCPOLL_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Controller hostname or IP (overrides config)
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Controller SNMP port
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// SNMP read community (overrides env, keyring and config)
    #[arg(long, global = true)]
    pub community: Option<String>,

    /// SQLite database file
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Time between polls, e.g. "10s" or "1m"
    #[arg(long, global = true, value_parser = humantime::parse_duration)]
    pub interval: Option<Duration>,

    /// SNMP response timeout, e.g. "2s" or "500ms"
    #[arg(long, global = true, value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
    pub output: OutputFormat,

    /// Log record format (logs go to stderr)
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output, Log & Color Enums ────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per event
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Poll on a fixed interval until interrupted
    Run,

    /// Run exactly one poll cycle
    Poll(PollArgs),

    /// Create the snapshot tables
    Schema(SchemaArgs),

    /// Manage the configuration file
    #[command(alias = "cfg")]
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Poll / Schema ────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PollArgs {
    /// Fetch and rebuild records but skip the database; print them instead
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
pub struct SchemaArgs {
    /// Print the DDL instead of applying it
    #[arg(long)]
    pub print: bool,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration (community redacted)
    Show,

    /// Print the config file path
    Path,

    /// Write a config file from defaults and the given flags
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Store the read community in the system keyring (read from stdin)
    SetCommunity,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
