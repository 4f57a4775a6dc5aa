// ── Core error types ──
//
// Two tiers. `ReadingError` describes why a single reading was dropped;
// the aggregator absorbs it and logs a warning. `CoreError` is what
// callers see: a failed group fetch, a failed snapshot transaction, or a
// startup problem.

use thiserror::Error;

use wlcpoll_api::ValueType;

use crate::model::{EntityKey, EntityKind};

/// Why a decode function refused a raw value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("declared type {0} is not accepted")]
    TypeMismatch(ValueType),

    #[error("{0}")]
    InvalidValue(String),
}

/// Why one reading contributed nothing to the cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadingError {
    #[error("no catalog entry matches {identifier}")]
    UnknownMetric { identifier: String },

    #[error("malformed index '{index}': {reason}")]
    MalformedIndex { index: String, reason: String },

    #[error("declared type {declared} is not accepted for {metric}")]
    TypeMismatch {
        metric: &'static str,
        declared: ValueType,
    },

    #[error("invalid {metric} value: {reason}")]
    InvalidValue { metric: &'static str, reason: String },

    #[error("{attempted} reading for key {key} collides with a {bound} record this cycle")]
    KindConflict {
        key: EntityKey,
        bound: EntityKind,
        attempted: EntityKind,
    },
}

impl ReadingError {
    pub(crate) fn from_decode(metric: &'static str, err: DecodeError) -> Self {
        match err {
            DecodeError::TypeMismatch(declared) => Self::TypeMismatch { metric, declared },
            DecodeError::InvalidValue(reason) => Self::InvalidValue { metric, reason },
        }
    }

    pub(crate) fn malformed(index: &str, reason: impl Into<String>) -> Self {
        Self::MalformedIndex {
            index: index.to_owned(),
            reason: reason.into(),
        }
    }

    /// Short machine-friendly label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownMetric { .. } => "unknown_metric",
            Self::MalformedIndex { .. } => "malformed_index",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::InvalidValue { .. } => "invalid_value",
            Self::KindConflict { .. } => "kind_conflict",
        }
    }
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Transport ────────────────────────────────────────────────────
    #[error("Transport error: {0}")]
    Transport(#[from] wlcpoll_api::Error),

    // ── Storage ──────────────────────────────────────────────────────
    #[error("Snapshot store error: {0}")]
    Persistence(#[from] rusqlite::Error),

    #[error("Cannot prepare database directory {path}: {source}")]
    StorageIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ── Setup ────────────────────────────────────────────────────────
    #[error("Invalid metric catalog: {message}")]
    Catalog { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Startup-time failures that make every future cycle fail too.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_fatal(),
            Self::StorageIo { .. } | Self::Catalog { .. } | Self::Config { .. } => true,
            Self::Persistence(_) | Self::Internal(_) => false,
        }
    }
}
