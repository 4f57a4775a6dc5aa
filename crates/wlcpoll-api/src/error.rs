use thiserror::Error;

/// Top-level error type for the `wlcpoll-api` crate.
///
/// Covers every failure mode of the transport: session setup, malformed
/// group identifiers, SNMP protocol failures, and agent-reported errors.
/// `wlcpoll-core` treats all of these as a missing metric group, except
/// for [`Error::SessionOpen`], which is fatal at startup.
#[derive(Debug, Error)]
pub enum Error {
    // ── Setup ───────────────────────────────────────────────────────
    /// The UDP session to the agent could not be created.
    #[error("Cannot open SNMP session to {target}: {source}")]
    SessionOpen {
        target: String,
        #[source]
        source: std::io::Error,
    },

    /// A metric-group identifier is not a dotted numeric path.
    #[error("Invalid metric identifier '{identifier}': {reason}")]
    InvalidIdentifier { identifier: String, reason: String },

    // ── Protocol ────────────────────────────────────────────────────
    /// No response arrived within the configured timeout (after retries).
    #[error("SNMP request for {group} timed out after {attempts} attempt(s)")]
    Timeout { group: String, attempts: u32 },

    /// The SNMP library failed to encode, send, or decode a PDU.
    #[error("SNMP protocol error while walking {group}: {detail}")]
    Protocol { group: String, detail: String },

    /// The agent answered with a non-zero error-status.
    #[error("Agent returned error-status {status} (index {index}) for {group}")]
    ErrorStatus {
        group: String,
        status: u32,
        index: u32,
    },

    // ── Internal ────────────────────────────────────────────────────
    /// The session mutex was poisoned by a panicking walker.
    #[error("SNMP session is unusable after a previous panic")]
    SessionPoisoned,
}

impl Error {
    /// Returns `true` if retrying the same request might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns `true` if this error means no cycle could ever succeed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::SessionOpen { .. })
    }
}
