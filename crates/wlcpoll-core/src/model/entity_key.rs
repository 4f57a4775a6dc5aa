// ── Entity identity ──
//
// EntityKey is the per-cycle identity of one access point or client.
// Both index encodings normalize into it, so equal byte sequences always
// produce equal keys regardless of how the agent laid out the table.
// Rows whose index arcs do not all fit in a byte keep their dotted form,
// which can never collide with a hex key.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical identity of one entity within a cycle: lowercase hex for
/// byte-valued indices, dotted decimal (leading `.`) otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityKey(String);

impl EntityKey {
    /// Build a key from raw index bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build a key from index arcs. Byte-valued arcs hex-encode exactly as
    /// [`from_bytes`](Self::from_bytes) would; any wider arc keeps the
    /// whole index as dotted decimal.
    pub fn from_arcs(arcs: &[u32]) -> Self {
        let bytes: Option<Vec<u8>> = arcs.iter().map(|&a| u8::try_from(a).ok()).collect();
        match bytes {
            Some(bytes) => Self::from_bytes(&bytes),
            None => Self(arcs.iter().map(|a| format!(".{a}")).collect()),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntityKey {
    type Err = hex::FromHexError;

    /// Accepts hex with or without `:`/`-` separators, any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !matches!(c, ':' | '-')).collect();
        let bytes = hex::decode(compact)?;
        Ok(Self::from_bytes(&bytes))
    }
}
