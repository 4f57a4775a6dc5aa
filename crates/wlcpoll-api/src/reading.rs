// ── Metric readings ──
//
// The flat (identifier, declared type, raw value) triples produced by a
// bulk walk. They carry no entity knowledge; the core crate turns them
// into access point and client records.

use serde::Serialize;
use strum::{Display, IntoStaticStr};

/// Value encoding declared by the agent for one varbind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum ValueType {
    Boolean,
    Integer,
    OctetString,
    Null,
    ObjectIdentifier,
    IpAddress,
    Counter32,
    Gauge32,
    TimeTicks,
    Opaque,
    Counter64,
    Other,
}

/// Undecoded payload of one varbind.
///
/// Kept intentionally loose: the decode functions in the metric catalog
/// decide what a payload means for their field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RawValue {
    Bytes(Vec<u8>),
    Signed(i64),
    Unsigned(u64),
    Null,
}

impl RawValue {
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

/// One item of a bulk-walk response. Consumed exactly once per cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricReading {
    /// Full dotted path, leading delimiter included (`.1.3.6.1...`).
    pub identifier: String,
    pub declared_type: ValueType,
    pub raw_value: RawValue,
}

impl MetricReading {
    pub fn new(identifier: impl Into<String>, declared_type: ValueType, raw_value: RawValue) -> Self {
        Self {
            identifier: identifier.into(),
            declared_type,
            raw_value,
        }
    }

    pub fn octets(identifier: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(identifier, ValueType::OctetString, RawValue::Bytes(bytes.into()))
    }

    pub fn integer(identifier: impl Into<String>, value: i64) -> Self {
        Self::new(identifier, ValueType::Integer, RawValue::Signed(value))
    }

    pub fn counter32(identifier: impl Into<String>, value: u32) -> Self {
        Self::new(identifier, ValueType::Counter32, RawValue::Unsigned(u64::from(value)))
    }

    pub fn counter64(identifier: impl Into<String>, value: u64) -> Self {
        Self::new(identifier, ValueType::Counter64, RawValue::Unsigned(value))
    }

    pub fn ip_address(identifier: impl Into<String>, octets: [u8; 4]) -> Self {
        Self::new(identifier, ValueType::IpAddress, RawValue::Bytes(octets.to_vec()))
    }
}

// ── Identifier helpers ──────────────────────────────────────────────

/// Parse a dotted identifier (`.1.3.6.1` or `1.3.6.1`) into its arcs.
pub fn parse_identifier(identifier: &str) -> Result<Vec<u32>, crate::Error> {
    let trimmed = identifier.strip_prefix('.').unwrap_or(identifier);
    if trimmed.is_empty() {
        return Err(crate::Error::InvalidIdentifier {
            identifier: identifier.to_owned(),
            reason: "empty path".into(),
        });
    }
    trimmed
        .split('.')
        .map(|arc| {
            arc.parse::<u32>().map_err(|_| crate::Error::InvalidIdentifier {
                identifier: identifier.to_owned(),
                reason: format!("arc '{arc}' is not an unsigned integer"),
            })
        })
        .collect()
}

/// Render arcs in the dotted form used for [`MetricReading::identifier`].
pub fn format_identifier(arcs: &[u32]) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(arcs.len() * 4);
    for arc in arcs {
        let _ = write!(out, ".{arc}");
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_leading_dot() {
        assert_eq!(parse_identifier(".1.3.6.1").unwrap(), vec![1, 3, 6, 1]);
        assert_eq!(parse_identifier("1.3.6.1").unwrap(), vec![1, 3, 6, 1]);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_identifier("").is_err());
        assert!(parse_identifier(".1.3.x").is_err());
        assert!(parse_identifier(".1..3").is_err());
    }

    #[test]
    fn format_matches_transport_rendering() {
        assert_eq!(format_identifier(&[1, 3, 6, 1, 4, 1, 14179]), ".1.3.6.1.4.1.14179");
        assert_eq!(format_identifier(&[]), "");
    }

    #[test]
    fn value_type_display_is_kebab_case() {
        assert_eq!(ValueType::OctetString.to_string(), "octet-string");
        assert_eq!(ValueType::Counter64.to_string(), "counter64");
    }
}
