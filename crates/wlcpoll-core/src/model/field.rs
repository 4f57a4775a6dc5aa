// ── Record fields addressed by the metric catalog ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoStaticStr};

/// Which accumulator a metric feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    AccessPoint,
    Client,
}

/// Access point accumulator fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ApField {
    MacAddress,
    Name,
    /// Raw radio channel; split into a band field after aggregation.
    Channel,
}

/// Client accumulator fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ClientField {
    AssociatedApMac,
    IpAddress,
    MacAddress,
    Ssid,
    Username,
    Protocol,
    Rssi,
    Snr,
    BytesReceived,
    BytesSent,
}

/// Target of one catalog entry. The entity kind is implied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    AccessPoint(ApField),
    Client(ClientField),
}

impl Field {
    pub fn kind(self) -> EntityKind {
        match self {
            Self::AccessPoint(_) => EntityKind::AccessPoint,
            Self::Client(_) => EntityKind::Client,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::AccessPoint(f) => f.into(),
            Self::Client(f) => f.into(),
        }
    }
}

/// A decoded value, ready to be assigned into a record field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
}

impl FieldValue {
    pub fn into_text(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Integer(i) => i.to_string(),
        }
    }

    /// Text values that do not parse as integers become 0.
    pub fn into_integer(self) -> i64 {
        match self {
            Self::Integer(i) => i,
            Self::Text(s) => s.parse().unwrap_or_default(),
        }
    }
}
