// ── Client domain types ──

use serde::{Serialize, Serializer};
use std::fmt;

use super::field::{ClientField, FieldValue};

/// 802.11 protocol reported for a client station.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ClientProtocol {
    /// No protocol reading this cycle.
    #[default]
    Unset,
    Dot11a,
    Dot11b,
    Dot11g,
    Unknown,
    Mobile,
    Dot11n24,
    Dot11n5,
    /// A code newer than this table.
    Other(i64),
}

impl ClientProtocol {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Unset,
            1 => Self::Dot11a,
            2 => Self::Dot11b,
            3 => Self::Dot11g,
            4 => Self::Unknown,
            5 => Self::Mobile,
            6 => Self::Dot11n24,
            7 => Self::Dot11n5,
            other => Self::Other(other),
        }
    }

    /// The controller's integer code, as persisted.
    pub fn code(self) -> i64 {
        match self {
            Self::Unset => 0,
            Self::Dot11a => 1,
            Self::Dot11b => 2,
            Self::Dot11g => 3,
            Self::Unknown => 4,
            Self::Mobile => 5,
            Self::Dot11n24 => 6,
            Self::Dot11n5 => 7,
            Self::Other(code) => code,
        }
    }
}

impl fmt::Display for ClientProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => f.write_str("-"),
            Self::Dot11a => f.write_str("802.11a"),
            Self::Dot11b => f.write_str("802.11b"),
            Self::Dot11g => f.write_str("802.11g"),
            Self::Unknown => f.write_str("unknown"),
            Self::Mobile => f.write_str("mobile"),
            Self::Dot11n24 => f.write_str("802.11n (2.4 GHz)"),
            Self::Dot11n5 => f.write_str("802.11n (5 GHz)"),
            Self::Other(code) => write!(f, "code {code}"),
        }
    }
}

impl Serialize for ClientProtocol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.code())
    }
}

/// Per-cycle accumulator for one associated client station.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClientRecord {
    pub associated_ap_mac: String,
    pub ip_address: String,
    pub mac_address: String,
    pub ssid: String,
    pub username: String,
    pub protocol: ClientProtocol,
    pub rssi: i64,
    pub snr: i64,
    pub bytes_received: i64,
    pub bytes_sent: i64,
}

impl ClientRecord {
    /// Assign a decoded value; later assignments overwrite earlier ones.
    pub fn assign(&mut self, field: ClientField, value: FieldValue) {
        match field {
            ClientField::AssociatedApMac => self.associated_ap_mac = value.into_text(),
            ClientField::IpAddress => self.ip_address = value.into_text(),
            ClientField::MacAddress => self.mac_address = value.into_text(),
            ClientField::Ssid => self.ssid = value.into_text(),
            ClientField::Username => self.username = value.into_text(),
            ClientField::Protocol => {
                self.protocol = ClientProtocol::from_code(value.into_integer());
            }
            ClientField::Rssi => self.rssi = value.into_integer(),
            ClientField::Snr => self.snr = value.into_integer(),
            ClientField::BytesReceived => self.bytes_received = value.into_integer(),
            ClientField::BytesSent => self.bytes_sent = value.into_integer(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_codes_round_trip() {
        for code in 0..=9 {
            assert_eq!(ClientProtocol::from_code(code).code(), code);
        }
        assert_eq!(ClientProtocol::from_code(6), ClientProtocol::Dot11n24);
        assert_eq!(ClientProtocol::from_code(42), ClientProtocol::Other(42));
    }

    #[test]
    fn assign_routes_to_named_field() {
        let mut client = ClientRecord::default();
        client.assign(ClientField::Ssid, FieldValue::Text("corp".into()));
        client.assign(ClientField::Rssi, FieldValue::Integer(-61));
        client.assign(ClientField::Protocol, FieldValue::Integer(7));

        assert_eq!(client.ssid, "corp");
        assert_eq!(client.rssi, -61);
        assert_eq!(client.protocol, ClientProtocol::Dot11n5);
        assert_eq!(client.bytes_sent, 0);
    }
}
