// ── Metric catalog ──
//
// Static prefix -> handler table. Each entry names the record field a
// metric feeds, the declared types it accepts, how its row index is laid
// out, and a pure decode function. Built once at startup; lookups are
// longest-prefix, aligned on arc boundaries.

use std::collections::HashSet;
use std::net::{Ipv4Addr, Ipv6Addr};

use wlcpoll_api::{RawValue, ValueType, parse_identifier};

use crate::error::{CoreError, DecodeError};
use crate::index::IndexEncoding;
use crate::model::{ApField, ClientField, Field, FieldValue};

/// Pure `(declared type, raw value) -> field value` conversion.
pub type DecodeFn = fn(ValueType, &RawValue) -> Result<FieldValue, DecodeError>;

/// Longest display string the controller accepts for an AP name.
pub const AP_NAME_MAX_BYTES: usize = 32;

/// One known metric.
#[derive(Debug, Clone, Copy)]
pub struct MetricSpec {
    /// Dotted identifier prefix, leading delimiter included.
    pub prefix: &'static str,
    /// MIB object name, used in logs.
    pub name: &'static str,
    pub field: Field,
    pub accepted: &'static [ValueType],
    pub encoding: IndexEncoding,
    pub decode: DecodeFn,
}

impl MetricSpec {
    /// Check the declared type against the accepted set, then decode.
    pub fn decode(&self, declared: ValueType, raw: &RawValue) -> Result<FieldValue, DecodeError> {
        if !self.accepted.contains(&declared) {
            return Err(DecodeError::TypeMismatch(declared));
        }
        (self.decode)(declared, raw)
    }

    /// Split `identifier` into its row suffix if this prefix owns it.
    fn suffix_of<'a>(&self, identifier: &'a str) -> Option<&'a str> {
        let rest = identifier.strip_prefix(self.prefix)?;
        (rest.is_empty() || rest.starts_with('.')).then_some(rest)
    }
}

/// Immutable metric table.
#[derive(Debug, Clone)]
pub struct Catalog {
    /// Declaration order; also the default metric-group order.
    entries: Vec<MetricSpec>,
    /// Indices into `entries`, longest prefix first.
    by_length: Vec<usize>,
}

impl Catalog {
    /// Build a catalog, rejecting malformed or duplicate prefixes.
    pub fn new(entries: Vec<MetricSpec>) -> Result<Self, CoreError> {
        let mut seen = HashSet::with_capacity(entries.len());
        for spec in &entries {
            if !spec.prefix.starts_with('.') {
                return Err(CoreError::Catalog {
                    message: format!("prefix {} must start with '.'", spec.prefix),
                });
            }
            parse_identifier(spec.prefix).map_err(|e| CoreError::Catalog {
                message: e.to_string(),
            })?;
            if !seen.insert(spec.prefix) {
                return Err(CoreError::Catalog {
                    message: format!("duplicate prefix {}", spec.prefix),
                });
            }
            if spec.accepted.is_empty() {
                return Err(CoreError::Catalog {
                    message: format!("{} accepts no value types", spec.name),
                });
            }
        }
        Ok(Self::indexed(entries))
    }

    /// The Airespace/Cisco WLC table (enterprise 14179).
    pub fn wireless_lan_controller() -> Self {
        Self::indexed(wireless_lan_controller_entries())
    }

    fn indexed(entries: Vec<MetricSpec>) -> Self {
        let mut by_length: Vec<usize> = (0..entries.len()).collect();
        by_length.sort_by_key(|&i| {
            std::cmp::Reverse(entries.get(i).map_or(0, |spec| spec.prefix.len()))
        });
        Self { entries, by_length }
    }

    /// Find the entry owning `identifier` and return it with the row suffix.
    pub fn lookup<'a>(&self, identifier: &'a str) -> Option<(&MetricSpec, &'a str)> {
        self.by_length
            .iter()
            .filter_map(|&i| self.entries.get(i))
            .find_map(|spec| spec.suffix_of(identifier).map(|suffix| (spec, suffix)))
    }

    pub fn entries(&self) -> &[MetricSpec] {
        &self.entries
    }

    /// Default metric groups to walk each cycle.
    pub fn groups(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.prefix.to_owned()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::wireless_lan_controller()
    }
}

// ── Table ───────────────────────────────────────────────────────────

const OCTETS: &[ValueType] = &[ValueType::OctetString];
const INTEGER: &[ValueType] = &[ValueType::Integer];
const ADDRESS: &[ValueType] = &[ValueType::IpAddress, ValueType::OctetString];
const COUNTER: &[ValueType] = &[ValueType::Counter32, ValueType::Counter64, ValueType::Integer];

const AP_ROW: IndexEncoding = IndexEncoding::DecimalDotted {
    hardware_address: true,
};
const STATION_ROW: IndexEncoding = IndexEncoding::BinarySuffix;

fn wireless_lan_controller_entries() -> Vec<MetricSpec> {
    vec![
        // bsnAPTable / bsnAPIfTable, indexed by the AP's Dot3 MAC.
        MetricSpec {
            prefix: ".1.3.6.1.4.1.14179.2.2.1.1.1",
            name: "bsnAPDot3MacAddress",
            field: Field::AccessPoint(ApField::MacAddress),
            accepted: OCTETS,
            encoding: AP_ROW,
            decode: decode_mac,
        },
        MetricSpec {
            prefix: ".1.3.6.1.4.1.14179.2.2.1.1.3",
            name: "bsnAPName",
            field: Field::AccessPoint(ApField::Name),
            accepted: OCTETS,
            encoding: AP_ROW,
            decode: decode_ap_name,
        },
        MetricSpec {
            prefix: ".1.3.6.1.4.1.14179.2.2.2.1.4",
            name: "bsnAPIfPhyChannelNumber",
            field: Field::AccessPoint(ApField::Channel),
            accepted: INTEGER,
            encoding: AP_ROW,
            decode: decode_integer,
        },
        // bsnMobileStationTable / bsnMobileStationStatsTable.
        MetricSpec {
            prefix: ".1.3.6.1.4.1.14179.2.1.4.1.4",
            name: "bsnMobileStationAPMacAddr",
            field: Field::Client(ClientField::AssociatedApMac),
            accepted: OCTETS,
            encoding: STATION_ROW,
            decode: decode_mac,
        },
        MetricSpec {
            prefix: ".1.3.6.1.4.1.14179.2.1.4.1.2",
            name: "bsnMobileStationIpAddress",
            field: Field::Client(ClientField::IpAddress),
            accepted: ADDRESS,
            encoding: STATION_ROW,
            decode: decode_ip_address,
        },
        MetricSpec {
            prefix: ".1.3.6.1.4.1.14179.2.1.4.1.1",
            name: "bsnMobileStationMacAddress",
            field: Field::Client(ClientField::MacAddress),
            accepted: OCTETS,
            encoding: STATION_ROW,
            decode: decode_mac,
        },
        MetricSpec {
            prefix: ".1.3.6.1.4.1.14179.2.1.4.1.7",
            name: "bsnMobileStationSsid",
            field: Field::Client(ClientField::Ssid),
            accepted: OCTETS,
            encoding: STATION_ROW,
            decode: decode_display_string,
        },
        MetricSpec {
            prefix: ".1.3.6.1.4.1.14179.2.1.4.1.3",
            name: "bsnMobileStationUserName",
            field: Field::Client(ClientField::Username),
            accepted: OCTETS,
            encoding: STATION_ROW,
            decode: decode_display_string,
        },
        MetricSpec {
            prefix: ".1.3.6.1.4.1.14179.2.1.4.1.25",
            name: "bsnMobileStationProtocol",
            field: Field::Client(ClientField::Protocol),
            accepted: INTEGER,
            encoding: STATION_ROW,
            decode: decode_integer,
        },
        MetricSpec {
            prefix: ".1.3.6.1.4.1.14179.2.1.6.1.1",
            name: "bsnMobileStationRSSI",
            field: Field::Client(ClientField::Rssi),
            accepted: INTEGER,
            encoding: STATION_ROW,
            decode: decode_integer,
        },
        MetricSpec {
            prefix: ".1.3.6.1.4.1.14179.2.1.6.1.26",
            name: "bsnMobileStationSnr",
            field: Field::Client(ClientField::Snr),
            accepted: INTEGER,
            encoding: STATION_ROW,
            decode: decode_integer,
        },
        MetricSpec {
            prefix: ".1.3.6.1.4.1.14179.2.1.6.1.2",
            name: "bsnMobileStationBytesReceived",
            field: Field::Client(ClientField::BytesReceived),
            accepted: COUNTER,
            encoding: STATION_ROW,
            decode: decode_counter,
        },
        MetricSpec {
            prefix: ".1.3.6.1.4.1.14179.2.1.6.1.3",
            name: "bsnMobileStationBytesSent",
            field: Field::Client(ClientField::BytesSent),
            accepted: COUNTER,
            encoding: STATION_ROW,
            decode: decode_counter,
        },
    ]
}

// ── Decoders ────────────────────────────────────────────────────────

fn bytes_of(raw: &RawValue) -> Result<&[u8], DecodeError> {
    raw.as_bytes()
        .ok_or_else(|| DecodeError::InvalidValue(format!("expected bytes, got {raw:?}")))
}

/// 6-byte hardware address -> lowercase hex.
pub fn decode_mac(_declared: ValueType, raw: &RawValue) -> Result<FieldValue, DecodeError> {
    let bytes = bytes_of(raw)?;
    if bytes.len() != 6 {
        return Err(DecodeError::InvalidValue(format!(
            "hardware address must be 6 bytes, got {}",
            bytes.len()
        )));
    }
    Ok(FieldValue::Text(hex::encode(bytes)))
}

/// DisplayString -> UTF-8, trailing NULs trimmed.
pub fn decode_display_string(
    _declared: ValueType,
    raw: &RawValue,
) -> Result<FieldValue, DecodeError> {
    let bytes = bytes_of(raw)?;
    let text = String::from_utf8_lossy(bytes);
    Ok(FieldValue::Text(text.trim_end_matches('\0').to_owned()))
}

pub fn decode_ap_name(declared: ValueType, raw: &RawValue) -> Result<FieldValue, DecodeError> {
    let len = bytes_of(raw)?.len();
    if len > AP_NAME_MAX_BYTES {
        return Err(DecodeError::InvalidValue(format!(
            "AP name is {len} bytes, limit is {AP_NAME_MAX_BYTES}"
        )));
    }
    decode_display_string(declared, raw)
}

pub fn decode_ip_address(_declared: ValueType, raw: &RawValue) -> Result<FieldValue, DecodeError> {
    let bytes = bytes_of(raw)?;
    if let Ok(v4) = <[u8; 4]>::try_from(bytes) {
        return Ok(FieldValue::Text(Ipv4Addr::from(v4).to_string()));
    }
    if let Ok(v6) = <[u8; 16]>::try_from(bytes) {
        return Ok(FieldValue::Text(Ipv6Addr::from(v6).to_string()));
    }
    Err(DecodeError::InvalidValue(format!(
        "IP address must be 4 or 16 bytes, got {}",
        bytes.len()
    )))
}

pub fn decode_integer(_declared: ValueType, raw: &RawValue) -> Result<FieldValue, DecodeError> {
    match raw {
        RawValue::Signed(i) => Ok(FieldValue::Integer(*i)),
        RawValue::Unsigned(u) => i64::try_from(*u)
            .map(FieldValue::Integer)
            .map_err(|_| DecodeError::InvalidValue(format!("{u} does not fit in i64"))),
        other => Err(DecodeError::InvalidValue(format!(
            "expected a number, got {other:?}"
        ))),
    }
}

/// Counters are never negative.
pub fn decode_counter(declared: ValueType, raw: &RawValue) -> Result<FieldValue, DecodeError> {
    match decode_integer(declared, raw)? {
        FieldValue::Integer(i) if i < 0 => Err(DecodeError::InvalidValue(format!(
            "counter value {i} is negative"
        ))),
        value => Ok(value),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    fn noop(_: ValueType, _: &RawValue) -> Result<FieldValue, DecodeError> {
        Ok(FieldValue::Integer(0))
    }

    fn spec(prefix: &'static str) -> MetricSpec {
        MetricSpec {
            prefix,
            name: "test",
            field: Field::Client(ClientField::Rssi),
            accepted: INTEGER,
            encoding: STATION_ROW,
            decode: noop,
        }
    }

    #[test]
    fn standard_table_is_valid() {
        let catalog = Catalog::new(wireless_lan_controller_entries()).unwrap();
        assert_eq!(catalog.len(), 13);
        assert_eq!(catalog.groups().len(), 13);
    }

    #[test]
    fn every_client_field_is_fed() {
        let catalog = Catalog::wireless_lan_controller();
        for field in ClientField::iter() {
            assert!(
                catalog.entries().iter().any(|e| e.field == Field::Client(field)),
                "no metric feeds {field}"
            );
        }
        for field in ApField::iter() {
            assert!(
                catalog
                    .entries()
                    .iter()
                    .any(|e| e.field == Field::AccessPoint(field)),
                "no metric feeds {field}"
            );
        }
    }

    #[test]
    fn duplicate_prefixes_are_rejected() {
        let result = Catalog::new(vec![spec(".1.3.6.1"), spec(".1.3.6.1")]);
        assert!(matches!(result, Err(CoreError::Catalog { .. })));
    }

    #[test]
    fn malformed_prefixes_are_rejected() {
        assert!(Catalog::new(vec![spec("1.3.6.1")]).is_err());
        assert!(Catalog::new(vec![spec(".1.3.x")]).is_err());
    }

    #[test]
    fn lookup_is_arc_aligned() {
        let catalog = Catalog::wireless_lan_controller();

        let (spec, suffix) = catalog
            .lookup(".1.3.6.1.4.1.14179.2.1.4.1.25.0.36.151.40.140.113")
            .unwrap();
        assert_eq!(spec.name, "bsnMobileStationProtocol");
        assert_eq!(suffix, ".0.36.151.40.140.113");

        let (spec, _) = catalog
            .lookup(".1.3.6.1.4.1.14179.2.1.4.1.2.0.36.151.40.140.113")
            .unwrap();
        assert_eq!(spec.name, "bsnMobileStationIpAddress");
    }

    #[test]
    fn lookup_prefers_longest_prefix() {
        let catalog = Catalog::new(vec![spec(".1.3.6"), spec(".1.3.6.1.4")]).unwrap();
        let (spec, suffix) = catalog.lookup(".1.3.6.1.4.9").unwrap();
        assert_eq!(spec.prefix, ".1.3.6.1.4");
        assert_eq!(suffix, ".9");
    }

    #[test]
    fn lookup_misses_unknown_identifiers() {
        let catalog = Catalog::wireless_lan_controller();
        assert!(catalog.lookup(".1.3.6.1.2.1.1.5.0").is_none());
        assert!(catalog.lookup(".1.3.6.1.4.1.14179.2.2.1.1.30.1").is_none());
    }

    #[test]
    fn decode_checks_declared_type_first() {
        let catalog = Catalog::wireless_lan_controller();
        let (spec, _) = catalog.lookup(".1.3.6.1.4.1.14179.2.2.1.1.3.1.2.3.4.5.6").unwrap();
        let err = spec
            .decode(ValueType::Integer, &RawValue::Signed(5))
            .unwrap_err();
        assert_eq!(err, DecodeError::TypeMismatch(ValueType::Integer));
    }

    #[test]
    fn mac_decoder() {
        let mac = RawValue::Bytes(vec![0x00, 0x24, 0x97, 0x28, 0x8c, 0x71]);
        assert_eq!(
            decode_mac(ValueType::OctetString, &mac).unwrap(),
            FieldValue::Text("002497288c71".into())
        );
        assert!(decode_mac(ValueType::OctetString, &RawValue::Bytes(vec![1, 2])).is_err());
        assert!(decode_mac(ValueType::OctetString, &RawValue::Signed(1)).is_err());
    }

    #[test]
    fn ap_name_decoder_enforces_length() {
        let ok = RawValue::Bytes(b"AP-Lobby\0\0".to_vec());
        assert_eq!(
            decode_ap_name(ValueType::OctetString, &ok).unwrap(),
            FieldValue::Text("AP-Lobby".into())
        );
        let long = RawValue::Bytes(vec![b'a'; AP_NAME_MAX_BYTES + 1]);
        assert!(decode_ap_name(ValueType::OctetString, &long).is_err());
    }

    #[test]
    fn ip_decoder_handles_both_families() {
        assert_eq!(
            decode_ip_address(ValueType::IpAddress, &RawValue::Bytes(vec![192, 168, 1, 20]))
                .unwrap(),
            FieldValue::Text("192.168.1.20".into())
        );
        let mut v6 = vec![0u8; 16];
        v6[15] = 1;
        assert_eq!(
            decode_ip_address(ValueType::OctetString, &RawValue::Bytes(v6)).unwrap(),
            FieldValue::Text("::1".into())
        );
        assert!(decode_ip_address(ValueType::IpAddress, &RawValue::Bytes(vec![1, 2, 3])).is_err());
    }

    #[test]
    fn numeric_decoders() {
        assert_eq!(
            decode_integer(ValueType::Integer, &RawValue::Signed(-70)).unwrap(),
            FieldValue::Integer(-70)
        );
        assert_eq!(
            decode_counter(ValueType::Counter64, &RawValue::Unsigned(1 << 40)).unwrap(),
            FieldValue::Integer(1 << 40)
        );
        assert!(decode_counter(ValueType::Counter64, &RawValue::Unsigned(u64::MAX)).is_err());
        assert!(decode_counter(ValueType::Integer, &RawValue::Signed(-1)).is_err());
    }
}
