// SNMP v2c transport for controller polling.
//
// One UDP session per process, shared across cycles behind a mutex.
// Each metric group is fetched with repeated GETBULK requests until the
// agent walks past the group's subtree.

use std::fmt;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use secrecy::{ExposeSecret, SecretString};
use snmp::{SnmpError, SyncSession, Value};
use tracing::{debug, trace};

use crate::error::Error;
use crate::reading::{MetricReading, RawValue, ValueType, format_identifier, parse_identifier};
use crate::source::MetricSource;

/// Connection settings for one SNMP agent.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// `host:port` of the agent.
    pub target: String,
    pub community: SecretString,
    /// Per-request response timeout.
    pub timeout: Duration,
    /// Extra attempts after a timed-out request.
    pub retries: u32,
    /// `max-repetitions` for each GETBULK.
    pub max_repetitions: u32,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            target: "127.0.0.1:161".into(),
            community: SecretString::from("public".to_string()),
            timeout: Duration::from_secs(2),
            retries: 1,
            max_repetitions: 25,
        }
    }
}

/// Bulk-walking SNMP client implementing [`MetricSource`].
pub struct SnmpTransport {
    session: Mutex<SyncSession>,
    config: TransportConfig,
}

impl fmt::Debug for SnmpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnmpTransport")
            .field("target", &self.config.target)
            .field("timeout", &self.config.timeout)
            .finish_non_exhaustive()
    }
}

impl SnmpTransport {
    /// Open the UDP session. Failure here is fatal to the whole process.
    pub fn connect(config: TransportConfig) -> Result<Self, Error> {
        let session = SyncSession::new(
            config.target.as_str(),
            config.community.expose_secret().as_bytes(),
            Some(config.timeout),
            0,
        )
        .map_err(|source| Error::SessionOpen {
            target: config.target.clone(),
            source,
        })?;

        debug!(target = %config.target, "SNMP session opened");
        Ok(Self {
            session: Mutex::new(session),
            config,
        })
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Walk one subtree with GETBULK.
    ///
    /// The `snmp` crate ends varbind iteration at the first exception
    /// value, so an `endOfMibView` surfaces as a short response rather
    /// than as a value; [`absorb`] treats a response that adds nothing
    /// as the end of the walk.
    fn walk(&self, session: &mut SyncSession, group: &str) -> Result<Vec<MetricReading>, Error> {
        let root = parse_identifier(group)?;
        let mut cursor = root.clone();
        let mut readings = Vec::new();

        loop {
            let response = self.getbulk(session, group, &cursor)?;
            if response.error_status != 0 {
                return Err(Error::ErrorStatus {
                    group: group.to_owned(),
                    status: response.error_status,
                    index: response.error_index,
                });
            }
            if absorb(group, &root, &mut cursor, response.varbinds, &mut readings) == Walk::Done {
                break;
            }
        }

        Ok(readings)
    }

    fn getbulk(
        &self,
        session: &mut SyncSession,
        group: &str,
        cursor: &[u32],
    ) -> Result<BulkResponse, Error> {
        let attempts = self.config.retries.saturating_add(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match exchange(session, cursor, self.config.max_repetitions) {
                Ok(response) => return Ok(response),
                Err(ExchangeError::Timeout) if attempt < attempts => {
                    trace!(group, attempt, "GETBULK timed out, retrying");
                }
                Err(ExchangeError::Timeout) => {
                    return Err(Error::Timeout {
                        group: group.to_owned(),
                        attempts,
                    });
                }
                Err(ExchangeError::Failed(detail)) => {
                    return Err(Error::Protocol {
                        group: group.to_owned(),
                        detail,
                    });
                }
            }
        }
    }
}

/// Owned copy of one GETBULK response; the library's PDU borrows the
/// session's receive buffer.
struct BulkResponse {
    error_status: u32,
    error_index: u32,
    varbinds: Vec<(Vec<u32>, ValueType, RawValue)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Walk {
    More,
    Done,
}

/// Append the varbinds that still belong to `root`, advancing `cursor`.
fn absorb(
    group: &str,
    root: &[u32],
    cursor: &mut Vec<u32>,
    varbinds: Vec<(Vec<u32>, ValueType, RawValue)>,
    readings: &mut Vec<MetricReading>,
) -> Walk {
    let mut advanced = false;
    for (arcs, declared_type, raw_value) in varbinds {
        if !arcs.starts_with(root) {
            return Walk::Done;
        }
        // Agents that do not advance would loop forever.
        if arcs <= *cursor {
            debug!(group, "agent returned a non-increasing identifier, stopping walk");
            return Walk::Done;
        }
        readings.push(MetricReading::new(
            format_identifier(&arcs),
            declared_type,
            raw_value,
        ));
        *cursor = arcs;
        advanced = true;
    }
    if advanced { Walk::More } else { Walk::Done }
}

enum ExchangeError {
    Timeout,
    Failed(String),
}

fn exchange(
    session: &mut SyncSession,
    cursor: &[u32],
    max_repetitions: u32,
) -> Result<BulkResponse, ExchangeError> {
    let pdu = session
        .getbulk(&[cursor], 0, max_repetitions)
        .map_err(|e| match e {
            SnmpError::ReceiveError => ExchangeError::Timeout,
            other => ExchangeError::Failed(format!("{other:?}")),
        })?;

    let error_status = pdu.error_status;
    let error_index = pdu.error_index;
    let mut name_buf = [0u32; 128];
    let mut varbinds = Vec::new();
    for (name, value) in pdu.varbinds {
        let arcs = name
            .read_name(&mut name_buf)
            .map_err(|e| ExchangeError::Failed(format!("{e:?}")))?;
        let (declared_type, raw_value) = convert_value(&value);
        varbinds.push((arcs.to_vec(), declared_type, raw_value));
    }

    Ok(BulkResponse {
        error_status,
        error_index,
        varbinds,
    })
}

impl MetricSource for SnmpTransport {
    fn fetch_group(&self, group: &str) -> Result<Vec<MetricReading>, Error> {
        let started = Instant::now();
        let mut session = self.session.lock().map_err(|_| Error::SessionPoisoned)?;
        let readings = self.walk(&mut session, group)?;
        debug!(
            group,
            readings = readings.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "group walk complete"
        );
        Ok(readings)
    }
}

/// Map one varbind value onto the transport-neutral reading types.
pub fn convert_value(value: &Value<'_>) -> (ValueType, RawValue) {
    match value {
        Value::Boolean(b) => (ValueType::Boolean, RawValue::Signed(i64::from(*b))),
        Value::Null => (ValueType::Null, RawValue::Null),
        Value::Integer(i) => (ValueType::Integer, RawValue::Signed(*i)),
        Value::OctetString(bytes) => (ValueType::OctetString, RawValue::Bytes(bytes.to_vec())),
        Value::ObjectIdentifier(oid) => {
            let mut buf = [0u32; 128];
            match oid.read_name(&mut buf) {
                Ok(arcs) => (
                    ValueType::ObjectIdentifier,
                    RawValue::Bytes(format_identifier(arcs).into_bytes()),
                ),
                Err(_) => (ValueType::ObjectIdentifier, RawValue::Null),
            }
        }
        Value::IpAddress(octets) => (ValueType::IpAddress, RawValue::Bytes(octets.to_vec())),
        Value::Counter32(c) => (ValueType::Counter32, RawValue::Unsigned(u64::from(*c))),
        Value::Unsigned32(g) => (ValueType::Gauge32, RawValue::Unsigned(u64::from(*g))),
        Value::Timeticks(t) => (ValueType::TimeTicks, RawValue::Unsigned(u64::from(*t))),
        Value::Opaque(bytes) => (ValueType::Opaque, RawValue::Bytes(bytes.to_vec())),
        Value::Counter64(c) => (ValueType::Counter64, RawValue::Unsigned(*c)),
        _ => (ValueType::Other, RawValue::Null),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn converts_scalar_values() {
        assert_eq!(
            convert_value(&Value::Integer(-42)),
            (ValueType::Integer, RawValue::Signed(-42))
        );
        assert_eq!(
            convert_value(&Value::Counter32(7)),
            (ValueType::Counter32, RawValue::Unsigned(7))
        );
        assert_eq!(
            convert_value(&Value::Counter64(u64::MAX)),
            (ValueType::Counter64, RawValue::Unsigned(u64::MAX))
        );
    }

    #[test]
    fn converts_byte_values() {
        let mac = [0x00, 0x24, 0x97, 0x28, 0x8c, 0x71];
        assert_eq!(
            convert_value(&Value::OctetString(&mac)),
            (ValueType::OctetString, RawValue::Bytes(mac.to_vec()))
        );
        assert_eq!(
            convert_value(&Value::IpAddress([10, 0, 0, 5])),
            (ValueType::IpAddress, RawValue::Bytes(vec![10, 0, 0, 5]))
        );
    }

    #[test]
    fn converts_null() {
        assert_eq!(convert_value(&Value::Null), (ValueType::Null, RawValue::Null));
    }

    const ROOT: [u32; 4] = [1, 3, 6, 1];

    fn bind(arcs: &[u32], value: i64) -> (Vec<u32>, ValueType, RawValue) {
        (arcs.to_vec(), ValueType::Integer, RawValue::Signed(value))
    }

    #[test]
    fn full_response_inside_subtree_continues() {
        let mut cursor = ROOT.to_vec();
        let mut readings = Vec::new();
        let step = absorb(
            "g",
            &ROOT,
            &mut cursor,
            vec![bind(&[1, 3, 6, 1, 1], 1), bind(&[1, 3, 6, 1, 2], 2)],
            &mut readings,
        );
        assert_eq!(step, Walk::More);
        assert_eq!(readings.len(), 2);
        assert_eq!(cursor, vec![1, 3, 6, 1, 2]);
    }

    #[test]
    fn short_response_ends_walk_cleanly() {
        let mut cursor = vec![1, 3, 6, 1, 2];
        let mut readings = Vec::new();
        assert_eq!(
            absorb("g", &ROOT, &mut cursor, Vec::new(), &mut readings),
            Walk::Done
        );
        assert!(readings.is_empty());
    }

    #[test]
    fn leaving_subtree_ends_walk_keeping_earlier_readings() {
        let mut cursor = ROOT.to_vec();
        let mut readings = Vec::new();
        let step = absorb(
            "g",
            &ROOT,
            &mut cursor,
            vec![bind(&[1, 3, 6, 1, 7], 7), bind(&[1, 3, 6, 2, 1], 9)],
            &mut readings,
        );
        assert_eq!(step, Walk::Done);
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].identifier, ".1.3.6.1.7");
    }

    #[test]
    fn non_increasing_identifier_ends_walk() {
        let mut cursor = vec![1, 3, 6, 1, 5];
        let mut readings = Vec::new();
        let step = absorb(
            "g",
            &ROOT,
            &mut cursor,
            vec![bind(&[1, 3, 6, 1, 5], 5)],
            &mut readings,
        );
        assert_eq!(step, Walk::Done);
        assert!(readings.is_empty());
    }

    #[test]
    fn default_config_matches_snmp_conventions() {
        let cfg = TransportConfig::default();
        assert_eq!(cfg.target, "127.0.0.1:161");
        assert_eq!(cfg.community.expose_secret(), "public");
        assert_eq!(cfg.timeout, Duration::from_secs(2));
    }
}
