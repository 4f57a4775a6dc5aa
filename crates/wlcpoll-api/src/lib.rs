//! SNMP transport for wireless LAN controller polling.
//!
//! Produces the flat [`MetricReading`] triples that `wlcpoll-core`
//! reconstructs into access point and client records. The transport is a
//! black box to the rest of the workspace: [`MetricSource::fetch_group`]
//! walks one metric group and returns whatever the agent answered.

pub mod error;
pub mod reading;
pub mod source;
pub mod transport;

pub use error::Error;
pub use reading::{MetricReading, RawValue, ValueType, format_identifier, parse_identifier};
pub use source::MetricSource;
pub use transport::{SnmpTransport, TransportConfig};
