//! Telemetry reconstruction pipeline between `wlcpoll-api` and the CLI.
//!
//! This crate turns a flat batch of indexed SNMP readings into typed
//! access point and client records and persists one snapshot per poll:
//!
//! - **[`Catalog`]**: Static prefix table. Maps a metric identifier to the
//!   record field it feeds, the declared types it accepts, its row index
//!   layout, and a pure decode function.
//!
//! - **[`index`]**: Derives an [`EntityKey`] from an identifier's row
//!   suffix. Binary-suffix and decimal-dotted layouts normalize to the same
//!   lowercase hex key for the same hardware address.
//!
//! - **[`Aggregator`]**: Folds readings into cycle-local accumulators.
//!   Bad readings are logged and skipped; they never fail a cycle.
//!
//! - **[`band`]**: Splits raw channel observations into the 2.4 GHz and
//!   5 GHz fields of an [`AccessPointRecord`].
//!
//! - **[`SnapshotStore`]**: SQLite persistence. One transaction per
//!   cycle, every row stamped with the same snapshot time.
//!
//! - **[`Poller`]**: Serialized interval scheduler. A tick that arrives
//!   while a cycle is running is dropped.

pub mod aggregate;
pub mod band;
pub mod catalog;
pub mod config;
pub mod cycle;
pub mod error;
pub mod index;
pub mod model;
pub mod poller;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use aggregate::{AggregateReport, Aggregator, aggregate};
pub use band::{BAND_SPLIT_CHANNEL, Band};
pub use catalog::{Catalog, MetricSpec};
pub use config::PollerConfig;
pub use cycle::{Collector, CycleReport, FetchOutcome, Pipeline, Reconstruction, run_cycle};
pub use error::{CoreError, DecodeError, ReadingError};
pub use index::{IndexEncoding, IndexResolver};
pub use poller::{PollState, PollSummary, Poller};
pub use store::SnapshotStore;

pub use model::{
    AccessPointRecord, ApField, ClientField, ClientProtocol, ClientRecord, EntityKey, EntityKind,
    Field, FieldValue, Snapshot, SnapshotCounts,
};

// Transport types consumers need alongside the core API.
pub use wlcpoll_api::{MetricReading, MetricSource, SnmpTransport, TransportConfig};
