// ── Domain model ──
//
// Per-cycle accumulators for access points and clients, the key that
// identifies them, and the field addressing used by the metric catalog.

pub mod access_point;
pub mod client;
pub mod entity_key;
pub mod field;
pub mod snapshot;

pub use access_point::AccessPointRecord;
pub use client::{ClientProtocol, ClientRecord};
pub use entity_key::EntityKey;
pub use field::{ApField, ClientField, EntityKind, Field, FieldValue};
pub use snapshot::{Snapshot, SnapshotCounts};
