// ── One cycle's reconstructed entities ──

use std::collections::HashMap;

use serde::Serialize;

use super::access_point::AccessPointRecord;
use super::client::ClientRecord;
use super::entity_key::EntityKey;

/// Completed AP and client mappings for a single poll cycle.
///
/// Iteration order is unspecified; rows carry no ordering meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub access_points: HashMap<EntityKey, AccessPointRecord>,
    pub clients: HashMap<EntityKey, ClientRecord>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.access_points.is_empty() && self.clients.is_empty()
    }

    pub fn counts(&self) -> SnapshotCounts {
        SnapshotCounts {
            access_points: self.access_points.len(),
            clients: self.clients.len(),
        }
    }
}

/// Rows in a snapshot, per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SnapshotCounts {
    pub access_points: usize,
    pub clients: usize,
}

impl SnapshotCounts {
    pub fn total(self) -> usize {
        self.access_points + self.clients
    }
}
