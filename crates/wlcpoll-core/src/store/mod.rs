// ── Snapshot store ──
//
// SQLite persistence for reconstructed snapshots. Every cycle is written
// inside one transaction: either all of its rows land or none do.

pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, params};
use tracing::{debug, info};

use crate::error::CoreError;
use crate::model::{Snapshot, SnapshotCounts};

pub use schema::{ensure_schema, schema_sql};

/// Owner of the single store connection.
///
/// Writes take `&mut self`, so a store can never have two transactions
/// open at once.
#[derive(Debug)]
pub struct SnapshotStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SnapshotStore {
    /// Open (or create) the database file, creating parent directories
    /// and switching the journal to WAL.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| CoreError::StorageIo {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let conn = Connection::open(path)?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        debug!(path = %path.display(), journal_mode = %mode, "opened snapshot store");

        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn open_in_memory() -> Result<Self, CoreError> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
            path: None,
        })
    }

    /// `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn ensure_schema(&self) -> Result<(), CoreError> {
        schema::ensure_schema(&self.conn)?;
        info!("snapshot schema ready");
        Ok(())
    }

    /// Write one snapshot, every row stamped with `snapshot_time`.
    ///
    /// Client rows go in first, then access point rows. Any failed insert
    /// drops the transaction, which rolls back everything written so far.
    pub fn write_snapshot(
        &mut self,
        snapshot: &Snapshot,
        snapshot_time: DateTime<Utc>,
    ) -> Result<SnapshotCounts, CoreError> {
        let stamp = snapshot_time.to_rfc3339_opts(SecondsFormat::Millis, true);
        let tx = self.conn.transaction()?;
        let mut counts = SnapshotCounts::default();

        {
            let mut insert = tx.prepare_cached(schema::INSERT_CLIENT)?;
            let mut clients: Vec<_> = snapshot.clients.iter().collect();
            clients.sort_by(|a, b| a.0.cmp(b.0));
            for (key, c) in clients {
                insert.execute(params![
                    stamp,
                    key.as_str(),
                    c.associated_ap_mac,
                    c.ip_address,
                    c.mac_address,
                    c.ssid,
                    c.username,
                    c.protocol.code(),
                    c.rssi,
                    c.snr,
                    c.bytes_received,
                    c.bytes_sent,
                ])?;
                counts.clients += 1;
            }

            let mut insert = tx.prepare_cached(schema::INSERT_ACCESS_POINT)?;
            let mut access_points: Vec<_> = snapshot.access_points.iter().collect();
            access_points.sort_by(|a, b| a.0.cmp(b.0));
            for (key, ap) in access_points {
                insert.execute(params![
                    stamp,
                    key.as_str(),
                    ap.mac_address,
                    ap.name,
                    ap.channel_band24,
                    ap.channel_band5,
                ])?;
                counts.access_points += 1;
            }
        }

        tx.commit()?;
        debug!(
            snapshot_time = %stamp,
            access_points = counts.access_points,
            clients = counts.clients,
            "snapshot committed"
        );
        Ok(counts)
    }

    /// Total rows currently stored, per table.
    pub fn row_counts(&self) -> Result<SnapshotCounts, CoreError> {
        let count = |table: &str| -> rusqlite::Result<usize> {
            let n: i64 = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
            Ok(usize::try_from(n).unwrap_or_default())
        };
        Ok(SnapshotCounts {
            access_points: count(schema::ACCESS_POINTS_TABLE)?,
            clients: count(schema::CLIENTS_TABLE)?,
        })
    }

    /// Most recent snapshot time across both tables.
    pub fn latest_snapshot_time(&self) -> Result<Option<String>, CoreError> {
        let latest: Option<String> = self.conn.query_row(
            "SELECT MAX(t) FROM (
                SELECT MAX(snapshot_time) AS t FROM access_points
                UNION ALL
                SELECT MAX(snapshot_time) AS t FROM clients
            )",
            [],
            |row| row.get(0),
        )?;
        Ok(latest)
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{AccessPointRecord, ClientProtocol, ClientRecord, EntityKey};

    fn sample() -> Snapshot {
        let mut snapshot = Snapshot::default();
        let ap_key = EntityKey::from_bytes(&[0, 0x24, 0x97, 0x28, 0x8c, 0x71]);
        snapshot.access_points.insert(
            ap_key,
            AccessPointRecord {
                mac_address: "002497288c71".into(),
                name: "AP-Lobby".into(),
                channel_band24: 6,
                channel_band5: 36,
                ..AccessPointRecord::default()
            },
        );
        for i in 1..=2u8 {
            snapshot.clients.insert(
                EntityKey::from_bytes(&[0xa4, 0x5e, 0x60, 0, 0, i]),
                ClientRecord {
                    mac_address: format!("a45e600000{i:02x}"),
                    ssid: "corp".into(),
                    protocol: ClientProtocol::Dot11n5,
                    rssi: -60,
                    ..ClientRecord::default()
                },
            );
        }
        snapshot
    }

    fn store() -> SnapshotStore {
        let store = SnapshotStore::open_in_memory().unwrap();
        store.ensure_schema().unwrap();
        store
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn write_returns_row_counts() {
        let mut store = store();
        let counts = store.write_snapshot(&sample(), at()).unwrap();
        assert_eq!(
            counts,
            SnapshotCounts {
                access_points: 1,
                clients: 2
            }
        );
        assert_eq!(store.row_counts().unwrap(), counts);
    }

    #[test]
    fn rows_share_one_snapshot_time() {
        let mut store = store();
        store.write_snapshot(&sample(), at()).unwrap();

        let stamps: Vec<String> = store
            .connection()
            .prepare(
                "SELECT snapshot_time FROM clients UNION SELECT snapshot_time FROM access_points",
            )
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(stamps, vec!["2024-05-01T12:00:00.000Z".to_owned()]);
        assert_eq!(
            store.latest_snapshot_time().unwrap().as_deref(),
            Some("2024-05-01T12:00:00.000Z")
        );
    }

    #[test]
    fn ap_columns_are_persisted() {
        let mut store = store();
        store.write_snapshot(&sample(), at()).unwrap();
        let row: (String, String, i64, i64) = store
            .connection()
            .query_row(
                "SELECT mac_address, name, channel_band24, channel_band5 FROM access_points",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
            )
            .unwrap();
        assert_eq!(row, ("002497288c71".into(), "AP-Lobby".into(), 6, 36));
    }

    #[test]
    fn failed_insert_rolls_back_the_whole_cycle() {
        let mut store = store();
        store
            .connection()
            .execute_batch(
                "CREATE TRIGGER fail_ap BEFORE INSERT ON access_points
                 WHEN NEW.name = 'AP-Lobby'
                 BEGIN SELECT RAISE(ABORT, 'simulated failure'); END;",
            )
            .unwrap();

        let err = store.write_snapshot(&sample(), at()).unwrap_err();
        assert!(matches!(err, CoreError::Persistence(_)));
        // clients were inserted before the failing AP row
        assert_eq!(store.row_counts().unwrap(), SnapshotCounts::default());
        assert_eq!(store.latest_snapshot_time().unwrap(), None);
    }

    #[test]
    fn empty_snapshot_commits_nothing() {
        let mut store = store();
        let counts = store.write_snapshot(&Snapshot::default(), at()).unwrap();
        assert_eq!(counts.total(), 0);
    }

    #[test]
    fn open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("wifi.db");
        let store = SnapshotStore::open(&path).unwrap();
        store.ensure_schema().unwrap();
        assert!(path.exists());
        assert_eq!(store.path(), Some(path.as_path()));
    }
}
