// ── Snapshot tables ──

use rusqlite::Connection;

pub const ACCESS_POINTS_TABLE: &str = "access_points";
pub const CLIENTS_TABLE: &str = "clients";

const CREATE_ACCESS_POINTS: &str = "
    CREATE TABLE IF NOT EXISTS access_points (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        snapshot_time TEXT NOT NULL,
        entity_key TEXT NOT NULL,
        mac_address TEXT NOT NULL,
        name TEXT NOT NULL,
        channel_band24 INTEGER NOT NULL,
        channel_band5 INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_access_points_snapshot_time
        ON access_points(snapshot_time);
";

const CREATE_CLIENTS: &str = "
    CREATE TABLE IF NOT EXISTS clients (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        snapshot_time TEXT NOT NULL,
        entity_key TEXT NOT NULL,
        associated_ap_mac TEXT NOT NULL,
        ip_address TEXT NOT NULL,
        mac_address TEXT NOT NULL,
        ssid TEXT NOT NULL,
        username TEXT NOT NULL,
        protocol INTEGER NOT NULL,
        rssi INTEGER NOT NULL,
        snr INTEGER NOT NULL,
        bytes_received INTEGER NOT NULL,
        bytes_sent INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_clients_snapshot_time
        ON clients(snapshot_time);
";

pub(crate) const INSERT_ACCESS_POINT: &str = "
    INSERT INTO access_points
        (snapshot_time, entity_key, mac_address, name, channel_band24, channel_band5)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
";

pub(crate) const INSERT_CLIENT: &str = "
    INSERT INTO clients
        (snapshot_time, entity_key, associated_ap_mac, ip_address, mac_address,
         ssid, username, protocol, rssi, snr, bytes_received, bytes_sent)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
";

/// Create both tables and their indexes. Safe to run on every start.
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(CREATE_ACCESS_POINTS)?;
    conn.execute_batch(CREATE_CLIENTS)
}

/// Schema DDL as executed by [`ensure_schema`].
pub fn schema_sql() -> String {
    format!("{}\n{}", CREATE_ACCESS_POINTS.trim(), CREATE_CLIENTS.trim())
}
