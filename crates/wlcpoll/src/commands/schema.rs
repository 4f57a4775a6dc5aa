//! `wlcpoll schema`: create the snapshot tables or print their DDL.

use serde::Serialize;

use wlcpoll_core::store::schema_sql;
use wlcpoll_core::{CoreError, SnapshotCounts, SnapshotStore};

use crate::cli::{GlobalOpts, SchemaArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct SchemaStatus {
    database: String,
    rows: SnapshotCounts,
    latest_snapshot: Option<String>,
}

pub fn handle(args: &SchemaArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if args.print {
        output::print_output(schema_sql().trim_end(), global.quiet);
        return Ok(());
    }

    let cfg = config::load(global)?;
    let database = cfg.storage.database;

    let status = apply(&database).map_err(|e| CliError::from(e).with_database(&database))?;

    let color = output::should_color(global.color);
    let rendered = output::render_single(global.output, &status, |s| {
        let mut lines = vec![
            output::heading("Schema ready", color),
            format!("  Database:       {}", s.database),
            format!("  Access points:  {}", s.rows.access_points),
            format!("  Clients:        {}", s.rows.clients),
        ];
        if let Some(ref latest) = s.latest_snapshot {
            lines.push(format!("  Latest:         {latest}"));
        }
        lines.join("\n")
    })?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}

fn apply(database: &std::path::Path) -> Result<SchemaStatus, CoreError> {
    let store = SnapshotStore::open(database)?;
    store.ensure_schema()?;
    Ok(SchemaStatus {
        database: database.display().to_string(),
        rows: store.row_counts()?,
        latest_snapshot: store.latest_snapshot_time()?,
    })
}
