//! `wlcpoll poll`: run one cycle, or with `--dry-run` print what it would write.

use serde::Serialize;
use tabled::Tabled;

use wlcpoll_core::{
    AccessPointRecord, ClientRecord, Collector, CycleReport, EntityKey, Pipeline, Reconstruction,
};

use crate::cli::{GlobalOpts, OutputFormat, PollArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

// ── Table rows ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ApRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "2.4GHz")]
    band24: i64,
    #[tabled(rename = "5GHz")]
    band5: i64,
}

#[derive(Tabled)]
struct ClientRow {
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "AP")]
    ap: String,
    #[tabled(rename = "SSID")]
    ssid: String,
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "Protocol")]
    protocol: String,
    #[tabled(rename = "RSSI")]
    rssi: i64,
    #[tabled(rename = "SNR")]
    snr: i64,
    #[tabled(rename = "RX")]
    rx: i64,
    #[tabled(rename = "TX")]
    tx: i64,
}

// ── Dry-run view ─────────────────────────────────────────────────────

#[derive(Serialize)]
struct Keyed<'a, T> {
    key: &'a EntityKey,
    #[serde(flatten)]
    record: &'a T,
}

#[derive(Serialize)]
struct DryRun<'a> {
    readings: usize,
    groups_failed: usize,
    warnings: usize,
    access_points: Vec<Keyed<'a, AccessPointRecord>>,
    clients: Vec<Keyed<'a, ClientRecord>>,
}

impl<'a> DryRun<'a> {
    fn new(readings: usize, groups_failed: usize, rebuilt: &'a Reconstruction) -> Self {
        let mut access_points: Vec<_> = rebuilt
            .snapshot
            .access_points
            .iter()
            .map(|(key, record)| Keyed { key, record })
            .collect();
        access_points.sort_by(|a, b| a.key.cmp(b.key));

        let mut clients: Vec<_> = rebuilt
            .snapshot
            .clients
            .iter()
            .map(|(key, record)| Keyed { key, record })
            .collect();
        clients.sort_by(|a, b| a.key.cmp(b.key));

        Self {
            readings,
            groups_failed,
            warnings: rebuilt.warnings(),
            access_points,
            clients,
        }
    }
}

fn ap_row(k: &Keyed<'_, AccessPointRecord>) -> ApRow {
    ApRow {
        key: k.key.to_string(),
        mac: k.record.mac_address.clone(),
        name: k.record.name.clone(),
        band24: k.record.channel_band24,
        band5: k.record.channel_band5,
    }
}

fn client_row(k: &Keyed<'_, ClientRecord>) -> ClientRow {
    ClientRow {
        mac: k.record.mac_address.clone(),
        ip: k.record.ip_address.clone(),
        ap: k.record.associated_ap_mac.clone(),
        ssid: k.record.ssid.clone(),
        user: k.record.username.clone(),
        protocol: k.record.protocol.to_string(),
        rssi: k.record.rssi,
        snr: k.record.snr,
        rx: k.record.bytes_received,
        tx: k.record.bytes_sent,
    }
}

fn dry_run_detail(view: &DryRun<'_>, color: bool) -> Result<String, CliError> {
    Ok(format!(
        "{}\n{}\n\n{}\n{}\n\n{} readings, {} failed groups, {} warnings",
        output::heading(&format!("Access points ({})", view.access_points.len()), color),
        output::render_list(OutputFormat::Table, &view.access_points, ap_row)?,
        output::heading(&format!("Clients ({})", view.clients.len()), color),
        output::render_list(OutputFormat::Table, &view.clients, client_row)?,
        view.readings,
        output::count_status(view.groups_failed, color),
        output::count_status(view.warnings, color),
    ))
}

// ── Handler ──────────────────────────────────────────────────────────

pub async fn handle(args: &PollArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let poller_config = config::resolve_poller_config(global)?;
    let color = output::should_color(global.color);

    if args.dry_run {
        let (fetched, rebuilt) =
            super::blocking(move || Ok(Collector::connect(&poller_config)?.collect())).await?;
        let view = DryRun::new(fetched.readings.len(), fetched.groups_failed, &rebuilt);
        let rendered = match global.output {
            OutputFormat::Table => dry_run_detail(&view, color)?,
            format => output::render_single(format, &view, |_| String::new())?,
        };
        output::print_output(&rendered, global.quiet);
        return Ok(());
    }

    let database = poller_config.database.clone();
    let report = super::blocking(move || Pipeline::connect(&poller_config)?.run_cycle())
        .await
        .map_err(|e| e.with_database(&database))?;

    let rendered = output::render_single(global.output, &report, |r| cycle_detail(r, color))?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}

fn cycle_detail(report: &CycleReport, color: bool) -> String {
    [
        output::heading("Snapshot written", color),
        format!("  Time:           {}", report.snapshot_time.to_rfc3339()),
        format!("  Access points:  {}", report.rows.access_points),
        format!("  Clients:        {}", report.rows.clients),
        format!("  Readings:       {}", report.readings),
        format!(
            "  Failed groups:  {}",
            output::count_status(report.groups_failed, color)
        ),
        format!(
            "  Warnings:       {}",
            output::count_status(report.warnings, color)
        ),
        format!("  Fetch:          {} ms", report.fetch_ms),
        format!("  Write:          {} ms", report.write_ms),
    ]
    .join("\n")
}
