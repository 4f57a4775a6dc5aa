// ── Poll cycle ──
//
// One cycle is a sequential pipeline: fetch every group, reconstruct the
// entities, classify bands, write one snapshot. It runs synchronously on
// a blocking thread; the poller owns the scheduling.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info};

use wlcpoll_api::{MetricReading, MetricSource, SnmpTransport};

use crate::aggregate::{AggregateReport, aggregate};
use crate::band::classify_snapshot;
use crate::catalog::Catalog;
use crate::config::PollerConfig;
use crate::error::CoreError;
use crate::model::{Snapshot, SnapshotCounts};
use crate::store::SnapshotStore;

// ── Fetch ───────────────────────────────────────────────────────────

/// Readings gathered from all groups of one cycle.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub readings: Vec<MetricReading>,
    pub groups_ok: usize,
    pub groups_failed: usize,
    pub elapsed: Duration,
}

/// Fetch each group in turn. A failed group is logged and left out.
pub fn fetch_groups<S>(source: &S, groups: &[String]) -> FetchOutcome
where
    S: MetricSource + ?Sized,
{
    let started = Instant::now();
    let mut outcome = FetchOutcome::default();

    for group in groups {
        let group_started = Instant::now();
        match source.fetch_group(group) {
            Ok(readings) => {
                debug!(
                    group = %group,
                    readings = readings.len(),
                    elapsed_ms = millis(group_started.elapsed()),
                    "group fetched"
                );
                outcome.readings.extend(readings);
                outcome.groups_ok += 1;
            }
            Err(e) => {
                error!(group = %group, error = %e, "group fetch failed, skipping");
                outcome.groups_failed += 1;
            }
        }
    }

    outcome.elapsed = started.elapsed();
    outcome
}

// ── Reconstruct ─────────────────────────────────────────────────────

/// Entities rebuilt from one batch, bands already split.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Reconstruction {
    pub snapshot: Snapshot,
    pub aggregate: AggregateReport,
    /// Channel observations dropped as out of range.
    pub channels_ignored: usize,
}

impl Reconstruction {
    pub fn warnings(&self) -> usize {
        self.aggregate.rejected + self.channels_ignored
    }
}

pub fn reconstruct(catalog: &Catalog, readings: &[MetricReading]) -> Reconstruction {
    let (mut snapshot, aggregate) = aggregate(catalog, readings);
    let channels_ignored = classify_snapshot(&mut snapshot);
    Reconstruction {
        snapshot,
        aggregate,
        channels_ignored,
    }
}

// ── Full cycle ──────────────────────────────────────────────────────

/// What one cycle did.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub snapshot_time: DateTime<Utc>,
    pub readings: usize,
    pub groups_failed: usize,
    pub warnings: usize,
    pub rows: SnapshotCounts,
    pub fetch_ms: u64,
    pub write_ms: u64,
}

/// Run fetch, reconstruct and write once.
///
/// Only a storage failure fails the cycle; transport and per-reading
/// problems reduce what gets written.
pub fn run_cycle<S>(
    source: &S,
    catalog: &Catalog,
    groups: &[String],
    store: &mut SnapshotStore,
) -> Result<CycleReport, CoreError>
where
    S: MetricSource + ?Sized,
{
    let fetched = fetch_groups(source, groups);
    let rebuilt = reconstruct(catalog, &fetched.readings);

    let snapshot_time = Utc::now();
    let write_started = Instant::now();
    let rows = store.write_snapshot(&rebuilt.snapshot, snapshot_time)?;

    let report = CycleReport {
        snapshot_time,
        readings: fetched.readings.len(),
        groups_failed: fetched.groups_failed,
        warnings: rebuilt.warnings(),
        rows,
        fetch_ms: millis(fetched.elapsed),
        write_ms: millis(write_started.elapsed()),
    };

    info!(
        fetch_ms = report.fetch_ms,
        write_ms = report.write_ms,
        readings = report.readings,
        access_points = rows.access_points,
        clients = rows.clients,
        warnings = report.warnings,
        groups_failed = report.groups_failed,
        "cycle complete"
    );
    Ok(report)
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

// ── Collector ───────────────────────────────────────────────────────

/// The store-free half of a cycle: where readings come from and how
/// they are rebuilt.
#[derive(Clone)]
pub struct Collector {
    source: Arc<dyn MetricSource>,
    catalog: Arc<Catalog>,
    groups: Arc<[String]>,
}

impl std::fmt::Debug for Collector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collector")
            .field("groups", &self.groups.len())
            .field("catalog", &self.catalog.len())
            .finish_non_exhaustive()
    }
}

impl Collector {
    /// An empty `groups` list walks every catalog prefix.
    pub fn new(source: Arc<dyn MetricSource>, catalog: Arc<Catalog>, groups: Vec<String>) -> Self {
        let groups = if groups.is_empty() {
            catalog.groups()
        } else {
            groups
        };
        Self {
            source,
            catalog,
            groups: groups.into(),
        }
    }

    /// Open the SNMP session against the controller catalog.
    pub fn connect(config: &PollerConfig) -> Result<Self, CoreError> {
        config.validate()?;
        let transport = SnmpTransport::connect(config.transport.clone())?;
        Ok(Self::new(
            Arc::new(transport),
            Arc::new(Catalog::wireless_lan_controller()),
            config.groups.clone(),
        ))
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Fetch and reconstruct without touching any store.
    pub fn collect(&self) -> (FetchOutcome, Reconstruction) {
        let fetched = fetch_groups(&*self.source, &self.groups);
        let rebuilt = reconstruct(&self.catalog, &fetched.readings);
        (fetched, rebuilt)
    }
}

// ── Pipeline ────────────────────────────────────────────────────────

/// Everything a cycle needs, shareable across blocking tasks.
#[derive(Debug, Clone)]
pub struct Pipeline {
    collector: Collector,
    store: Arc<Mutex<SnapshotStore>>,
}

impl Pipeline {
    pub fn new(
        source: Arc<dyn MetricSource>,
        catalog: Arc<Catalog>,
        groups: Vec<String>,
        store: SnapshotStore,
    ) -> Self {
        Self {
            collector: Collector::new(source, catalog, groups),
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Open the store, ensure its schema and open the SNMP session.
    /// Any failure here means no cycle could ever succeed.
    pub fn connect(config: &PollerConfig) -> Result<Self, CoreError> {
        config.validate()?;

        let store = SnapshotStore::open(&config.database)?;
        store.ensure_schema()?;

        let collector = Collector::connect(config)?;
        info!(
            target = %config.transport.target,
            database = %config.database.display(),
            "poller ready"
        );

        Ok(Self {
            collector,
            store: Arc::new(Mutex::new(store)),
        })
    }

    pub fn collector(&self) -> &Collector {
        &self.collector
    }

    /// Run one cycle, blocking the calling thread.
    pub fn run_cycle(&self) -> Result<CycleReport, CoreError> {
        let mut store = self
            .store
            .lock()
            .map_err(|_| CoreError::Internal("snapshot store lock poisoned".into()))?;
        let c = &self.collector;
        run_cycle(&*c.source, &c.catalog, &c.groups, &mut store)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use wlcpoll_api::Error as TransportError;

    use super::*;

    #[derive(Default)]
    struct Scripted {
        groups: HashMap<String, Vec<MetricReading>>,
    }

    impl MetricSource for Scripted {
        fn fetch_group(&self, group: &str) -> Result<Vec<MetricReading>, TransportError> {
            self.groups
                .get(group)
                .cloned()
                .ok_or_else(|| TransportError::Timeout {
                    group: group.to_owned(),
                    attempts: 2,
                })
        }
    }

    const AP_NAME: &str = ".1.3.6.1.4.1.14179.2.2.1.1.3";
    const AP_CHANNEL: &str = ".1.3.6.1.4.1.14179.2.2.2.1.4";

    fn source() -> Scripted {
        let mut s = Scripted::default();
        s.groups.insert(
            AP_NAME.into(),
            vec![MetricReading::octets(
                format!("{AP_NAME}.0.36.151.40.140.113"),
                b"AP-Lobby".to_vec(),
            )],
        );
        s
    }

    #[test]
    fn failed_group_is_left_out() {
        let groups = vec![AP_NAME.to_owned(), AP_CHANNEL.to_owned()];
        let outcome = fetch_groups(&source(), &groups);
        assert_eq!(outcome.groups_ok, 1);
        assert_eq!(outcome.groups_failed, 1);
        assert_eq!(outcome.readings.len(), 1);
    }

    #[test]
    fn cycle_writes_partial_data() {
        let mut store = SnapshotStore::open_in_memory().unwrap();
        store.ensure_schema().unwrap();
        let catalog = Catalog::wireless_lan_controller();
        let groups = vec![AP_NAME.to_owned(), AP_CHANNEL.to_owned()];

        let report = run_cycle(&source(), &catalog, &groups, &mut store).unwrap();
        assert_eq!(report.groups_failed, 1);
        assert_eq!(report.rows.access_points, 1);
        assert_eq!(report.rows.clients, 0);
        assert_eq!(report.warnings, 0);
    }

    #[test]
    fn cycle_fails_only_on_storage() {
        // no schema
        let mut store = SnapshotStore::open_in_memory().unwrap();
        let catalog = Catalog::wireless_lan_controller();
        let groups = vec![AP_NAME.to_owned()];

        let err = run_cycle(&source(), &catalog, &groups, &mut store).unwrap_err();
        assert!(matches!(err, CoreError::Persistence(_)));
    }

    #[test]
    fn collector_defaults_to_catalog_groups() {
        let catalog = Arc::new(Catalog::wireless_lan_controller());
        let collector = Collector::new(Arc::new(source()), catalog.clone(), Vec::new());
        assert_eq!(collector.groups(), catalog.groups().as_slice());

        let (fetched, rebuilt) = collector.collect();
        assert_eq!(fetched.groups_ok, 1);
        assert_eq!(fetched.groups_failed, collector.groups().len() - 1);
        assert_eq!(rebuilt.snapshot.access_points.len(), 1);
    }

    #[test]
    fn pipeline_cycle_uses_its_collector() {
        let store = SnapshotStore::open_in_memory().unwrap();
        store.ensure_schema().unwrap();
        let pipeline = Pipeline::new(
            Arc::new(source()),
            Arc::new(Catalog::wireless_lan_controller()),
            vec![AP_NAME.to_owned()],
            store,
        );
        assert_eq!(pipeline.collector().groups(), [AP_NAME.to_owned()]);

        let report = pipeline.run_cycle().unwrap();
        assert_eq!(report.rows.access_points, 1);
        assert_eq!(report.groups_failed, 0);
    }
}
