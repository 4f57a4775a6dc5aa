// ── Entity aggregation ──
//
// Folds a flat batch of readings into per-entity accumulators. Every
// per-reading failure is absorbed here: it is logged, counted, and the
// reading is skipped. Nothing in this module can fail a cycle.

use serde::Serialize;
use tracing::{debug, warn};

use wlcpoll_api::MetricReading;

use crate::catalog::Catalog;
use crate::error::ReadingError;
use crate::index::IndexResolver;
use crate::model::{EntityKind, Field, Snapshot};

/// Reading outcomes for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregateReport {
    /// Readings assigned into a record.
    pub accepted: usize,
    /// Readings no catalog entry claimed.
    pub unknown: usize,
    /// Readings dropped with a warning.
    pub rejected: usize,
}

impl AggregateReport {
    pub fn total(self) -> usize {
        self.accepted + self.unknown + self.rejected
    }
}

/// Cycle-scoped accumulator state.
#[derive(Debug)]
pub struct Aggregator<'c> {
    catalog: &'c Catalog,
    snapshot: Snapshot,
    report: AggregateReport,
}

impl<'c> Aggregator<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self {
            catalog,
            snapshot: Snapshot::default(),
            report: AggregateReport::default(),
        }
    }

    /// Fold one reading in. Failures are logged and counted, never returned.
    pub fn ingest(&mut self, reading: &MetricReading) {
        match self.apply(reading) {
            Ok(()) => self.report.accepted += 1,
            Err(ReadingError::UnknownMetric { identifier }) => {
                debug!(identifier = %identifier, "unknown metric, ignoring");
                self.report.unknown += 1;
            }
            Err(ReadingError::KindConflict {
                key,
                bound,
                attempted,
            }) => {
                warn!(
                    identifier = %reading.identifier,
                    key = %key,
                    bound = %bound,
                    attempted = %attempted,
                    error = "kind_conflict",
                    "dropping reading: key is used by both an access point and a client"
                );
                self.report.rejected += 1;
            }
            Err(e) => {
                warn!(
                    identifier = %reading.identifier,
                    declared_type = %reading.declared_type,
                    error = e.kind(),
                    "dropping reading: {e}"
                );
                self.report.rejected += 1;
            }
        }
    }

    /// Resolve, decode and assign. The accumulator is created only once
    /// all checks have passed.
    fn apply(&mut self, reading: &MetricReading) -> Result<(), ReadingError> {
        let (spec, suffix) =
            self.catalog
                .lookup(&reading.identifier)
                .ok_or_else(|| ReadingError::UnknownMetric {
                    identifier: reading.identifier.clone(),
                })?;

        let key = spec.encoding.resolve(suffix)?;
        let value = spec
            .decode(reading.declared_type, &reading.raw_value)
            .map_err(|e| ReadingError::from_decode(spec.name, e))?;

        match spec.field {
            Field::AccessPoint(field) => {
                if self.snapshot.clients.contains_key(&key) {
                    return Err(ReadingError::KindConflict {
                        key,
                        bound: EntityKind::Client,
                        attempted: EntityKind::AccessPoint,
                    });
                }
                self.snapshot
                    .access_points
                    .entry(key)
                    .or_default()
                    .assign(field, value);
            }
            Field::Client(field) => {
                if self.snapshot.access_points.contains_key(&key) {
                    return Err(ReadingError::KindConflict {
                        key,
                        bound: EntityKind::AccessPoint,
                        attempted: EntityKind::Client,
                    });
                }
                self.snapshot
                    .clients
                    .entry(key)
                    .or_default()
                    .assign(field, value);
            }
        }
        Ok(())
    }

    pub fn report(&self) -> AggregateReport {
        self.report
    }

    /// Hand over the accumulated records.
    pub fn finish(self) -> (Snapshot, AggregateReport) {
        (self.snapshot, self.report)
    }
}

/// Aggregate a whole batch in encounter order.
pub fn aggregate<'r>(
    catalog: &Catalog,
    readings: impl IntoIterator<Item = &'r MetricReading>,
) -> (Snapshot, AggregateReport) {
    let mut aggregator = Aggregator::new(catalog);
    for reading in readings {
        aggregator.ingest(reading);
    }
    aggregator.finish()
}
