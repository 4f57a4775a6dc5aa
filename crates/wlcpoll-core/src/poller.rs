// ── Poll scheduler ──
//
// Fixed-interval timer driving one cycle at a time. A tick that arrives
// while a cycle is still running is dropped, never queued, so two
// snapshot transactions can never overlap.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, warn};

use crate::cycle::{CycleReport, Pipeline};
use crate::error::CoreError;

/// Scheduler state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PollState {
    Idle,
    Running { iteration: u64 },
    Stopped,
}

/// Totals for one `run`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PollSummary {
    pub ticks: u64,
    pub cycles_started: u64,
    pub cycles_succeeded: u64,
    pub cycles_failed: u64,
    /// Ticks dropped because a cycle was still running.
    pub ticks_skipped: u64,
    pub last_cycle: Option<CycleReport>,
}

type CycleHandle = JoinHandle<Result<CycleReport, CoreError>>;

/// Serialized poll loop over a [`Pipeline`].
#[derive(Debug)]
pub struct Poller {
    pipeline: Pipeline,
    interval: Duration,
    state: watch::Sender<PollState>,
}

impl Poller {
    pub fn new(pipeline: Pipeline, interval: Duration) -> Self {
        let (state, _) = watch::channel(PollState::Idle);
        Self {
            pipeline,
            interval,
            state,
        }
    }

    pub fn state(&self) -> watch::Receiver<PollState> {
        self.state.subscribe()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Poll until `cancel` fires. The first cycle starts immediately.
    ///
    /// On cancellation a cycle already in flight is awaited, so its
    /// transaction either commits or rolls back before this returns.
    pub async fn run(self, cancel: CancellationToken) -> PollSummary {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut summary = PollSummary::default();
        let mut in_flight: Option<CycleHandle> = None;

        info!(interval_secs = self.interval.as_secs_f64(), "poller started");

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                joined = join_in_flight(&mut in_flight) => {
                    in_flight = None;
                    self.record(&mut summary, joined);
                }
                _ = ticker.tick() => {
                    summary.ticks += 1;
                    if in_flight.is_some() {
                        warn!(
                            tick = summary.ticks,
                            "previous cycle still running, skipping tick"
                        );
                        summary.ticks_skipped += 1;
                    } else {
                        summary.cycles_started += 1;
                        in_flight = Some(self.spawn_cycle(summary.cycles_started));
                    }
                }
            }
        }

        if let Some(handle) = in_flight.take() {
            info!("waiting for in-flight cycle before stopping");
            let joined = handle.await;
            self.record(&mut summary, joined);
        }

        self.state.send_replace(PollState::Stopped);
        info!(
            cycles = summary.cycles_started,
            failed = summary.cycles_failed,
            skipped = summary.ticks_skipped,
            "poller stopped"
        );
        summary
    }

    fn spawn_cycle(&self, iteration: u64) -> CycleHandle {
        self.state.send_replace(PollState::Running { iteration });
        let pipeline = self.pipeline.clone();
        let span = info_span!("cycle", iteration);
        tokio::task::spawn_blocking(move || span.in_scope(|| pipeline.run_cycle()))
    }

    fn record(
        &self,
        summary: &mut PollSummary,
        joined: Result<Result<CycleReport, CoreError>, JoinError>,
    ) {
        match joined {
            Ok(Ok(report)) => {
                summary.cycles_succeeded += 1;
                summary.last_cycle = Some(report);
            }
            Ok(Err(e)) => {
                error!(error = %e, "cycle failed, data for this cycle discarded");
                summary.cycles_failed += 1;
            }
            Err(e) => {
                error!(error = %e, "cycle task panicked");
                summary.cycles_failed += 1;
            }
        }
        self.state.send_replace(PollState::Idle);
    }
}

/// Resolves when the in-flight cycle finishes; pending when there is none.
async fn join_in_flight(
    slot: &mut Option<CycleHandle>,
) -> Result<Result<CycleReport, CoreError>, JoinError> {
    match slot.as_mut() {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use wlcpoll_api::{MetricReading, MetricSource};

    use super::*;
    use crate::catalog::Catalog;
    use crate::store::SnapshotStore;

    struct Slow {
        delay: Duration,
        active: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    impl Slow {
        fn new(delay: Duration) -> Self {
            Self {
                delay,
                active: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl MetricSource for Slow {
        fn fetch_group(&self, _group: &str) -> Result<Vec<MetricReading>, wlcpoll_api::Error> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(self.delay);
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(vec![MetricReading::octets(
                ".1.3.6.1.4.1.14179.2.2.1.1.3.0.36.151.40.140.113",
                b"AP-Lobby".to_vec(),
            )])
        }
    }

    fn pipeline(source: Arc<Slow>) -> Pipeline {
        let store = SnapshotStore::open_in_memory().unwrap();
        store.ensure_schema().unwrap();
        Pipeline::new(
            source,
            Arc::new(Catalog::wireless_lan_controller()),
            vec![".1.3.6.1.4.1.14179.2.2.1.1.3".into()],
            store,
        )
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn slow_cycles_never_overlap() {
        let source = Arc::new(Slow::new(Duration::from_millis(120)));
        let poller = Poller::new(pipeline(source.clone()), Duration::from_millis(20));

        let cancel = CancellationToken::new();
        let stopper = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(400)).await;
            stopper.cancel();
        });

        let summary = poller.run(cancel).await;

        assert_eq!(source.peak.load(Ordering::SeqCst), 1);
        assert!(summary.ticks_skipped >= 1, "{summary:?}");
        assert!(summary.cycles_started >= 2, "{summary:?}");
        assert_eq!(
            summary.cycles_started,
            summary.cycles_succeeded + summary.cycles_failed
        );
        assert_eq!(summary.cycles_failed, 0);
        assert_eq!(
            u64::try_from(source.calls.load(Ordering::SeqCst)).unwrap(),
            summary.cycles_started
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn cancellation_awaits_in_flight_cycle() {
        let source = Arc::new(Slow::new(Duration::from_millis(150)));
        let poller = Poller::new(pipeline(source.clone()), Duration::from_secs(60));
        let mut state = poller.state();

        let cancel = CancellationToken::new();
        let stopper = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            stopper.cancel();
        });

        let summary = poller.run(cancel).await;
        assert_eq!(summary.cycles_started, 1);
        assert_eq!(summary.cycles_succeeded, 1);
        assert_eq!(summary.last_cycle.unwrap().rows.access_points, 1);
        assert_eq!(*state.borrow_and_update(), PollState::Stopped);
    }

    #[test]
    fn cancelled_before_start_runs_nothing() {
        let source = Arc::new(Slow::new(Duration::ZERO));
        let poller = Poller::new(pipeline(source.clone()), Duration::from_secs(1));
        let state = poller.state();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let summary = tokio_test::block_on(poller.run(cancel));

        assert_eq!(summary.ticks, 0);
        assert_eq!(summary.cycles_started, 0);
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
        assert_eq!(*state.borrow(), PollState::Stopped);
    }

    #[test]
    fn state_labels() {
        assert_eq!(PollState::Idle.to_string(), "idle");
        assert_eq!(PollState::Running { iteration: 3 }.to_string(), "running");
    }
}
