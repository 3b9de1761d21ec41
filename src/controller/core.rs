//! # Controller: bounded-concurrency FIFO drain with per-task budgets.
//!
//! The [`Controller`] owns the event bus, the shared accounting, and the
//! registry of interrupted records. [`Controller::start`] runs one batch to
//! exhaustion: it admits records in submission order while holding live
//! concurrency at the configured ceiling, gives every execution the same
//! wall-clock budget, and returns once nothing is waiting and nothing runs.
//!
//! ## Admission loop
//! ```text
//! start(records, budget):
//!   pending:  [r0, r1, r2, ...]          (FIFO, submission order)
//!   inflight: []                          (≤ max_concurrent workers)
//!
//!   loop:
//!     prune()   JoinHandle::is_finished() ──► retire to `finished`
//!     admit()   while inflight < ceiling ──► Worker::spawn(record, budget)
//!     refresh gauges (waiting / running)
//!     done? ──► break
//!     park  ──► done signal │ poll interval   (whichever first)
//!
//!   publish RunDrained
//! ```
//!
//! ## Rules
//! - **Single admitter**: only the `start` call spawns workers, so the
//!   ceiling can never be overshot.
//! - **FIFO**: records are admitted in submission order and never reordered;
//!   a freed slot goes to the oldest waiting record.
//! - **One execution per record**: interrupted work is recorded, never
//!   respawned within the run.
//! - **Exclusive runs**: a second `start` (or a ceiling change) while
//!   draining returns [`ControllerError::RunInProgress`].
//! - **Cumulative accounting**: counters and the interrupted registry
//!   accumulate across runs on the same controller; the gauges read zero
//!   between runs.
//! - The park interval bounds the stall when a completion signal races ahead
//!   of the join handle flipping to finished.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time;
use tokio_util::sync::DropGuard;

use crate::controller::builder::ControllerBuilder;
use crate::controller::config::ControllerConfig;
use crate::controller::counters::Counters;
use crate::controller::registry::InterruptedRegistry;
use crate::controller::worker::Worker;
use crate::error::ControllerError;
use crate::events::{Bus, Event, EventKind};
use crate::tasks::TaskRecord;

/// Bounded-concurrency batch runner.
///
/// Construct via [`Controller::new`] or [`Controller::builder`]; both return
/// an `Arc` so the controller can be shared with status readers while a
/// drain is in flight.
pub struct Controller {
    cfg: ControllerConfig,
    max_concurrent: AtomicUsize,
    draining: AtomicBool,
    bus: Bus,
    counters: Arc<Counters>,
    registry: Arc<InterruptedRegistry>,
    finished: Mutex<Vec<Worker>>,
    _pump_guard: DropGuard,
}

/// Clears the draining flag when the run unwinds or returns.
struct DrainFlag<'a>(&'a AtomicBool);

impl Drop for DrainFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Controller {
    /// Returns a builder for wiring subscribers before construction.
    pub fn builder(cfg: ControllerConfig) -> ControllerBuilder {
        ControllerBuilder::new(cfg)
    }

    /// Creates a controller with no subscribers.
    ///
    /// Must be called within a Tokio runtime (the event pipeline is spawned
    /// here).
    pub fn new(cfg: ControllerConfig) -> Result<Arc<Self>, ControllerError> {
        Self::builder(cfg).build()
    }

    pub(crate) fn new_internal(cfg: ControllerConfig, bus: Bus, pump_guard: DropGuard) -> Arc<Self> {
        let max_concurrent = AtomicUsize::new(cfg.max_concurrent);
        Arc::new(Self {
            cfg,
            max_concurrent,
            draining: AtomicBool::new(false),
            bus,
            counters: Arc::new(Counters::new()),
            registry: Arc::new(InterruptedRegistry::new()),
            finished: Mutex::new(Vec::new()),
            _pump_guard: pump_guard,
        })
    }

    /// Runs one batch to exhaustion and returns when it has drained.
    ///
    /// Every record gets the same per-execution wall-clock `budget`.
    /// Completion order depends on execution times; admission order is
    /// strictly the submission order.
    ///
    /// # Errors
    /// - [`ControllerError::InvalidBudget`] if `budget` is zero
    /// - [`ControllerError::RunInProgress`] if another run is draining
    pub async fn start(
        &self,
        records: Vec<TaskRecord>,
        budget: Duration,
    ) -> Result<(), ControllerError> {
        if budget.is_zero() {
            return Err(ControllerError::InvalidBudget);
        }
        if self
            .draining
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ControllerError::RunInProgress);
        }
        let _draining = DrainFlag(&self.draining);

        let ceiling = self.max_concurrent.load(Ordering::Acquire);
        let park = self.cfg.poll_interval_clamped();
        let (done_tx, mut done_rx) = mpsc::unbounded_channel();

        let mut pending: VecDeque<TaskRecord> = records.into();
        let mut inflight: Vec<Worker> = Vec::with_capacity(ceiling);

        self.counters.set_waiting(pending.len());
        self.bus.publish(Event::new(EventKind::RunStarted));

        loop {
            self.prune(&mut inflight);
            self.admit(&mut pending, &mut inflight, ceiling, budget, &done_tx);

            self.counters.set_waiting(pending.len());
            self.counters.set_running(inflight.len());

            if pending.is_empty() && inflight.is_empty() {
                break;
            }

            tokio::select! {
                _ = done_rx.recv() => {}
                _ = time::sleep(park) => {}
            }
        }

        self.bus.publish(Event::new(EventKind::RunDrained));
        Ok(())
    }

    /// Retires every worker whose join handle reports finished.
    ///
    /// Retired workers keep their handles in `finished` so [`Controller::wait`]
    /// can join them later; pruning itself never blocks.
    fn prune(&self, inflight: &mut Vec<Worker>) {
        let mut i = 0;
        while i < inflight.len() {
            if inflight[i].is_finished() {
                let worker = inflight.swap_remove(i);
                self.lock_finished().push(worker);
            } else {
                i += 1;
            }
        }
    }

    /// Admits waiting records, oldest first, until the ceiling is reached.
    fn admit(
        &self,
        pending: &mut VecDeque<TaskRecord>,
        inflight: &mut Vec<Worker>,
        ceiling: usize,
        budget: Duration,
        done: &mpsc::UnboundedSender<()>,
    ) {
        while inflight.len() < ceiling {
            let Some(record) = pending.pop_front() else {
                break;
            };
            let id = self.counters.record_admitted();
            inflight.push(Worker::spawn(
                record,
                budget,
                id,
                self.bus.clone(),
                Arc::clone(&self.registry),
                Arc::clone(&self.counters),
                done.clone(),
            ));
        }
    }

    /// Joins every worker retired by past runs.
    ///
    /// Outcomes were already classified when the workers finished, so this
    /// only releases the join handles. A join error (a worker task aborted
    /// by the runtime) is surfaced as a `TaskFailed` event.
    pub async fn wait(&self) {
        let retired: Vec<Worker> = self.lock_finished().drain(..).collect();
        for worker in retired {
            let name = Arc::clone(worker.name());
            let id = worker.id();
            if let Err(err) = worker.join().await {
                self.bus.publish(
                    Event::new(EventKind::TaskFailed)
                        .with_task(name)
                        .with_worker(id)
                        .with_reason(format!("worker join error: {err}")),
                );
            }
        }
    }

    /// Replaces the concurrency ceiling for subsequent runs.
    ///
    /// # Errors
    /// - [`ControllerError::InvalidConcurrency`] if `ceiling` is zero
    /// - [`ControllerError::RunInProgress`] while a run is draining
    pub fn set_max_concurrent(&self, ceiling: usize) -> Result<(), ControllerError> {
        if ceiling == 0 {
            return Err(ControllerError::InvalidConcurrency);
        }
        if self.is_draining() {
            return Err(ControllerError::RunInProgress);
        }
        self.max_concurrent.store(ceiling, Ordering::Release);
        Ok(())
    }

    /// Current concurrency ceiling.
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent.load(Ordering::Acquire)
    }

    /// Whether a run is draining right now.
    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Acquire)
    }

    /// Records of the current run still waiting for admission.
    pub fn waiting_count(&self) -> usize {
        self.counters.waiting()
    }

    /// Live workers of the current run.
    pub fn running_count(&self) -> usize {
        self.counters.running()
    }

    /// Total records admitted by this controller, across runs.
    pub fn admitted_count(&self) -> u64 {
        self.counters.admitted()
    }

    /// Executions that finished within budget, across runs.
    pub fn completed_count(&self) -> u64 {
        self.counters.completed()
    }

    /// Executions that errored or panicked, across runs.
    pub fn failed_count(&self) -> u64 {
        self.counters.failed()
    }

    /// Executions cut off at (or measured over) their budget, across runs.
    pub fn interrupted_count(&self) -> usize {
        self.registry.len()
    }

    /// Snapshot of the interrupted records, in interruption order.
    ///
    /// Records are returned whole and can be resubmitted to a later run.
    pub fn interrupted_tasks(&self) -> Vec<TaskRecord> {
        self.registry.snapshot()
    }

    fn lock_finished(&self) -> MutexGuard<'_, Vec<Worker>> {
        self.finished.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use crate::subscribers::Subscribe;
    use crate::tasks::TaskFn;
    use async_trait::async_trait;
    use tokio_util::sync::CancellationToken;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    fn config(ceiling: usize) -> ControllerConfig {
        ControllerConfig {
            max_concurrent: ceiling,
            ..ControllerConfig::default()
        }
    }

    fn sleeper(name: String, dur: Duration) -> TaskRecord {
        TaskRecord::new(TaskFn::arc(name, move |_ctx: CancellationToken| async move {
            time::sleep(dur).await;
            Ok(())
        }))
    }

    fn failing(name: &'static str, reason: &'static str) -> TaskRecord {
        TaskRecord::new(TaskFn::arc(name, move |_ctx: CancellationToken| async move {
            Err(TaskError::Fail {
                error: reason.to_string(),
            })
        }))
    }

    fn panicking(name: &'static str) -> TaskRecord {
        TaskRecord::new(TaskFn::arc(name, |_ctx: CancellationToken| async {
            panic!("kaboom")
        }))
    }

    fn graceful(name: &'static str) -> TaskRecord {
        TaskRecord::new(TaskFn::arc(name, |_ctx: CancellationToken| async {
            Err(TaskError::Canceled)
        }))
    }

    #[tokio::test(start_paused = true)]
    async fn drains_mixed_batch_with_ceiling_two() {
        let ctrl = Controller::new(config(2)).unwrap();
        let records: Vec<TaskRecord> = [2u64, 5, 3, 7, 1]
            .iter()
            .map(|s| sleeper(format!("sleep-{s}"), secs(*s)))
            .collect();

        ctrl.start(records, secs(4)).await.unwrap();
        ctrl.wait().await;

        assert_eq!(ctrl.admitted_count(), 5);
        assert_eq!(ctrl.completed_count(), 3);
        assert_eq!(ctrl.interrupted_count(), 2);
        assert_eq!(ctrl.failed_count(), 0);
        assert_eq!(ctrl.waiting_count(), 0);
        assert_eq!(ctrl.running_count(), 0);

        let snapshot = ctrl.interrupted_tasks();
        let names: Vec<String> = snapshot.iter().map(|r| r.name().to_string()).collect();
        assert_eq!(names, vec!["sleep-5", "sleep-7"]);
    }

    #[tokio::test(start_paused = true)]
    async fn sequential_drain_preserves_fifo() {
        let ctrl = Controller::new(config(1)).unwrap();
        let log = Arc::new(Mutex::new(Vec::<String>::new()));

        let records: Vec<TaskRecord> = (0..4)
            .map(|i| {
                let log = Arc::clone(&log);
                let name = format!("job-{i}");
                let tag = name.clone();
                TaskRecord::new(TaskFn::arc(name, move |_ctx: CancellationToken| {
                    let log = Arc::clone(&log);
                    let tag = tag.clone();
                    async move {
                        log.lock().unwrap().push(tag);
                        Ok(())
                    }
                }))
            })
            .collect();

        ctrl.start(records, secs(1)).await.unwrap();

        let seen = log.lock().unwrap().clone();
        assert_eq!(seen, vec!["job-0", "job-1", "job-2", "job-3"]);
    }

    #[tokio::test(start_paused = true)]
    async fn ceiling_bounds_concurrency() {
        let ctrl = Controller::new(config(2)).unwrap();
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let records: Vec<TaskRecord> = (0..6)
            .map(|i| {
                let active = Arc::clone(&active);
                let peak = Arc::clone(&peak);
                TaskRecord::new(TaskFn::arc(
                    format!("load-{i}"),
                    move |_ctx: CancellationToken| {
                        let active = Arc::clone(&active);
                        let peak = Arc::clone(&peak);
                        async move {
                            let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                            peak.fetch_max(now, Ordering::SeqCst);
                            time::sleep(ms(50)).await;
                            active.fetch_sub(1, Ordering::SeqCst);
                            Ok(())
                        }
                    },
                ))
            })
            .collect();

        let runner = Arc::clone(&ctrl);
        let run = tokio::spawn(async move { runner.start(records, secs(1)).await });

        let mut max_running = 0;
        while !run.is_finished() {
            max_running = max_running.max(ctrl.running_count());
            time::sleep(ms(10)).await;
        }
        run.await.unwrap().unwrap();

        assert_eq!(peak.load(Ordering::SeqCst), 2);
        assert!(max_running <= 2, "running gauge exceeded ceiling: {max_running}");
    }

    // Same property as above, but on a real multi-threaded runtime with
    // wall-clock sleeps, so the atomics are exercised under true parallelism.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn ceiling_holds_on_a_multithreaded_runtime() {
        let ctrl = Controller::new(config(3)).unwrap();
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let records: Vec<TaskRecord> = (0..24)
            .map(|i| {
                let active = Arc::clone(&active);
                let peak = Arc::clone(&peak);
                TaskRecord::new(TaskFn::arc(
                    format!("load-{i}"),
                    move |_ctx: CancellationToken| {
                        let active = Arc::clone(&active);
                        let peak = Arc::clone(&peak);
                        async move {
                            let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                            peak.fetch_max(now, Ordering::SeqCst);
                            time::sleep(ms(10)).await;
                            active.fetch_sub(1, Ordering::SeqCst);
                            Ok(())
                        }
                    },
                ))
            })
            .collect();

        ctrl.start(records, secs(5)).await.unwrap();
        ctrl.wait().await;

        let peak = peak.load(Ordering::SeqCst);
        assert!(peak <= 3, "ceiling overshot: {peak}");
        assert_eq!(ctrl.admitted_count(), 24);
        assert_eq!(ctrl.completed_count(), 24);
        assert_eq!(ctrl.interrupted_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn terminal_accounting_is_complete() {
        let ctrl = Controller::new(config(2)).unwrap();
        let records = vec![
            sleeper("quick".to_string(), ms(10)),
            sleeper("stuck".to_string(), secs(10)),
            failing("broken", "disk offline"),
            panicking("explosive"),
            graceful("polite"),
        ];

        ctrl.start(records, ms(100)).await.unwrap();
        ctrl.wait().await;

        assert_eq!(ctrl.admitted_count(), 5);
        assert_eq!(ctrl.completed_count(), 2); // quick + polite
        assert_eq!(ctrl.interrupted_count(), 1); // stuck
        assert_eq!(ctrl.failed_count(), 2); // broken + explosive
        assert_eq!(
            ctrl.completed_count() + ctrl.interrupted_count() as u64 + ctrl.failed_count(),
            ctrl.admitted_count()
        );

        // Status reads are idempotent once drained.
        assert_eq!(ctrl.completed_count(), 2);
        assert_eq!(ctrl.interrupted_count(), 1);
        assert_eq!(ctrl.interrupted_tasks()[0].name(), "stuck");
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_run_is_rejected() {
        let ctrl = Controller::new(config(1)).unwrap();
        let records = vec![sleeper("slow".to_string(), ms(500))];

        let runner = Arc::clone(&ctrl);
        let run = tokio::spawn(async move { runner.start(records, secs(10)).await });
        time::sleep(ms(50)).await;

        assert!(ctrl.is_draining());
        assert_eq!(
            ctrl.start(Vec::new(), secs(1)).await.unwrap_err(),
            ControllerError::RunInProgress
        );
        assert_eq!(
            ctrl.set_max_concurrent(4).unwrap_err(),
            ControllerError::RunInProgress
        );

        run.await.unwrap().unwrap();
        assert!(!ctrl.is_draining());

        ctrl.set_max_concurrent(4).unwrap();
        assert_eq!(ctrl.max_concurrent(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn rejects_invalid_parameters() {
        assert_eq!(
            Controller::new(config(0)).err(),
            Some(ControllerError::InvalidConcurrency)
        );

        let ctrl = Controller::new(config(1)).unwrap();
        let err = ctrl
            .start(vec![sleeper("never".to_string(), ms(10))], Duration::ZERO)
            .await
            .unwrap_err();
        assert_eq!(err, ControllerError::InvalidBudget);
        assert_eq!(ctrl.admitted_count(), 0);
        assert!(!ctrl.is_draining());

        assert_eq!(
            ctrl.set_max_concurrent(0).unwrap_err(),
            ControllerError::InvalidConcurrency
        );
    }

    #[tokio::test(start_paused = true)]
    async fn empty_batch_drains_immediately() {
        let ctrl = Controller::new(config(3)).unwrap();
        ctrl.start(Vec::new(), secs(1)).await.unwrap();
        ctrl.wait().await;

        assert_eq!(ctrl.admitted_count(), 0);
        assert_eq!(ctrl.waiting_count(), 0);
        assert_eq!(ctrl.running_count(), 0);
        assert!(!ctrl.is_draining());
    }

    #[tokio::test(start_paused = true)]
    async fn counters_accumulate_across_runs() {
        let ctrl = Controller::new(config(2)).unwrap();

        ctrl.start(
            vec![
                sleeper("a".to_string(), ms(10)),
                sleeper("b".to_string(), ms(10)),
            ],
            secs(1),
        )
        .await
        .unwrap();
        assert_eq!(ctrl.completed_count(), 2);

        ctrl.start(
            vec![
                sleeper("c".to_string(), ms(10)),
                sleeper("d".to_string(), secs(30)),
            ],
            ms(100),
        )
        .await
        .unwrap();
        ctrl.wait().await;

        assert_eq!(ctrl.admitted_count(), 4);
        assert_eq!(ctrl.completed_count(), 3);
        assert_eq!(ctrl.interrupted_count(), 1);
        assert_eq!(ctrl.interrupted_tasks()[0].name(), "d");
    }

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(u64, EventKind)>>,
    }

    impl Recorder {
        fn snapshot(&self) -> Vec<(u64, EventKind)> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, event: &Event) {
            self.seen.lock().unwrap().push((event.seq, event.kind));
        }
        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn events_reach_subscribers_in_seq_order() {
        let recorder = Arc::new(Recorder::default());
        let ctrl = Controller::builder(config(2))
            .with_subscribers(vec![recorder.clone() as Arc<dyn Subscribe>])
            .build()
            .unwrap();

        let records = vec![
            sleeper("fast".to_string(), ms(10)),
            sleeper("late".to_string(), secs(5)),
            sleeper("mid".to_string(), ms(20)),
        ];
        ctrl.start(records, ms(100)).await.unwrap();

        // Delivery is asynchronous; give the pump and the subscriber worker
        // a bounded number of passes to flush.
        let expected = 1 + 3 + 3 + 1; // RunStarted + starting + terminal + RunDrained
        for _ in 0..200 {
            if recorder.snapshot().len() >= expected {
                break;
            }
            time::sleep(ms(5)).await;
        }

        let seen = recorder.snapshot();
        assert_eq!(seen.len(), expected);
        assert_eq!(seen.first().map(|(_, k)| *k), Some(EventKind::RunStarted));
        assert_eq!(seen.last().map(|(_, k)| *k), Some(EventKind::RunDrained));

        let starting = seen
            .iter()
            .filter(|(_, k)| *k == EventKind::TaskStarting)
            .count();
        let completed = seen
            .iter()
            .filter(|(_, k)| *k == EventKind::TaskCompleted)
            .count();
        let interrupted = seen
            .iter()
            .filter(|(_, k)| *k == EventKind::TaskInterrupted)
            .count();
        assert_eq!(starting, 3);
        assert_eq!(completed, 2);
        assert_eq!(interrupted, 1);

        for pair in seen.windows(2) {
            assert!(pair[0].0 < pair[1].0, "event seq went backwards");
        }
    }
}
