//! # Run a single admitted task execution.
//!
//! Each admitted [`TaskRecord`] gets one [`Worker`]: a spawned tokio task
//! that drives the execution under its wall-clock budget, classifies the
//! finish, updates the shared accounting and publishes lifecycle events to
//! the [`Bus`].
//!
//! ## Event flow
//!
//! ```text
//! Admission:
//!   Worker::spawn() → publish TaskStarting (admission order)
//!
//! Within budget:
//!   task future → Ok(()) | Err(Canceled) → completed → publish TaskCompleted
//!
//! Failure:
//!   task future → Err(Fail) or panic → failed → publish TaskFailed
//!
//! Budget exceeded:
//!   timeout fires → cancel child token → interrupted
//!                 → registry append → publish TaskInterrupted
//! ```
//!
//! ## Rules
//! - `TaskStarting` is published **synchronously** by the spawner, so the
//!   global `seq` order of starting events matches admission order.
//! - Exactly one terminal transition per execution: one registry append *or*
//!   one counter bump, plus exactly one terminal event.
//! - The registry append precedes the `TaskInterrupted` event.
//! - The done signal is sent **last**, after the terminal transition, so the
//!   admission loop wakes to fully accounted state.
//! - A finish measured over budget is interrupted even when the timeout did
//!   not fire; a finish at exactly the budget still counts as completed.
//! - Panics unwind into the worker (`catch_unwind`) and classify as failed.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::controller::counters::Counters;
use crate::controller::registry::InterruptedRegistry;
use crate::error::TaskError;
use crate::events::{Bus, Event, EventKind};
use crate::tasks::TaskRecord;

/// Terminal classification of one execution.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// Finished within budget (including graceful `Canceled` exits).
    Completed,
    /// Cut off at the budget, or finished over it.
    Interrupted,
    /// Returned an error or panicked.
    Failed { reason: String },
}

/// Handle to one live execution, owned by the admission loop.
pub(crate) struct Worker {
    name: Arc<str>,
    id: u64,
    handle: JoinHandle<()>,
}

impl Worker {
    /// Publishes `TaskStarting` and spawns the execution task.
    ///
    /// The record is moved into the execution; on interruption it is stored
    /// in `registry` as-is, ready for resubmission.
    pub(crate) fn spawn(
        record: TaskRecord,
        budget: Duration,
        id: u64,
        bus: Bus,
        registry: Arc<InterruptedRegistry>,
        counters: Arc<Counters>,
        done: mpsc::UnboundedSender<()>,
    ) -> Self {
        let ctx = ExecutionCtx {
            name: record.name().into(),
            args: record.args_shared(),
            id,
            budget,
            bus,
            registry,
            counters,
            done,
        };
        let name = Arc::clone(&ctx.name);

        ctx.bus.publish(ctx.base_event(EventKind::TaskStarting));
        let handle = tokio::spawn(run(record, ctx));

        Self { name, id, handle }
    }

    /// Non-blocking liveness probe used by the pruning pass.
    pub(crate) fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub(crate) fn name(&self) -> &Arc<str> {
        &self.name
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    /// Awaits the execution task, surfacing runtime-level join errors.
    pub(crate) async fn join(self) -> Result<(), JoinError> {
        self.handle.await
    }
}

/// Everything an execution needs besides the record itself.
struct ExecutionCtx {
    name: Arc<str>,
    args: Option<Arc<str>>,
    id: u64,
    budget: Duration,
    bus: Bus,
    registry: Arc<InterruptedRegistry>,
    counters: Arc<Counters>,
    done: mpsc::UnboundedSender<()>,
}

impl ExecutionCtx {
    fn base_event(&self, kind: EventKind) -> Event {
        let ev = Event::new(kind)
            .with_task(Arc::clone(&self.name))
            .with_worker(self.id);
        match &self.args {
            Some(args) => ev.with_args(Arc::clone(args)),
            None => ev,
        }
    }

    fn publish_completed(&self, elapsed: Duration) {
        self.counters.record_completed();
        self.bus
            .publish(self.base_event(EventKind::TaskCompleted).with_elapsed(elapsed));
    }

    fn publish_interrupted(&self, record: TaskRecord, elapsed: Duration) {
        self.registry.append(record);
        self.bus.publish(
            self.base_event(EventKind::TaskInterrupted)
                .with_elapsed(elapsed)
                .with_budget(self.budget),
        );
    }

    fn publish_failed(&self, reason: String, elapsed: Duration) {
        self.counters.record_failed();
        self.bus.publish(
            self.base_event(EventKind::TaskFailed)
                .with_elapsed(elapsed)
                .with_reason(reason),
        );
    }
}

/// Drives one execution to its terminal state.
async fn run(record: TaskRecord, ctx: ExecutionCtx) {
    let child = CancellationToken::new();
    let fut = AssertUnwindSafe(record.task().spawn(child.clone())).catch_unwind();

    let started = Instant::now();
    let result = match time::timeout(ctx.budget, fut).await {
        Ok(Ok(finished)) => finished,
        Ok(Err(panic_payload)) => Err(TaskError::Fail {
            error: panic_reason(&*panic_payload),
        }),
        Err(_elapsed) => {
            child.cancel();
            Err(TaskError::Timeout { budget: ctx.budget })
        }
    };
    let elapsed = started.elapsed();

    match classify(result, elapsed, ctx.budget) {
        Outcome::Completed => ctx.publish_completed(elapsed),
        Outcome::Interrupted => ctx.publish_interrupted(record, elapsed),
        Outcome::Failed { reason } => ctx.publish_failed(reason, elapsed),
    }

    // Receiver may already be gone if the caller dropped the controller.
    let _ = ctx.done.send(());
}

/// Maps a finished execution onto its terminal outcome.
///
/// Graceful finishes (`Ok` or `Canceled`) are re-checked against the budget:
/// over-budget finishes are interrupted even if the timeout never fired.
/// The boundary case `elapsed == budget` stays completed.
fn classify(result: Result<(), TaskError>, elapsed: Duration, budget: Duration) -> Outcome {
    match result {
        Err(TaskError::Timeout { .. }) => Outcome::Interrupted,
        Err(TaskError::Fail { error }) => Outcome::Failed { reason: error },
        Ok(()) | Err(TaskError::Canceled) => {
            if elapsed > budget {
                Outcome::Interrupted
            } else {
                Outcome::Completed
            }
        }
    }
}

fn panic_reason(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        format!("panicked: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("panicked: {msg}")
    } else {
        "panicked".to_string()
    }
}
