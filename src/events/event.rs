//! # Runtime events emitted by the controller and its workers.
//!
//! [`EventKind`] splits events into three families:
//! - **Run events**: the drain lifecycle of a whole batch (started, drained)
//! - **Task events**: one record's execution (starting, completed,
//!   interrupted, failed)
//! - **Subscriber events**: fan-out diagnostics (panic, overflow)
//!
//! [`Event`] itself is a flat payload: a timestamp, a global sequence number,
//! and optional task name, display arguments, worker id, elapsed/budget
//! durations and reason, filled in per kind.
//!
//! Sequence numbers (`seq`) are issued from one global counter and increase
//! monotonically, so consumers can re-establish the exact publish order even
//! if deliveries interleave.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use taskdrain::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TaskInterrupted)
//!     .with_task("sleep-7")
//!     .with_worker(4)
//!     .with_elapsed(Duration::from_secs(4))
//!     .with_budget(Duration::from_secs(4));
//!
//! assert_eq!(ev.kind, EventKind::TaskInterrupted);
//! assert_eq!(ev.task.as_deref(), Some("sleep-7"));
//! assert_eq!(ev.budget_ms, Some(4_000));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Source of monotonically increasing event sequence numbers.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// The kinds of events the runtime publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// A subscriber's `on_event` panicked; the panic was caught and the
    /// subscriber's worker moved on.
    ///
    /// Sets:
    /// - `task`: the subscriber's name
    /// - `reason`: panic message
    /// - `at`: creation time
    /// - `seq`: global sequence number
    SubscriberPanicked,

    /// An event was dropped for one subscriber (its queue was full or its
    /// worker had already stopped).
    ///
    /// Sets:
    /// - `task`: the subscriber's name
    /// - `reason`: what happened ("queue full", "queue closed")
    /// - `at`: creation time
    /// - `seq`: global sequence number
    SubscriberOverflow,

    // === Run lifecycle events ===
    /// A batch run was accepted and the admission loop is starting.
    ///
    /// Sets:
    /// - `at`: creation time
    /// - `seq`: global sequence number
    RunStarted,

    /// The admission loop drained: no waiting records, no live workers.
    ///
    /// Sets:
    /// - `at`: creation time
    /// - `seq`: global sequence number
    RunDrained,

    // === Task lifecycle events ===
    /// A record was admitted and its worker is starting the execution.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `args`: display arguments, if any
    /// - `worker`: worker id (1-based admission index)
    /// - `at`: creation time
    /// - `seq`: global sequence number
    TaskStarting,

    /// Execution finished within its budget.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `args`: display arguments, if any
    /// - `worker`: worker id
    /// - `elapsed_ms`: measured execution time (ms)
    /// - `at`: creation time
    /// - `seq`: global sequence number
    TaskCompleted,

    /// Execution was cut off at its budget (or finished over budget).
    ///
    /// The record is appended to the interrupted registry before this
    /// event is published.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `args`: display arguments, if any
    /// - `worker`: worker id
    /// - `elapsed_ms`: measured execution time (ms)
    /// - `budget_ms`: configured budget (ms)
    /// - `at`: creation time
    /// - `seq`: global sequence number
    TaskInterrupted,

    /// Execution reported an error or panicked.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `args`: display arguments, if any
    /// - `worker`: worker id
    /// - `elapsed_ms`: measured execution time (ms)
    /// - `reason`: error or panic message
    /// - `at`: creation time
    /// - `seq`: global sequence number
    TaskFailed,
}

/// One runtime event.
///
/// `seq` and `at` are always present; every other field is optional and
/// filled in per [`EventKind`] (see the "Sets:" list on each variant).
#[derive(Clone)]
pub struct Event {
    /// Global sequence number; strictly increasing across all events.
    pub seq: u64,
    /// Wall-clock time the event was created.
    pub at: SystemTime,

    /// Measured execution time, in milliseconds.
    pub elapsed_ms: Option<u32>,
    /// Wall-clock budget the execution ran under, in milliseconds.
    pub budget_ms: Option<u32>,
    /// Human-readable detail (failure message, overflow cause).
    pub reason: Option<Arc<str>>,
    /// Worker id (1-based admission index), if applicable.
    pub worker: Option<u64>,
    /// Task (or subscriber) name, if applicable.
    pub task: Option<Arc<str>>,
    /// Display arguments the record was submitted with, if any.
    pub args: Option<Arc<str>>,
    /// What happened.
    pub kind: EventKind,
}

impl Event {
    /// Creates an event of the given kind, stamped with the current time and
    /// the next global sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            kind,
            at: SystemTime::now(),
            elapsed_ms: None,
            budget_ms: None,
            reason: None,
            worker: None,
            task: None,
            args: None,
        }
    }

    /// Sets the human-readable detail string.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Sets the task (or subscriber) name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Sets the record's display arguments.
    #[inline]
    pub fn with_args(mut self, args: impl Into<Arc<str>>) -> Self {
        self.args = Some(args.into());
        self
    }

    /// Sets the worker id.
    #[inline]
    pub fn with_worker(mut self, id: u64) -> Self {
        self.worker = Some(id);
        self
    }

    /// Sets the measured elapsed time, saturating to `u32::MAX` milliseconds.
    #[inline]
    pub fn with_elapsed(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.elapsed_ms = Some(ms);
        self
    }

    /// Sets the configured budget, saturating to `u32::MAX` milliseconds.
    #[inline]
    pub fn with_budget(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.budget_ms = Some(ms);
        self
    }

    /// Builds the diagnostic event for a delivery dropped on a full or
    /// closed subscriber queue.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_task(subscriber)
            .with_reason(format!("queue {reason}"))
    }

    /// Builds the diagnostic event for a panic caught in a subscriber.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }

    /// True for [`EventKind::SubscriberOverflow`] events.
    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    /// True for [`EventKind::SubscriberPanicked`] events.
    #[inline]
    pub fn is_subscriber_panic(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberPanicked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_is_monotonic() {
        let a = Event::new(EventKind::RunStarted);
        let b = Event::new(EventKind::RunDrained);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn durations_are_stored_as_clamped_millis() {
        let ev = Event::new(EventKind::TaskCompleted)
            .with_elapsed(Duration::from_millis(1_500))
            .with_budget(Duration::from_secs(u64::MAX));
        assert_eq!(ev.elapsed_ms, Some(1_500));
        assert_eq!(ev.budget_ms, Some(u32::MAX));
    }

    #[test]
    fn builders_set_optional_fields() {
        let ev = Event::new(EventKind::TaskFailed)
            .with_task("copy")
            .with_args("--from a --to b")
            .with_worker(3)
            .with_reason("boom");
        assert_eq!(ev.task.as_deref(), Some("copy"));
        assert_eq!(ev.args.as_deref(), Some("--from a --to b"));
        assert_eq!(ev.worker, Some(3));
        assert_eq!(ev.reason.as_deref(), Some("boom"));
        assert!(!ev.is_subscriber_overflow());
    }

    #[test]
    fn overflow_constructor_tags_subscriber() {
        let ev = Event::subscriber_overflow("audit", "full");
        assert!(ev.is_subscriber_overflow());
        assert_eq!(ev.task.as_deref(), Some("audit"));
        assert!(ev.reason.as_deref().unwrap_or("").contains("full"));
    }
}
