//! # Run accounting: monotonic counters and live gauges.
//!
//! [`Counters`] backs the controller's status surface. Workers bump the
//! terminal counters from their own tasks; the admission loop refreshes the
//! gauges once per pass. Everything is atomic, so readers never contend with
//! the drain.
//!
//! ## Rules
//! - **Monotonic counters** (`admitted`, `completed`, `failed`) only grow for
//!   the lifetime of the controller; they accumulate across runs.
//! - **Gauges** (`waiting`, `running`) describe the current run and both read
//!   zero once a drain finishes.
//! - Interrupted executions are not counted here: the interrupted registry is
//!   their single source of truth.
//! - Every admitted execution lands in exactly one terminal bucket
//!   (completed, interrupted, or failed).

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Atomic counter block shared between the admission loop and its workers.
#[derive(Debug, Default)]
pub(crate) struct Counters {
    admitted: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,

    waiting: AtomicUsize,
    running: AtomicUsize,
}

impl Counters {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records one admission and returns the 1-based admission index.
    ///
    /// The index doubles as the worker id in events.
    pub(crate) fn record_admitted(&self) -> u64 {
        self.admitted.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn set_waiting(&self, n: usize) {
        self.waiting.store(n, Ordering::Relaxed);
    }

    pub(crate) fn set_running(&self, n: usize) {
        self.running.store(n, Ordering::Relaxed);
    }

    pub(crate) fn admitted(&self) -> u64 {
        self.admitted.load(Ordering::Relaxed)
    }

    pub(crate) fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    pub(crate) fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub(crate) fn waiting(&self) -> usize {
        self.waiting.load(Ordering::Relaxed)
    }

    pub(crate) fn running(&self) -> usize {
        self.running.load(Ordering::Relaxed)
    }
}
