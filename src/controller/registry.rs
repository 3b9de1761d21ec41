//! # Registry of interrupted task records.
//!
//! [`InterruptedRegistry`] collects the [`TaskRecord`]s whose executions were
//! cut off at their budget (or finished over it). Workers append from their
//! own tasks; callers snapshot the list to inspect or resubmit the records.
//!
//! ## Rules
//! - **Append-only**: the registry never shrinks for the lifetime of the
//!   controller, so `len()` is a monotone interrupted counter.
//! - **Append precedes the event**: a worker appends the record *before*
//!   publishing `TaskInterrupted`, so a subscriber that observes the event
//!   will find the record already present.
//! - Records are stored whole and cloned out on snapshot; a snapshot can be
//!   fed straight back into a later run.

use std::sync::{Mutex, PoisonError};

use crate::tasks::TaskRecord;

/// Append-only list of interrupted records, shared between workers.
#[derive(Default)]
pub(crate) struct InterruptedRegistry {
    entries: Mutex<Vec<TaskRecord>>,
}

impl InterruptedRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Appends one interrupted record.
    pub(crate) fn append(&self, record: TaskRecord) {
        self.lock().push(record);
    }

    /// Number of interrupted records so far.
    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    /// Clones the current contents, in interruption order.
    pub(crate) fn snapshot(&self) -> Vec<TaskRecord> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<TaskRecord>> {
        // Appends cannot leave the vec inconsistent, so a poisoned lock is
        // still safe to reuse.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
