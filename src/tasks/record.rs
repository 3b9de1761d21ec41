//! # Task record submitted to the controller.
//!
//! Defines [`TaskRecord`] an immutable bundle that describes one queued
//! execution: the task itself plus an optional display-only argument string.
//!
//! ## Rules
//! - Records are handed to [`Controller::start`](crate::Controller::start)
//!   in submission order; that order is the admission order.
//! - The argument string is **never** interpreted by the controller. It only
//!   surfaces in events and in the interrupted registry so that operators
//!   can tell otherwise identically named tasks apart.
//! - Interrupted records are stored whole, so a record can be resubmitted
//!   to a later run as-is.

use std::sync::Arc;

use crate::tasks::task::TaskRef;

/// One queued execution: a task plus optional display arguments.
///
/// Cloning is cheap (the task is behind an `Arc`, the arguments are an
/// `Arc<str>`), and clones share the same underlying task.
///
/// ## Example
/// ```rust
/// use tokio_util::sync::CancellationToken;
/// use taskdrain::{TaskFn, TaskRecord, TaskRef, TaskError};
///
/// let copy: TaskRef = TaskFn::arc("copy", |_ctx: CancellationToken| async move {
///     Ok::<(), TaskError>(())
/// });
///
/// let record = TaskRecord::new(copy).with_args("--from /a --to /b");
/// assert_eq!(record.name(), "copy");
/// assert_eq!(record.args(), Some("--from /a --to /b"));
/// ```
#[derive(Clone)]
pub struct TaskRecord {
    task: TaskRef,
    args: Option<Arc<str>>,
}

impl TaskRecord {
    /// Creates a record with no display arguments.
    pub fn new(task: TaskRef) -> Self {
        Self { task, args: None }
    }

    /// Attaches a display-only argument string.
    pub fn with_args(mut self, args: impl Into<Arc<str>>) -> Self {
        self.args = Some(args.into());
        self
    }

    /// The task this record will execute.
    pub fn task(&self) -> &TaskRef {
        &self.task
    }

    /// Shorthand for the task's name.
    pub fn name(&self) -> &str {
        self.task.name()
    }

    /// Returns the display arguments, if any.
    pub fn args(&self) -> Option<&str> {
        self.args.as_deref()
    }

    /// Returns the display arguments as a shared handle for event payloads.
    pub(crate) fn args_shared(&self) -> Option<Arc<str>> {
        self.args.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskFn;
    use tokio_util::sync::CancellationToken;

    fn noop(name: &'static str) -> TaskRef {
        TaskFn::arc(name, |_ctx: CancellationToken| async { Ok(()) })
    }

    #[test]
    fn name_comes_from_the_task() {
        let record = TaskRecord::new(noop("verify"));
        assert_eq!(record.name(), "verify");
        assert_eq!(record.args(), None);
    }

    #[test]
    fn clones_share_the_task() {
        let record = TaskRecord::new(noop("shared")).with_args("-v");
        let copy = record.clone();
        assert!(Arc::ptr_eq(record.task(), copy.task()));
        assert_eq!(copy.args(), Some("-v"));
    }
}
