//! Task abstractions and records.
//!
//! A [`Task`] is the unit of work: named, async, cancelable through the
//! token it is handed. [`TaskFn`] adapts a plain closure into one, and
//! [`TaskRef`] (`Arc<dyn Task>`) is how tasks travel through the crate.
//! A [`TaskRecord`] pairs a task with display arguments for one queued
//! execution, so the same task can be submitted any number of times.

mod record;
mod task;
mod task_fn;

pub use record::TaskRecord;
pub use task::{BoxTaskFuture, Task, TaskRef};
pub use task_fn::TaskFn;
