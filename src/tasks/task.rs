//! # Task abstraction.
//!
//! [`Task`] is the unit of work the controller drains. Alongside it live
//! [`BoxTaskFuture`], the boxed future a worker drives, and [`TaskRef`],
//! the `Arc<dyn Task>` handle everything else passes around.
//!
//! A task receives a [`CancellationToken`] and should check it at natural
//! pause points so it can stop cooperatively once its budget is gone.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Boxed execution future produced by [`Task::spawn`].
pub type BoxTaskFuture = Pin<Box<dyn Future<Output = Result<(), TaskError>> + Send + 'static>>;

/// Shared reference to a task (`Arc<dyn Task>`).
pub type TaskRef = Arc<dyn Task>;

/// # A named, cancelable unit of async work.
///
/// A `Task` has a stable [`name`](Task::name) and a [`spawn`](Task::spawn)
/// method that produces a **fresh** execution future per call. The worker
/// driving the future enforces the wall-clock budget; the token it passes in
/// is cancelled when the budget elapses, so long-running tasks that spawn
/// inner work should watch it and wind down promptly.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use taskdrain::{BoxTaskFuture, Task, TaskError};
///
/// struct Probe;
///
/// impl Task for Probe {
///     fn name(&self) -> &str { "probe" }
///
///     fn spawn(&self, ctx: CancellationToken) -> BoxTaskFuture {
///         Box::pin(async move {
///             if ctx.is_cancelled() {
///                 return Err(TaskError::Canceled);
///             }
///             // ping the endpoint...
///             Ok(())
///         })
///     }
/// }
/// ```
pub trait Task: Send + Sync + 'static {
    /// Stable, human-readable name; also the identifier reported in events.
    fn name(&self) -> &str;

    /// Produces a new execution future.
    ///
    /// Each call owns its own state; the controller calls this exactly once
    /// per admitted record.
    fn spawn(&self, ctx: CancellationToken) -> BoxTaskFuture;
}
