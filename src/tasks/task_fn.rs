//! # Closure-backed tasks.
//!
//! [`TaskFn`] turns a plain closure into a [`Task`]. The closure runs once
//! per execution and hands back the future to drive, so consecutive
//! executions never share hidden state; anything that must be shared goes
//! into an explicit `Arc` captured by the closure.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use taskdrain::{TaskFn, TaskRef, TaskError};
//!
//! let reindex: TaskRef = TaskFn::arc("reindex", |ctx: CancellationToken| async move {
//!     if ctx.is_cancelled() {
//!         return Err(TaskError::Canceled);
//!     }
//!     // rebuild the index...
//!     Ok(())
//! });
//!
//! assert_eq!(reindex.name(), "reindex");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::tasks::task::{BoxTaskFuture, Task};

/// A [`Task`] backed by a closure.
///
/// The closure builds a fresh execution future each time the task is
/// spawned.
#[derive(Debug)]
pub struct TaskFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> TaskFn<F> {
    /// Wraps a closure under the given task name.
    ///
    /// Use [`TaskFn::arc`] when you need a [`TaskRef`](crate::TaskRef)
    /// directly.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Wraps a closure and returns it ready to submit (`Arc<dyn Task>`).
    ///
    /// ## Example
    /// ```rust
    /// use tokio_util::sync::CancellationToken;
    /// use taskdrain::{TaskFn, TaskRef, TaskError};
    ///
    /// let noop: TaskRef = TaskFn::arc("noop", |_ctx: CancellationToken| async {
    ///     Ok::<_, TaskError>(())
    /// });
    /// assert_eq!(noop.name(), "noop");
    /// ```
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F, Fut> Task for TaskFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn spawn(&self, ctx: CancellationToken) -> BoxTaskFuture {
        let fut = (self.f)(ctx);
        Box::pin(fut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::task::TaskRef;

    #[tokio::test]
    async fn spawn_produces_independent_futures() {
        let task = TaskFn::new("count", |_ctx: CancellationToken| async { Ok(()) });
        let a = task.spawn(CancellationToken::new());
        let b = task.spawn(CancellationToken::new());
        assert!(a.await.is_ok());
        assert!(b.await.is_ok());
    }

    #[tokio::test]
    async fn owned_name_is_supported() {
        let task: TaskRef = TaskFn::arc(format!("job-{}", 7), |_ctx: CancellationToken| async {
            Ok(())
        });
        assert_eq!(task.name(), "job-7");
    }
}
