//! Error types used by the controller and by task executions.
//!
//! Two enums cover the crate:
//!
//! - [`ControllerError`] — misuse of the controller API
//!   (invalid configuration, overlapping runs).
//! - [`TaskError`] — how a single task execution went wrong.
//!
//! Both carry `as_label` (stable snake_case, for metrics) and a display
//! form for humans.
//!
//! Workers never propagate a [`TaskError`] to the caller: they use it to
//! classify the finish (completed, interrupted, failed) and publish an
//! event instead.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the controller.
///
/// These represent misuse of the controller API rather than task failures,
/// such as configuring a zero concurrency ceiling or starting a second run
/// while the first one is still draining.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerError {
    /// Concurrency ceiling was zero; at least one slot is required.
    #[error("max_concurrent must be at least 1")]
    InvalidConcurrency,

    /// Per-task budget was zero; every execution needs a positive wall-clock budget.
    #[error("task budget must be greater than zero")]
    InvalidBudget,

    /// A run is already draining on this controller.
    #[error("a run is already in progress")]
    RunInProgress,
}

impl ControllerError {
    /// Stable snake_case label, suitable as a metric or log field.
    ///
    /// # Example
    /// ```
    /// use taskdrain::ControllerError;
    ///
    /// assert_eq!(ControllerError::RunInProgress.as_label(), "run_in_progress");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ControllerError::InvalidConcurrency => "invalid_concurrency",
            ControllerError::InvalidBudget => "invalid_budget",
            ControllerError::RunInProgress => "run_in_progress",
        }
    }
}

/// # Failure modes of a single task execution.
///
/// These represent failures of individual async tasks driven by workers.
/// `Timeout` is produced by the worker's budget wrapper, the other variants
/// come from the task body itself.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// Task execution exceeded its wall-clock budget.
    #[error("timed out after {budget:?}")]
    Timeout {
        /// The budget duration that was exceeded.
        budget: Duration,
    },

    /// Task execution failed.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Task observed its cancellation token and stopped cooperatively.
    #[error("context cancelled")]
    Canceled,
}

impl TaskError {
    /// Stable snake_case label, suitable as a metric or log field.
    ///
    /// # Example
    /// ```
    /// use taskdrain::TaskError;
    /// use std::time::Duration;
    ///
    /// let err = TaskError::Timeout { budget: Duration::from_secs(4) };
    /// assert_eq!(err.as_label(), "task_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Timeout { .. } => "task_timeout",
            TaskError::Fail { .. } => "task_failed",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Detailed human-readable message, for event payloads.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Timeout { budget } => format!("timeout: {budget:?}"),
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Canceled => "context cancelled".to_string(),
        }
    }
}
