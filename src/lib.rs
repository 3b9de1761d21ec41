//! # taskdrain
//!
//! **Taskdrain** is a bounded-concurrency batch runner for Rust.
//!
//! It drains a FIFO queue of async tasks through a fixed number of
//! concurrent workers, cuts each execution off at a per-run wall-clock
//! budget, and keeps an auditable record of everything it interrupted.
//! The crate is designed as a building block for batch pipelines and
//! job-driving agents.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  TaskRecord  │   │  TaskRecord  │   │  TaskRecord  │
//!     │ (batch #1)   │   │ (batch #2)   │   │ (batch #3)   │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Controller (admission loop)                                      │
//! │  - FIFO queue (pending records, admitted oldest-first)            │
//! │  - Bus (broadcast events)                                         │
//! │  - Counters (admitted/completed/failed + waiting/running gauges)  │
//! │  - InterruptedRegistry (records cut off by the budget)            │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        ▼                  ▼                  ▼               │
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   │
//!     │    Worker    │   │    Worker    │   │    Worker    │   │
//!     │ (≤ ceiling)  │   │ (≤ ceiling)  │   │ (≤ ceiling)  │   │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘   │
//!      │                  │                  │                 │
//!      │ Publishes        │ Publishes        │ Publishes       │
//!      │ Events:          │ Events:          │ Events:         │
//!      │ - TaskStarting   │ - TaskStarting   │ - TaskStarting  │
//!      │ - TaskCompleted  │ - TaskInterrupted│ - TaskFailed    │
//!      │                  │                  │                 │
//!      ▼                  ▼                  ▼                 ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │              (capacity: ControllerConfig::bus_capacity)           │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │      event pump        │
//!                       │ (owned by the builder) │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                           (per-sub queues)
//!                         ┌─────────┼─────────┐
//!                         ▼         ▼         ▼
//!                         worker1  worker2  workerN
//!                         ▼         ▼         ▼
//!                    sub1.on   sub2.on   subN.on
//!                     _event()  _event()  _event()
//! ```
//!
//! ### Lifecycle
//! ```text
//! TaskRecord[] ──► Controller::start(records, budget)
//!
//! reject if a run is already draining, publish RunStarted, then:
//!
//! loop {
//!   ├─► prune: collect workers whose handle has finished
//!   ├─► admit: pop_front while running < ceiling
//!   │       └─ publish TaskStarting{ task, worker }
//!   ├─► refresh waiting/running gauges
//!   ├─► exit when queue and workers are both empty
//!   └─► park until a worker signals done (or a poll tick elapses)
//! }
//!
//! publish RunDrained
//!
//! Each worker runs its task under the budget and classifies the outcome:
//!   ├─ finished in time      ─► TaskCompleted
//!   ├─ budget elapsed        ─► cancel the task's token, record in the
//!   │                           interrupted registry, TaskInterrupted
//!   └─ error or panic        ─► TaskFailed{ reason }
//! ```
//!
//! Interrupting a task never aborts the run: the queue keeps draining and
//! the interruption is visible afterwards through
//! [`Controller::interrupted_tasks`].
//!
//! ## Features
//! | Area               | Description                                                             | Key types / traits                      |
//! |--------------------|-------------------------------------------------------------------------|-----------------------------------------|
//! | **Batch draining** | Run a FIFO batch under a fixed concurrency ceiling.                     | [`Controller`], [`ControllerBuilder`]   |
//! | **Budgets**        | Interrupt executions at a per-run wall-clock budget.                    | [`ControllerConfig`], [`TaskError`]     |
//! | **Tasks**          | Define tasks as trait impls or plain async closures.                    | [`Task`], [`TaskFn`], [`TaskRecord`]    |
//! | **Subscriber API** | Hook into run/task lifecycle events (logging, metrics, custom sinks).  | [`Subscribe`]                           |
//! | **Events**         | Sequenced lifecycle events over a broadcast bus.                        | [`Event`], [`EventKind`]                |
//! | **Errors**         | Typed errors for controller misuse and task execution.                  | [`ControllerError`], [`TaskError`]      |
//!
//! ## Optional features
//! - `logging`: ships [`LogWriter`], a one-line-per-event stdout subscriber.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use taskdrain::{Controller, ControllerConfig, TaskFn, TaskRecord, TaskRef};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = ControllerConfig::default();
//!     cfg.max_concurrent = 2;
//!
//!     // Optional stdout logging of every event
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn taskdrain::Subscribe>> = {
//!         use taskdrain::LogWriter;
//!         vec![Arc::new(LogWriter::default())]
//!     };
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn taskdrain::Subscribe>> = Vec::new();
//!
//!     // Create the controller
//!     let controller = Controller::builder(cfg)
//!         .with_subscribers(subs)
//!         .build()?;
//!
//!     // A task that finishes well inside the budget
//!     let quick: TaskRef = TaskFn::arc("quick", |_ctx: CancellationToken| async move {
//!         tokio::time::sleep(Duration::from_millis(5)).await;
//!         Ok(())
//!     });
//!
//!     // A task that would run forever; the budget cuts it off
//!     let slow: TaskRef = TaskFn::arc("slow", |ctx: CancellationToken| async move {
//!         tokio::select! {
//!             _ = tokio::time::sleep(Duration::from_secs(10)) => Ok(()),
//!             _ = ctx.cancelled() => Err(taskdrain::TaskError::Canceled),
//!         }
//!     });
//!
//!     let records = vec![
//!         TaskRecord::new(quick),
//!         TaskRecord::new(slow).with_args("--full-scan"),
//!     ];
//!     controller.start(records, Duration::from_millis(100)).await?;
//!     controller.wait().await;
//!
//!     assert_eq!(controller.completed_count(), 1);
//!     assert_eq!(controller.interrupted_count(), 1);
//!     assert_eq!(controller.interrupted_tasks()[0].name(), "slow");
//!     Ok(())
//! }
//! ```
mod controller;
mod error;
mod events;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use controller::{Controller, ControllerBuilder, ControllerConfig};
pub use error::{ControllerError, TaskError};
pub use events::{Event, EventKind};
pub use subscribers::Subscribe;
pub use tasks::{BoxTaskFuture, Task, TaskFn, TaskRecord, TaskRef};

// Built-in stdout subscriber, behind `--features logging`.
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
