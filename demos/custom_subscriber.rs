//! # Example: custom_subscriber
//!
//! Attaches a hand-rolled subscriber that prints every lifecycle event.
//!
//! Covers:
//! - Implementing the [`Subscribe`] trait.
//! - Reading [`Event`] / [`EventKind`] payload fields per kind.
//! - Wiring the subscriber into [`Controller::builder`].
//!
//! ## Flow
//! ```text
//! TaskRecord[] ──► Controller::start()
//!     ├─► publish(RunStarted)
//!     ├─► Worker::spawn()
//!     │     ├─► publish(TaskStarting)
//!     │     └─► publish(TaskCompleted | TaskInterrupted | TaskFailed)
//!     ├─► publish(RunDrained)
//!     └─► event pump ──► SubscriberSet.emit() ──► EventPrinter.on_event()
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example custom_subscriber
//! ```

use std::{sync::Arc, time::Duration};
use taskdrain::{
    Controller, ControllerConfig, Event, EventKind, Subscribe, TaskError, TaskFn, TaskRecord,
    TaskRef,
};
use tokio_util::sync::CancellationToken;

/// Prints run and task lifecycle events as they arrive.
/// A real subscriber might push metrics or raise alerts instead.
struct EventPrinter;

#[async_trait::async_trait]
impl Subscribe for EventPrinter {
    async fn on_event(&self, ev: &Event) {
        match ev.kind {
            // === Run lifecycle ===
            EventKind::RunStarted => {
                println!("[sub] run started");
            }
            EventKind::RunDrained => {
                println!("[sub] run drained");
            }

            // === Task lifecycle ===
            EventKind::TaskStarting => {
                println!(
                    "[sub] starting:    task={} worker={}",
                    ev.task.as_deref().unwrap_or("<unknown>"),
                    ev.worker.unwrap_or(0)
                );
            }
            EventKind::TaskCompleted => {
                let dur = ev.elapsed_ms.map(|v| format!("{}ms", v)).unwrap_or_default();
                println!(
                    "[sub] completed:   task={} elapsed={}",
                    ev.task.as_deref().unwrap_or("<unknown>"),
                    dur
                );
            }
            EventKind::TaskInterrupted => {
                let budget = ev.budget_ms.map(|v| format!("{}ms", v)).unwrap_or_default();
                println!(
                    "[sub] interrupted: task={} budget={}",
                    ev.task.as_deref().unwrap_or("<unknown>"),
                    budget
                );
            }
            EventKind::TaskFailed => {
                println!(
                    "[sub] failed:      task={} reason={}",
                    ev.task.as_deref().unwrap_or("<unknown>"),
                    ev.reason.as_deref().unwrap_or("<none>")
                );
            }

            // === Ignored ===
            EventKind::SubscriberPanicked | EventKind::SubscriberOverflow => {}
        }
    }

    fn name(&self) -> &'static str {
        "printer"
    }

    fn queue_capacity(&self) -> usize {
        256
    }
}

/// One-shot record that prints and finishes inside the budget.
fn oneshot_ok(name: &'static str) -> TaskRecord {
    let task: TaskRef = TaskFn::arc(name, move |ctx: CancellationToken| async move {
        if ctx.is_cancelled() {
            return Ok(());
        }
        println!("[{name}] doing one-shot work...");
        tokio::time::sleep(Duration::from_millis(300)).await;
        println!("[{name}] success");
        Ok::<(), TaskError>(())
    });
    TaskRecord::new(task)
}

/// One-shot record that fails on purpose (to demonstrate TaskFailed).
fn oneshot_fail(name: &'static str) -> TaskRecord {
    let task: TaskRef = TaskFn::arc(name, move |ctx: CancellationToken| async move {
        if ctx.is_cancelled() {
            return Ok(());
        }
        println!("[{name}] starting and will fail...");
        tokio::time::sleep(Duration::from_millis(250)).await;
        Err(TaskError::Fail {
            error: "boom (demo failure)".to_string(),
        })
    });
    TaskRecord::new(task).with_args("--demo")
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let mut cfg = ControllerConfig::default();
    cfg.max_concurrent = 2;

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(EventPrinter)];
    let controller = Controller::builder(cfg).with_subscribers(subs).build()?;

    let records = vec![oneshot_ok("alpha"), oneshot_fail("bravo")];
    controller.start(records, Duration::from_secs(2)).await?;
    controller.wait().await;

    // The pump delivers events asynchronously; give it a beat before exiting.
    tokio::time::sleep(Duration::from_millis(100)).await;

    println!("\nfinished");
    Ok(())
}
