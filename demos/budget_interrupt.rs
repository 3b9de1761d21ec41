//! # Example: budget_interrupt
//!
//! Shows the per-run budget cutting off a task that runs too long.
//!
//! Demonstrates how to:
//! - Pick a wall-clock budget per [`Controller::start`] call.
//! - Share the task's [`CancellationToken`] with helper work so it stops
//!   when the budget expires.
//! - Read the interrupted snapshot after the drain.
//!
//! ## Flow
//! ```text
//! TaskRecord[] ──► Controller::start(records, 300ms)
//!     ├─► "quick" finishes at ~50ms ──► publish(TaskCompleted)
//!     ├─► "stuck" hits the budget at 300ms
//!     │     ├─► its future is dropped mid-await
//!     │     ├─► its token is cancelled (helpers wind down)
//!     │     ├─► record appended to the interrupted registry
//!     │     └─► publish(TaskInterrupted)
//!     └─► publish(RunDrained)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example budget_interrupt
//! ```

use std::time::Duration;
use taskdrain::{Controller, ControllerConfig, TaskFn, TaskRecord, TaskRef};
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Default config: one worker at a time, so "quick" runs before "stuck".
    let controller = Controller::new(ControllerConfig::default())?;

    // Finishes well inside the budget.
    let quick: TaskRef = TaskFn::arc("quick", |_ctx: CancellationToken| async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        println!("[quick] done");
        Ok(())
    });

    // Runs far past the budget. At the deadline the controller drops the
    // future mid-await and cancels its token, so the spawned helper below
    // observes the cancel even though the task body never resumes.
    let stuck: TaskRef = TaskFn::arc("stuck", |ctx: CancellationToken| async move {
        let helper = tokio::spawn(async move {
            ctx.cancelled().await;
            println!("[stuck] token cancelled, helper winding down");
        });
        println!("[stuck] starting long work...");
        tokio::time::sleep(Duration::from_secs(10)).await;
        println!("[stuck] this line is never reached");
        let _ = helper.await;
        Ok(())
    });

    let records = vec![
        TaskRecord::new(quick),
        TaskRecord::new(stuck).with_args("--retries 3"),
    ];
    controller.start(records, Duration::from_millis(300)).await?;
    controller.wait().await;

    // Give the detached helper a beat to observe the cancel.
    tokio::time::sleep(Duration::from_millis(50)).await;

    // The snapshot keeps interrupted records in interruption order.
    for rec in controller.interrupted_tasks() {
        println!(
            "interrupted: task={} args={}",
            rec.name(),
            rec.args().unwrap_or("<none>")
        );
    }
    println!(
        "admitted={} completed={} interrupted={}",
        controller.admitted_count(),
        controller.completed_count(),
        controller.interrupted_count(),
    );
    Ok(())
}
