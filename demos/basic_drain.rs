//! # Example: basic_drain
//!
//! Minimal example of draining a small batch under a concurrency ceiling.
//!
//! Demonstrates how to:
//! - Define simple tasks using [`TaskFn`].
//! - Queue them as [`TaskRecord`]s.
//! - Drain the batch with [`Controller::start`] and read the totals.
//!
//! ## Flow
//! ```text
//! TaskRecord[] ──► Controller::start(records, budget)
//!     ├─► publish(RunStarted)
//!     ├─► admit ≤ 2 workers at a time (FIFO)
//!     │     ├─► publish(TaskStarting)
//!     │     └─► publish(TaskCompleted)
//!     ├─► park until a worker reports done
//!     └─► publish(RunDrained)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example basic_drain
//! ```

use std::time::Duration;
use taskdrain::{Controller, ControllerConfig, TaskFn, TaskRecord, TaskRef};
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Build runtime configuration (two workers at a time)
    let mut cfg = ControllerConfig::default();
    cfg.max_concurrent = 2;

    // 2. Create the controller (no subscribers for simplicity)
    let controller = Controller::new(cfg)?;

    // 3. Define a batch of simple async tasks
    let mut records = Vec::new();
    for i in 1..=5u64 {
        let task: TaskRef = TaskFn::arc(
            format!("job-{i}"),
            move |ctx: CancellationToken| async move {
                if ctx.is_cancelled() {
                    return Ok(());
                }
                println!("[job-{i}] working for {}ms", 100 * i);
                tokio::time::sleep(Duration::from_millis(100 * i)).await;
                println!("[job-{i}] done");
                Ok(())
            },
        );
        records.push(TaskRecord::new(task));
    }

    // 4. Drain the whole batch under a generous budget
    controller.start(records, Duration::from_secs(5)).await?;
    controller.wait().await;

    // 5. Read the totals
    println!(
        "admitted={} completed={} failed={} interrupted={}",
        controller.admitted_count(),
        controller.completed_count(),
        controller.failed_count(),
        controller.interrupted_count(),
    );
    Ok(())
}
