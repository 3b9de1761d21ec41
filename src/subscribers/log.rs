//! # Stdout logging subscriber.
//!
//! [`LogWriter`] prints one line per event. It exists for development runs
//! and the bundled demos; build with `--features logging` to get it.
//!
//! ```text
//! [run-started]
//! [starting] task=sleep-7 worker=4
//! [completed] task=sleep-2 worker=1 elapsed_ms=2000
//! [interrupted] task=sleep-7 worker=4 elapsed_ms=4000 budget_ms=4000
//! [failed] task=copy worker=2 err="disk offline"
//! [run-drained]
//! ```

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;
use async_trait::async_trait;

/// Prints events to stdout, one line each.
///
/// Ships behind the `logging` feature as a debugging aid. For structured
/// logging or metrics, implement [`Subscribe`] yourself.
#[derive(Default)]
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let task = e.task.as_deref().unwrap_or("unknown");
        match e.kind {
            EventKind::RunStarted => {
                println!("[run-started]");
            }
            EventKind::RunDrained => {
                println!("[run-drained]");
            }
            EventKind::TaskStarting => match &e.args {
                Some(args) => println!(
                    "[starting] task={task} worker={} args={args:?}",
                    e.worker.unwrap_or(0)
                ),
                None => println!("[starting] task={task} worker={}", e.worker.unwrap_or(0)),
            },
            EventKind::TaskCompleted => {
                println!(
                    "[completed] task={task} worker={} elapsed_ms={}",
                    e.worker.unwrap_or(0),
                    e.elapsed_ms.unwrap_or(0)
                );
            }
            EventKind::TaskInterrupted => {
                println!(
                    "[interrupted] task={task} worker={} elapsed_ms={} budget_ms={}",
                    e.worker.unwrap_or(0),
                    e.elapsed_ms.unwrap_or(0),
                    e.budget_ms.unwrap_or(0)
                );
            }
            EventKind::TaskFailed => {
                println!(
                    "[failed] task={task} worker={} err={:?}",
                    e.worker.unwrap_or(0),
                    e.reason.as_deref().unwrap_or("unknown")
                );
            }
            EventKind::SubscriberPanicked => {
                println!(
                    "[subscriber-panicked] subscriber={task} reason={:?}",
                    e.reason.as_deref().unwrap_or("unknown")
                );
            }
            EventKind::SubscriberOverflow => {
                println!(
                    "[subscriber-overflow] subscriber={task} reason={:?}",
                    e.reason.as_deref().unwrap_or("unknown")
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }
}
