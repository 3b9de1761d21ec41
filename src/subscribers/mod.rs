//! Subscriber fan-out: how events leave the crate.
//!
//! [`Subscribe`] is the observer trait. [`SubscriberSet`] gives every
//! subscriber its own bounded queue and worker task, so a slow or panicking
//! subscriber never stalls the controller, the event pump, or its peers.
//! Dropped deliveries and caught panics are reported back on the bus as
//! events.
//!
//! ```text
//!   pump ──► SubscriberSet::emit ──► queue ──► worker ──► Subscribe::on_event
//!                                    (one queue + worker per subscriber)
//! ```
//!
//! A subscriber is any `Arc<dyn Subscribe>` handed to
//! [`ControllerBuilder::with_subscribers`](crate::ControllerBuilder::with_subscribers):
//!
//! ```no_run
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! use async_trait::async_trait;
//! use taskdrain::{Event, EventKind, Subscribe};
//!
//! #[derive(Default)]
//! struct FailureCounter {
//!     failed: AtomicU64,
//! }
//!
//! #[async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if matches!(event.kind, EventKind::TaskFailed) {
//!             self.failed.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "failure_counter"
//!     }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
