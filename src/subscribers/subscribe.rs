//! # Subscriber trait.
//!
//! [`Subscribe`] is how callers observe a drain: implement it, hand the
//! subscriber to
//! [`ControllerBuilder::with_subscribers`](crate::ControllerBuilder::with_subscribers),
//! and every runtime event reaches `on_event` from a worker task dedicated
//! to this subscriber.
//!
//! A subscriber may be slow without consequence for the drain itself. Its
//! delivery queue is bounded; once full, further events are dropped for
//! that subscriber (and reported as `SubscriberOverflow`) instead of
//! blocking the publisher.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use taskdrain::{Event, Subscribe};
//!
//! struct Audit;
//!
//! #[async_trait]
//! impl Subscribe for Audit {
//!     async fn on_event(&self, _event: &Event) {
//!         // write audit record...
//!     }
//!     fn name(&self) -> &'static str { "audit" }
//!     fn queue_capacity(&self) -> usize { 512 }
//! }
//! ```

use crate::events::Event;
use async_trait::async_trait;

/// An event consumer attached to the controller.
///
/// Methods run on the subscriber's own worker task. Avoid blocking the
/// runtime inside `on_event`; prefer async I/O and cooperative waits.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event.
    ///
    /// Events arrive in publish order for this subscriber.
    async fn on_event(&self, event: &Event);

    /// Name used in logs and in overflow/panic diagnostics.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Capacity of this subscriber's delivery queue.
    ///
    /// Events that arrive while the queue is full are dropped for this
    /// subscriber and reported as `SubscriberOverflow`.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
