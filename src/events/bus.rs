//! # Broadcast bus for runtime events.
//!
//! Workers and the controller publish into a single bounded
//! [`tokio::sync::broadcast`] ring; the event pump spawned by
//! [`ControllerBuilder::build`](crate::ControllerBuilder::build) is the one
//! long-lived receiver and fans events out to the subscriber set.
//!
//! ```text
//!   Worker 1   ──┐
//!   Worker 2   ──┼──────► Bus ───────► event pump ────► SubscriberSet
//!   Worker N   ──┤  (broadcast ring)
//!   Controller ──┘
//! ```
//!
//! Publishing never blocks and never fails: with no live receiver the event
//! is simply dropped, and a receiver that falls behind the ring capacity
//! sees `RecvError::Lagged(n)` instead of stalling the publishers.

use tokio::sync::broadcast;

use super::event::Event;

/// Handle to the event broadcast channel.
///
/// Cloning is cheap (the sender is `Arc`-backed); any clone may publish
/// concurrently with the others. Delivery is fire-and-forget.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus whose ring holds up to `capacity` recent events.
    ///
    /// The capacity is shared by all receivers and clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Publishes an event to whoever is listening right now.
    ///
    /// Returns immediately; the event is lost if there are no receivers.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Opens an independent receiver observing events published from now on.
    ///
    /// A receiver that lags more than the ring capacity gets
    /// `RecvError::Lagged(n)` and skips the `n` oldest events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::RunStarted).with_task("batch"));
        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::RunStarted);
        assert_eq!(ev.task.as_deref(), Some("batch"));
    }

    #[tokio::test]
    async fn capacity_is_clamped_to_one() {
        let bus = Bus::new(0);
        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::RunDrained));
        assert_eq!(rx.recv().await.unwrap().kind, EventKind::RunDrained);
    }
}
