//! # Non-blocking event fan-out to subscribers.
//!
//! [`SubscriberSet`] hands every event to each subscriber through a bounded
//! per-subscriber queue, drained by a dedicated worker task. The publisher
//! (the event pump) never waits on a subscriber.
//!
//! ```text
//! emit(event)
//!  ├──► [queue A] ──► worker A ──► audit.on_event()
//!  ├──► [queue B] ──► worker B ──► metrics.on_event()
//!  └──► [queue C] ──► worker C ──► log.on_event()
//!       (bounded)    (panic → SubscriberPanicked)
//! ```
//!
//! ## Rules
//! - `emit` uses `try_send`; a full queue drops the event for that subscriber
//!   only and reports `SubscriberOverflow` on the bus.
//! - Subscribers run independently: one may still be on event N while another
//!   is at N+5. Within a single subscriber the order is FIFO.
//! - A panic inside `on_event` is caught, reported as `SubscriberPanicked`,
//!   and the worker moves on to the next event.
//!
//! Panics are caught through `AssertUnwindSafe`, so a subscriber that panics
//! while holding its own `Mutex` can leave that state poisoned for itself.

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::events::{Bus, Event};
use crate::subscribers::Subscribe;

/// Per-subscriber delivery queue.
struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Fan-out stage between the event pump and user subscribers.
///
/// One bounded queue and one worker task per subscriber: delivery is
/// concurrent across subscribers, in-order within each, and a stuck or
/// panicking subscriber never backpressures the drain loop.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Creates the set and spawns one worker task per subscriber.
    ///
    /// Queue capacity comes from [`Subscribe::queue_capacity`], clamped to a
    /// minimum of 1. Workers run until [`shutdown`](Self::shutdown) closes
    /// their queues. Must be called from a tokio runtime context.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let cap = sub.queue_capacity().max(1);
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(cap);
            let s = Arc::clone(&sub);
            let bus_for_worker = bus.clone();

            let handle = tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = s.on_event(ev.as_ref());

                    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await
                    {
                        let info = {
                            let any = &*panic_err;
                            if let Some(msg) = any.downcast_ref::<&'static str>() {
                                (*msg).to_string()
                            } else if let Some(msg) = any.downcast_ref::<String>() {
                                msg.clone()
                            } else {
                                "unknown panic".to_string()
                            }
                        };
                        bus_for_worker.publish(Event::subscriber_panicked(s.name(), info));
                    }
                }
            });
            channels.push(SubscriberChannel { name, sender: tx });
            workers.push(handle);
        }
        Self {
            channels,
            workers,
            bus,
        }
    }

    /// Delivers one event to every subscriber queue without blocking.
    ///
    /// A full or closed queue drops the event for that subscriber and
    /// publishes `SubscriberOverflow` naming it. Overflow reports themselves
    /// are exempt, otherwise a saturated queue would feed its own overflow
    /// traffic.
    pub fn emit(&self, event: Arc<Event>) {
        let is_overflow_evt = event.is_subscriber_overflow();

        for channel in &self.channels {
            match channel.sender.try_send(Arc::clone(&event)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    if !is_overflow_evt {
                        self.bus
                            .publish(Event::subscriber_overflow(channel.name, "full"));
                    }
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    if !is_overflow_evt {
                        self.bus
                            .publish(Event::subscriber_overflow(channel.name, "closed"));
                    }
                }
            }
        }
    }

    /// Closes every queue and waits for the workers to drain and exit.
    ///
    /// Events already queued are still delivered before a worker stops.
    pub async fn shutdown(self) {
        drop(self.channels);

        for h in self.workers {
            let _ = h.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<EventKind>>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, event: &Event) {
            self.seen.lock().unwrap().push(event.kind);
        }
        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    struct Grumpy;

    #[async_trait]
    impl Subscribe for Grumpy {
        async fn on_event(&self, _event: &Event) {
            panic!("grumpy");
        }
        fn name(&self) -> &'static str {
            "grumpy"
        }
    }

    struct Stuck {
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl Subscribe for Stuck {
        async fn on_event(&self, _event: &Event) {
            self.gate.notified().await;
        }
        fn name(&self) -> &'static str {
            "stuck"
        }
        fn queue_capacity(&self) -> usize {
            1
        }
    }

    #[tokio::test]
    async fn panicking_subscriber_is_isolated() {
        let bus = Bus::new(16);
        let mut diag = bus.subscribe();
        let recorder = Arc::new(Recorder::default());
        let set = SubscriberSet::new(
            vec![Arc::new(Grumpy) as Arc<dyn Subscribe>, recorder.clone()],
            bus.clone(),
        );

        set.emit(Arc::new(Event::new(EventKind::RunStarted)));

        let ev = loop {
            let ev = diag.recv().await.unwrap();
            if ev.is_subscriber_panic() {
                break ev;
            }
        };
        assert_eq!(ev.task.as_deref(), Some("grumpy"));
        assert!(ev.reason.as_deref().unwrap_or("").contains("grumpy"));

        set.shutdown().await;
        assert_eq!(
            recorder.seen.lock().unwrap().as_slice(),
            &[EventKind::RunStarted]
        );
    }

    #[tokio::test]
    async fn overflow_is_reported_and_event_dropped() {
        let bus = Bus::new(16);
        let mut diag = bus.subscribe();
        let gate = Arc::new(Notify::new());
        let set = SubscriberSet::new(
            vec![Arc::new(Stuck {
                gate: gate.clone(),
            }) as Arc<dyn Subscribe>],
            bus.clone(),
        );

        // No await between emits: the worker cannot drain the queue, so with
        // capacity 1 the second and third sends must overflow.
        for _ in 0..3 {
            set.emit(Arc::new(Event::new(EventKind::RunStarted)));
        }

        let ev = loop {
            let ev = diag.recv().await.unwrap();
            if ev.is_subscriber_overflow() {
                break ev;
            }
        };
        assert_eq!(ev.task.as_deref(), Some("stuck"));

        gate.notify_one();
        set.shutdown().await;
    }
}
