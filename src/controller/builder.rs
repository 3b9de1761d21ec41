//! # Controller construction and event-pipeline wiring.
//!
//! [`ControllerBuilder`] assembles a [`Controller`] together with its event
//! plumbing: the broadcast [`Bus`], the [`SubscriberSet`] fan-out, and the
//! pump task that moves events from the former into the latter.
//!
//! ## Wiring
//! ```text
//! build():
//!   Bus ──► pump (spawned) ──► SubscriberSet ──► per-subscriber workers
//!    ▲
//!    └── Controller + workers publish here
//! ```
//!
//! The pump holds the only long-lived bus receiver. It exits when the
//! controller is dropped (a drop guard cancels its token) and then shuts the
//! subscriber set down, flushing queued events to the subscribers.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::Receiver;
use tokio_util::sync::CancellationToken;

use crate::controller::config::ControllerConfig;
use crate::controller::core::Controller;
use crate::error::ControllerError;
use crate::events::{Bus, Event};
use crate::subscribers::{Subscribe, SubscriberSet};

/// Builder for constructing a [`Controller`] with optional subscribers.
pub struct ControllerBuilder {
    cfg: ControllerConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl ControllerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: ControllerConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (run lifecycle, task lifecycle,
    /// fan-out diagnostics) through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the controller and spawns its event pipeline.
    ///
    /// Validates the configuration, wires `Bus → pump → SubscriberSet`, and
    /// returns the controller as a shared handle. Must be called within a
    /// Tokio runtime (the pump and subscriber workers are spawned here).
    pub fn build(self) -> Result<Arc<Controller>, ControllerError> {
        self.cfg.validate()?;

        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let set = SubscriberSet::new(self.subscribers, bus.clone());
        let pump_token = CancellationToken::new();

        spawn_pump(pump_token.clone(), bus.subscribe(), set);

        Ok(Controller::new_internal(
            self.cfg,
            bus,
            pump_token.drop_guard(),
        ))
    }
}

/// Moves events from the bus into the subscriber set.
///
/// Lagging only skips events (the ring already dropped them); a closed bus
/// or a cancelled token ends the pump, which then flushes the set.
fn spawn_pump(token: CancellationToken, mut rx: Receiver<Event>, set: SubscriberSet) {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                recv = rx.recv() => match recv {
                    Ok(ev) => set.emit(Arc::new(ev)),
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                },
            }
        }
        set.shutdown().await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn zero_ceiling_fails_the_build() {
        let cfg = ControllerConfig {
            max_concurrent: 0,
            ..ControllerConfig::default()
        };
        let err = ControllerBuilder::new(cfg).build().err();
        assert_eq!(err, Some(ControllerError::InvalidConcurrency));
    }

    #[tokio::test]
    async fn default_build_starts_idle() {
        let ctrl = ControllerBuilder::new(ControllerConfig::default())
            .build()
            .unwrap();
        assert_eq!(ctrl.waiting_count(), 0);
        assert_eq!(ctrl.running_count(), 0);
        assert_eq!(ctrl.admitted_count(), 0);
        assert!(!ctrl.is_draining());
    }
}
