//! Runtime events: payload type and broadcast bus.
//!
//! Everything observable about a drain flows through here. The controller
//! and its workers build [`Event`]s and publish them on the [`Bus`]; the
//! event pump (spawned at build time) is the single long-lived receiver and
//! forwards them to the subscriber fan-out, whose own diagnostics
//! (overflow, panic) come back through the same bus.
//!
//! [`EventKind`] enumerates what can happen; [`Event`] carries the common
//! payload (sequence number, timestamp, task/worker identifiers, durations,
//! reason). The system-level wiring diagram lives in `controller/mod.rs`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
