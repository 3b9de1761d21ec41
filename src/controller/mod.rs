//! Controller core: admission, budgets, drain accounting.
//!
//! This module contains the implementation of the batch runner. The public
//! API is [`Controller`] (plus its [`ControllerBuilder`] and
//! [`ControllerConfig`]); everything else is internal plumbing.
//!
//! Internal modules:
//! - `core`: the admission loop (prune → admit → park) and the status
//!   surface;
//! - `worker`: drives one execution under its budget and classifies the
//!   finish;
//! - `registry`: append-only store of interrupted records;
//! - `counters`: atomic run accounting (counters and gauges);
//! - `builder`: construction and event-pipeline wiring.
//!
//! ## Wiring
//! ```text
//! Controller::start(records, budget)
//!   │  admit (FIFO, ≤ max_concurrent)
//!   ▼
//! Worker ── timeout(budget) ── classify ──► Counters / InterruptedRegistry
//!   │                                            ▲
//!   │ publish lifecycle events                   │ status reads
//!   ▼                                            │
//!  Bus ──► pump ──► SubscriberSet ──► Subscribe impls    Controller accessors
//! ```

mod builder;
mod config;
mod core;
mod counters;
mod registry;
mod worker;

pub use self::core::Controller;
pub use builder::ControllerBuilder;
pub use config::ControllerConfig;
