//! Scheduler events: types and the lossy broadcast bus.
//!
//! This module groups the event **data model** and the **bus** that moves
//! lifecycle events from the scheduling path to observers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] bounded broadcast channel with publication accounting
//!
//! ## Quick reference
//! - **Publishers**: `CopyScheduler` (submission/rejection, shutdown
//!   markers), `Dispatcher` (admissions, drain drops), executor workers
//!   (completion/failure), deadline watchers (timeouts).
//! - **Consumers**: the scheduler's subscriber listener, which fans events
//!   out to per-subscriber delivery lanes.
//!
//! Event delivery is fire-and-forget observability; the authoritative
//! counters live in `core::telemetry`, and the bus reports its own volume
//! there (`events_published`) so subscriber-side losses
//! (`events_dropped`) have a denominator.

mod bus;
mod event;

pub use event::{Event, EventKind};

pub(crate) use bus::Bus;
