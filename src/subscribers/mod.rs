//! # Event subscribers for the copy scheduler.
//!
//! This module provides the [`Subscribe`] trait and the delivery-lane
//! fan-out for events broadcast through the scheduler's bus.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   dispatcher / workers ── publish(Event) ──► Bus   (counts events_published)
//!                                               │
//!                                               ▼
//!                          scheduler listener ──► SubscriberSet::emit_arc
//!                                                   │
//!                                          ┌────────┴───────┬─────────┐
//!                                          ▼                ▼         ▼
//!                                      [lane S1]        [lane S2]    ...
//!                                       worker S1        worker S2
//!                                       on_event()       on_event()
//!                                  (a full lane drops → events_dropped)
//! ```
//!
//! Subscribers may be slow (I/O, batching); they never block the
//! dispatcher or each other. A lane that overflows loses events; the loss
//! is counted in the telemetry plane and warned once per lane.

mod set;
mod subscribe;

pub mod embedded;

pub use subscribe::Subscribe;

pub(crate) use set::SubscriberSet;
