//! # Event bus, wired into the telemetry plane.
//!
//! [`Bus`] carries [`Event`]s from their producers — the scheduler facade
//! (submissions, rejections, shutdown markers), the dispatcher
//! (admissions, drain drops), the executor workers (completions,
//! failures), and the deadline watchers (timeouts) — to whatever is
//! listening. Delivery is observability-only and deliberately lossy: the
//! channel is bounded, the oldest undelivered events go first when a
//! listener falls behind, and nothing on the scheduling path ever waits
//! for a listener.
//!
//! Because delivery may lose events, every publish is counted in the
//! authoritative telemetry plane (`events_published`). Together with the
//! subscriber lanes' `events_dropped` this makes the loss rate visible
//! without making delivery reliable.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::core::Telemetry;

use super::event::Event;

/// Lossy broadcast channel for scheduler events, with publication
/// accounting.
#[derive(Clone)]
pub(crate) struct Bus {
    tx: broadcast::Sender<Event>,
    telemetry: Arc<Telemetry>,
}

impl Bus {
    /// Creates a bus buffering at most `capacity` undelivered events per
    /// listener; beyond that, a slow listener loses the oldest first.
    pub(crate) fn new(capacity: usize, telemetry: Arc<Telemetry>) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx, telemetry }
    }

    /// Publishes one event to every current listener and counts it.
    ///
    /// With no listeners the event goes nowhere — the scheduler operates
    /// fine unobserved — but the publish still counts, so
    /// `events_published` stays a valid denominator.
    pub(crate) fn publish(&self, ev: Event) {
        self.telemetry.record_event_published();
        let _ = self.tx.send(ev);
    }

    /// Opens a listener that receives every event published from now on.
    pub(crate) fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
