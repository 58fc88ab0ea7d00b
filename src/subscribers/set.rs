//! # SubscriberSet: per-subscriber delivery lanes
//!
//! Fans each [`Event`] out to every subscriber without awaiting any of
//! them. Each subscriber gets a **lane**: a bounded queue drained by its
//! own worker task. A subscriber that cannot keep up loses events from
//! its own lane only; every lost delivery is counted in the telemetry
//! plane (`events_dropped`), and the lane warns to stderr once — not once
//! per event — so a wedged subscriber cannot flood the log.
//!
//! ## Guarantees
//! - `emit_arc` never blocks and never waits on subscriber code.
//! - Per-lane FIFO (queue order); no ordering across lanes.
//! - A panicking subscriber is caught; its lane keeps draining.
//!
//! ## Non-guarantees
//! - No redelivery: an overflowed lane's events are gone. The
//!   `events_published` / `events_dropped` counters keep the loss
//!   visible.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc;

use crate::core::Telemetry;
use crate::events::Event;

use super::Subscribe;

/// One subscriber's delivery lane: bounded queue, detached worker, and a
/// warn-once latch for overflow.
struct Lane {
    name: &'static str,
    queue: mpsc::Sender<Arc<Event>>,
    overflow_warned: AtomicBool,
}

impl Lane {
    /// Opens the lane and spawns its worker. The worker exits on its own
    /// when the set — and with it the lane's sender — is dropped.
    fn open(subscriber: Arc<dyn Subscribe>, default_capacity: usize) -> Self {
        let capacity = subscriber
            .queue_capacity()
            .unwrap_or(default_capacity)
            .max(1);
        let name = subscriber.name();
        let (queue, mut rx) = mpsc::channel::<Arc<Event>>(capacity);

        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let fut = subscriber.on_event(event.as_ref());
                if std::panic::AssertUnwindSafe(fut).catch_unwind().await.is_err() {
                    eprintln!(
                        "[peercopy] subscriber '{}' panicked; lane keeps draining",
                        subscriber.name()
                    );
                }
            }
        });

        Self {
            name,
            queue,
            overflow_warned: AtomicBool::new(false),
        }
    }

    /// Non-blocking delivery attempt; `false` means the event is lost for
    /// this lane.
    fn offer(&self, event: Arc<Event>) -> bool {
        if self.queue.try_send(event).is_ok() {
            return true;
        }
        if !self.overflow_warned.swap(true, Ordering::Relaxed) {
            eprintln!(
                "[peercopy] subscriber '{}' is losing events (lane full or closed)",
                self.name
            );
        }
        false
    }
}

/// Non-blocking fan-out over every registered subscriber.
pub(crate) struct SubscriberSet {
    lanes: Vec<Lane>,
    telemetry: Arc<Telemetry>,
}

impl SubscriberSet {
    /// Opens one lane per subscriber.
    ///
    /// Lanes whose subscriber declares no capacity inherit
    /// `default_capacity` — the scheduler passes its `bus_capacity`, so
    /// by default a lane can absorb the same burst the bus can.
    pub(crate) fn new(
        subscribers: Vec<Arc<dyn Subscribe>>,
        default_capacity: usize,
        telemetry: Arc<Telemetry>,
    ) -> Self {
        let lanes = subscribers
            .into_iter()
            .map(|subscriber| Lane::open(subscriber, default_capacity))
            .collect();
        Self { lanes, telemetry }
    }

    /// Fans one event out to every lane; lost deliveries are counted.
    pub(crate) fn emit_arc(&self, event: Arc<Event>) {
        for lane in &self.lanes {
            if !lane.offer(Arc::clone(&event)) {
                self.telemetry.record_event_dropped();
            }
        }
    }

    /// True when there is nobody to deliver to.
    pub(crate) fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }
}
