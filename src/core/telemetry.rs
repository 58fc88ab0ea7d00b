//! # Authoritative scheduler counters.
//!
//! The event bus is lossy by design; these counters are not. The scheduler
//! bumps them directly at the same points it publishes events, one global
//! set plus one set per enumerated class.
//!
//! ## Counter semantics
//! - `submitted`: accepted into a queue.
//! - `admitted`: popped and handed to a worker.
//! - `completed`: callback produced an outcome (success **or** error) that
//!   reached the caller.
//! - `timed_out`: failed with `Timeout` before admission.
//! - `shut_down`: failed with `Shutdown` (queued, rejected, or canceled
//!   in-flight during shutdown).
//!
//! ## Event-plane accounting
//! The event bus and the subscriber lanes are allowed to lose events under
//! pressure; these two global counters keep the losses visible:
//! - `events_published`: every event handed to the bus.
//! - `events_dropped`: per-lane deliveries lost to a full or closed lane
//!   (one publish fanned out to N subscribers can count up to N drops).

use std::sync::atomic::{AtomicU64, Ordering};

use crate::priority::PriorityClass;

#[derive(Default)]
struct Counters {
    submitted: AtomicU64,
    admitted: AtomicU64,
    completed: AtomicU64,
    timed_out: AtomicU64,
    shut_down: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            submitted: self.submitted.load(Ordering::Relaxed),
            admitted: self.admitted.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
            shut_down: self.shut_down.load(Ordering::Relaxed),
        }
    }
}

/// Plain-data copy of one counter set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    /// Requests accepted into a queue.
    pub submitted: u64,
    /// Requests handed to a worker.
    pub admitted: u64,
    /// Requests whose callback outcome reached the caller.
    pub completed: u64,
    /// Requests that timed out waiting for admission.
    pub timed_out: u64,
    /// Requests failed with `Shutdown`.
    pub shut_down: u64,
}

/// Counter snapshot for the whole scheduler plus every class.
#[derive(Debug, Clone)]
pub struct TelemetrySnapshot {
    /// Totals across all classes.
    pub global: CounterSnapshot,
    /// Events handed to the bus.
    pub events_published: u64,
    /// Subscriber-lane deliveries lost to a full or closed lane.
    pub events_dropped: u64,
    per_class: Vec<CounterSnapshot>,
}

impl TelemetrySnapshot {
    /// Counters for one priority class.
    pub fn for_class(&self, class: PriorityClass) -> CounterSnapshot {
        self.per_class[class.index()]
    }
}

/// Live counters shared between the facade, dispatcher, watchers,
/// workers, and the event plane.
pub(crate) struct Telemetry {
    global: Counters,
    per_class: Vec<Counters>,
    events_published: AtomicU64,
    events_dropped: AtomicU64,
}

impl Telemetry {
    pub(crate) fn new() -> Self {
        let mut per_class = Vec::with_capacity(PriorityClass::COUNT);
        per_class.resize_with(PriorityClass::COUNT, Counters::default);
        Self {
            global: Counters::default(),
            per_class,
            events_published: AtomicU64::new(0),
            events_dropped: AtomicU64::new(0),
        }
    }

    fn bump(&self, class: PriorityClass, field: impl Fn(&Counters) -> &AtomicU64) {
        field(&self.global).fetch_add(1, Ordering::Relaxed);
        field(&self.per_class[class.index()]).fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_submitted(&self, class: PriorityClass) {
        self.bump(class, |c| &c.submitted);
    }

    pub(crate) fn record_admitted(&self, class: PriorityClass) {
        self.bump(class, |c| &c.admitted);
    }

    pub(crate) fn record_completed(&self, class: PriorityClass) {
        self.bump(class, |c| &c.completed);
    }

    pub(crate) fn record_timed_out(&self, class: PriorityClass) {
        self.bump(class, |c| &c.timed_out);
    }

    pub(crate) fn record_shut_down(&self, class: PriorityClass) {
        self.bump(class, |c| &c.shut_down);
    }

    pub(crate) fn record_event_published(&self) {
        self.events_published.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_event_dropped(&self) {
        self.events_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            global: self.global.snapshot(),
            events_published: self.events_published.load(Ordering::Relaxed),
            events_dropped: self.events_dropped.load(Ordering::Relaxed),
            per_class: self.per_class.iter().map(Counters::snapshot).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_class_and_global_move_together() {
        let t = Telemetry::new();
        let class = PriorityClass::all().next().unwrap();
        t.record_submitted(class);
        t.record_submitted(class);
        t.record_admitted(class);

        let snap = t.snapshot();
        assert_eq!(snap.global.submitted, 2);
        assert_eq!(snap.global.admitted, 1);
        assert_eq!(snap.for_class(class).submitted, 2);
        assert_eq!(snap.for_class(class).admitted, 1);
    }

    #[test]
    fn event_plane_counters_are_global_only() {
        let t = Telemetry::new();
        t.record_event_published();
        t.record_event_published();
        t.record_event_dropped();

        let snap = t.snapshot();
        assert_eq!(snap.events_published, 2);
        assert_eq!(snap.events_dropped, 1);
        assert_eq!(snap.global.submitted, 0);
    }
}
