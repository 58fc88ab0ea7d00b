//! # Lifecycle events emitted by the copy scheduler.
//!
//! The [`EventKind`] enum classifies event types across two categories:
//! - **Request events**: one copy's path through the scheduler (submitted,
//!   admitted, completed, failed, timed out, dropped).
//! - **Lifecycle events**: scheduler-wide transitions (shutdown requested,
//!   drain completed).
//!
//! Faults of the delivery plane itself (a subscriber lane overflowing or
//! panicking) are deliberately **not** events: publishing them back into
//! the plane that is failing would feed the failure. They are counted in
//! `core::telemetry` (`events_dropped`) and warned to stderr instead.
//!
//! The [`Event`] struct carries metadata such as the copy id, the priority
//! class, the attempt count, the measured queue wait, error messages, and
//! the caller's trace id.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically, so events can be ordered correctly even when delivered
//! out-of-order through async channels.
//!
//! ## Event flow examples
//!
//! ### Admitted copy
//! ```text
//! CopySubmitted → CopyAdmitted → CopyCompleted | CopyFailed
//! ```
//!
//! ### Timed-out copy
//! ```text
//! CopySubmitted → CopyTimedOut        (callback never invoked)
//! ```
//!
//! ### Shutdown
//! ```text
//! ShutdownRequested
//!   → CopyDropped (per queued request)
//!   → CopyCompleted | CopyFailed | CopyDropped (per in-flight request)
//!   → DrainCompleted
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::priority::PriorityClass;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of scheduler events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Lifecycle events ===
    /// Shutdown was requested; submissions now fail fast.
    ShutdownRequested,
    /// Queues are empty and every in-flight callback has returned.
    DrainCompleted,

    // === Request events ===
    /// Request accepted and queued under its priority class.
    CopySubmitted,
    /// Request refused because shutdown had already been initiated.
    CopyRejected,
    /// Request popped from its queue and handed to a worker.
    CopyAdmitted,
    /// Callback returned a successful outcome.
    CopyCompleted,
    /// Callback returned an error or panicked.
    CopyFailed,
    /// Request timed out waiting for admission; callback never ran.
    CopyTimedOut,
    /// Request failed with `Shutdown` (drained from a queue, refused at
    /// worker start, or acknowledged cancellation during shutdown).
    CopyDropped,
}

/// Scheduler event with optional metadata.
///
/// ## Fields
/// - `seq`: unique sequence number for ordering (monotonically increasing)
/// - `at`: wall-clock timestamp (may go backwards due to NTP, use for logging only)
/// - `kind`: event classification
/// - `copy`, `class`, `attempt`, `queue_wait`, `error`, `trace`: optional metadata
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp (may go backwards, use for logging only).
    pub at: SystemTime,
    /// The kind of event.
    pub kind: EventKind,
    /// Copy request id, if the event concerns one request.
    pub copy: Option<u64>,
    /// Priority class of the request.
    pub class: Option<PriorityClass>,
    /// Caller-declared attempt count (unclamped).
    pub attempt: Option<u32>,
    /// Measured wait between submission and admission.
    pub queue_wait: Option<Duration>,
    /// Error message, if the event represents a failure.
    pub error: Option<String>,
    /// Caller trace id, if one was provided.
    pub trace: Option<String>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// next sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            copy: None,
            class: None,
            attempt: None,
            queue_wait: None,
            error: None,
            trace: None,
        }
    }

    /// Attaches a copy request id.
    pub fn with_copy(mut self, id: u64) -> Self {
        self.copy = Some(id);
        self
    }

    /// Attaches the priority class.
    pub fn with_class(mut self, class: PriorityClass) -> Self {
        self.class = Some(class);
        self
    }

    /// Attaches the attempt count.
    pub fn with_attempt(mut self, attempt: u32) -> Self {
        self.attempt = Some(attempt);
        self
    }

    /// Attaches the measured queue wait.
    pub fn with_queue_wait(mut self, wait: Duration) -> Self {
        self.queue_wait = Some(wait);
        self
    }

    /// Attaches an error message.
    pub fn with_error(mut self, msg: impl Into<String>) -> Self {
        self.error = Some(msg.into());
        self
    }

    /// Attaches a trace id (empty ids are elided).
    pub fn with_trace(mut self, trace: &str) -> Self {
        if !trace.is_empty() {
            self.trace = Some(trace.to_string());
        }
        self
    }
}
