//! Scheduler core: admission, dispatch, and lifecycle.
//!
//! This module contains the embedded implementation of the copy scheduler.
//! The public API re-exported from here is [`CopyScheduler`] plus the
//! telemetry snapshot types. Everything else is an internal building block
//! the facade wires together.
//!
//! ## Files & responsibilities
//! - **scheduler.rs**: public facade; owns the Bus, SubscriberSet, and
//!   telemetry; assigns submission ids; arms deadline watchers; drives the
//!   `NotStarted → Running → ShuttingDown → Stopped` state machine.
//! - **dispatcher.rs**: the single cooperative loop; owns the class queues
//!   and the admission controller; drains submissions, reaps workers, runs
//!   cycles, launches admitted requests, drains on shutdown.
//! - **admission.rs**: per-cycle budget and the reserved/weighted split;
//!   in-flight accounting.
//! - **queues.rs**: per-class FIFO `VecDeque`s indexed by dense rank.
//! - **executor.rs**: one worker per admitted copy; linked cancellation;
//!   panic isolation; completion resolution.
//! - **telemetry.rs**: authoritative counters beside the lossy event plane.
//!
//! ## Wiring (module-level flow)
//! ```text
//! Caller
//!   └─ schedule_outbound_pull/push(...)
//!        ├─ classify → CopyRequest{id, class, callback, completion}
//!        ├─ arm deadline watcher (admission timeout)
//!        └─ mpsc send ──► Dispatcher
//!
//! Dispatcher (one task)
//!   loop: park-or-sleep → drain channel → reap workers → run_cycle
//!     run_cycle: admission.split(backlog, budget)
//!       └─ per class, FIFO pop → claim admission → executor worker
//!
//! Executor worker (one task per admitted copy)
//!   linked token = shutdown.child ∨ caller token
//!   callback(args) → resolve completion → event + counter
//!
//! Shutdown
//!   facade cancels shutdown token
//!     ├─ dispatcher loop exits → drain queues (Shutdown) → await workers
//!     └─ linked tokens fire → callbacks observe and return
//!   facade awaits dispatcher, then marks Stopped
//! ```
//!
//! ## Rules
//! - Only the dispatcher mutates queues and in-flight counters.
//! - A completion resolves exactly once; the completion slot arbitrates
//!   the admission/timeout/shutdown races.
//! - Internal invariant violations abort the process via [`fatal`].

mod admission;
mod dispatcher;
mod executor;
mod queues;
mod scheduler;
mod telemetry;

pub use scheduler::CopyScheduler;
pub use telemetry::{CounterSnapshot, TelemetrySnapshot};

pub(crate) use telemetry::Telemetry;

/// Last resort for broken internal invariants: log and abort.
///
/// The scheduler's counters and queues are process-local state with no
/// recovery story; continuing past a corrupted counter would silently
/// violate the admission caps.
pub(crate) fn fatal(msg: &str) -> ! {
    eprintln!("[peercopy] fatal: {msg}");
    std::process::abort()
}
