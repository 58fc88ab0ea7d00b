//! # peercopy
//!
//! **Peercopy** is a prioritized outbound copy scheduler for cache peer
//! networks.
//!
//! Callers submit copy requests (pulls and pushes) tagged with a reason,
//! an attempt count, and — for pushes — a location source. The scheduler
//! decides when each caller-supplied copy future actually runs: it bounds
//! concurrency per priority class, preserves FIFO order within a class,
//! and enforces admission timeouts and shutdown cancellation. It performs
//! no I/O itself.
//!
//! ## Features
//!
//! | Area            | Description                                                        | Key types / traits                         |
//! |-----------------|--------------------------------------------------------------------|--------------------------------------------|
//! | **Scheduling**  | Weighted per-class admission, FIFO within a class, cycle quotas.   | [`CopyScheduler`], [`SchedulerConfig`]     |
//! | **Priorities**  | Pure classification of requests into dense priority classes.      | [`PriorityClass`], [`CopyReason`]          |
//! | **Completions** | One-shot handles resolving with the copy's outcome or failure.    | [`CompletionHandle`], [`CopyOutcome`]      |
//! | **Cancellation**| Linked tokens: caller token ∨ shutdown; admission deadlines.      | [`CopyContext`], [`CopyError`]             |
//! | **Observer API**| Lifecycle events fanned out to non-blocking subscribers.          | [`Subscribe`], [`Event`], [`EventKind`]    |
//! | **Telemetry**   | Authoritative counters, global and per class.                     | [`TelemetrySnapshot`], [`CounterSnapshot`] |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] subscriber _(demo/reference only)_.
//!
//! ```no_run
//! use peercopy::{CopyContext, CopyOutcome, CopyReason, CopyScheduler, SchedulerConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let scheduler = CopyScheduler::new(SchedulerConfig::default(), Vec::new());
//!     scheduler.startup().await?;
//!
//!     // Submit a pull; the callback owns the actual copy I/O.
//!     let handle = scheduler.schedule_outbound_pull(
//!         CopyReason::Pin,
//!         CopyContext::with_trace("build-17"),
//!         0,
//!         |args| async move {
//!             let _ = args.context.token(); // honor cancellation here
//!             Ok(CopyOutcome::copied(4096))
//!         },
//!     );
//!     let outcome = handle.outcome().await?;
//!     println!("copied {} bytes", outcome.bytes);
//!
//!     scheduler.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! ---

mod config;
mod copies;
mod core;
mod error;
mod events;
mod priority;
mod subscribers;

// ---- Public re-exports ----

pub use crate::config::SchedulerConfig;
pub use crate::copies::{
    BoxCopyFuture, CompletionHandle, CopyCode, CopyContext, CopyOutcome, CopyResult, CopySummary,
    ExecutionArgs,
};
pub use crate::core::{CopyScheduler, CounterSnapshot, TelemetrySnapshot};
pub use crate::error::{CopyError, SchedulerError};
pub use crate::events::{Event, EventKind};
pub use crate::priority::{
    CopyDirection, CopyLocationSource, CopyReason, PriorityClass, MAX_ATTEMPT,
};
pub use crate::subscribers::Subscribe;

// Optional: expose a simple built-in log subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use crate::subscribers::embedded::LogWriter;
