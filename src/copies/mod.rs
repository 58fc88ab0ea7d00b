//! Copy request surface: context, callback plumbing, outcomes, completion.
//!
//! - **[`CopyContext`]** — caller-owned cancellation token plus trace id.
//! - **[`ExecutionArgs`] / [`CopySummary`]** — what a callback receives.
//! - **[`CopyOutcome`] / [`CopyResult`]** — what a callback returns.
//! - **[`CompletionHandle`]** — the one-shot sink the caller awaits.
//!
//! The internal request record and completion slot live here too; the
//! scheduler core consumes them but never exposes them.

mod callback;
mod context;
mod outcome;
mod request;

pub use callback::{BoxCopyFuture, CopySummary, ExecutionArgs};
pub use context::CopyContext;
pub use outcome::{CopyCode, CopyOutcome, CopyResult};
pub use request::CompletionHandle;

pub(crate) use callback::CopyCallback;
pub(crate) use request::{CompletionSlot, CopyRequest};
