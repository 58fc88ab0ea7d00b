//! # Copy callback plumbing.
//!
//! A copy callback is a one-shot async function
//! `FnOnce(ExecutionArgs) -> Future<Output = CopyResult>`. One-shot because
//! a request runs at most once; retry policy belongs to the caller, who
//! re-submits with `attempt + 1`.
//!
//! ## Contract
//! - The callback owns the actual copy I/O; the scheduler only decides when
//!   it runs.
//! - The [`CopyContext`] inside [`ExecutionArgs`] carries the **linked**
//!   token (caller token ∨ scheduler shutdown). Implementations must check
//!   it periodically and return [`CopyError::Canceled`] promptly when it
//!   fires.

use std::time::Duration;

use futures::future::BoxFuture;

use crate::priority::PriorityClass;

use super::context::CopyContext;
use super::outcome::CopyResult;

/// Boxed future returned by a copy callback.
pub type BoxCopyFuture = BoxFuture<'static, CopyResult>;

/// Boxed one-shot copy callback, as stored in a request record.
pub(crate) type CopyCallback = Box<dyn FnOnce(ExecutionArgs) -> BoxCopyFuture + Send + 'static>;

/// Queue-side observations handed to a callback for telemetry reporting.
#[derive(Debug, Clone, Copy)]
pub struct CopySummary {
    /// Time spent queued between submission and admission.
    pub queue_wait: Duration,
    /// Backlog of the request's class observed at admission, the admitted
    /// request included (a lone request reports 1).
    pub priority_queue_length: u32,
}

/// Everything the executor hands to a copy callback.
pub struct ExecutionArgs {
    /// Caller context with the **linked** cancellation token swapped in.
    pub context: CopyContext,
    /// Queue-side observations for the caller's telemetry.
    pub summary: CopySummary,
    /// The class the request was admitted under.
    pub class: PriorityClass,
}
