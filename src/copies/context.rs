//! # Caller context attached to a copy request.
//!
//! [`CopyContext`] carries the caller's [`CancellationToken`] and a trace
//! identifier. The scheduler treats it as opaque: the token participates in
//! the linked cancellation the callback observes, the trace id is attached
//! to lifecycle events.

use std::borrow::Cow;

use tokio_util::sync::CancellationToken;

/// Opaque caller context: cancellation token + trace id.
///
/// Cancelling the token asks the copy (queued or running) to stop; a
/// well-behaved callback observes the linked token it receives in
/// [`ExecutionArgs`](crate::ExecutionArgs) and returns
/// [`CopyError::Canceled`](crate::CopyError::Canceled) promptly.
#[derive(Clone, Debug, Default)]
pub struct CopyContext {
    cancel: CancellationToken,
    trace_id: Cow<'static, str>,
}

impl CopyContext {
    /// Creates a context with a fresh token and an empty trace id.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context with a fresh token and the given trace id.
    pub fn with_trace(trace_id: impl Into<Cow<'static, str>>) -> Self {
        Self {
            cancel: CancellationToken::new(),
            trace_id: trace_id.into(),
        }
    }

    /// Replaces the cancellation token, keeping the trace id.
    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// The caller's cancellation token.
    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Trace identifier for logs/events (may be empty).
    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    /// Same trace, different token; used when handing the linked token to
    /// the callback.
    pub(crate) fn linked(&self, token: CancellationToken) -> Self {
        Self {
            cancel: token,
            trace_id: self.trace_id.clone(),
        }
    }
}
