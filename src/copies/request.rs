//! # Request record and resolve-exactly-once completion.
//!
//! [`CompletionSlot`] is the single point where a request's fate is
//! decided. Three parties race for it:
//!
//! - the dispatcher, claiming admission ([`CompletionSlot::claim_admission`]),
//! - the deadline watcher, trying to time the request out
//!   ([`CompletionSlot::resolve_if_waiting`]),
//! - the shutdown drain / executor, resolving the final result
//!   ([`CompletionSlot::resolve`]).
//!
//! The slot's lock makes the race atomic: a claimed request can no longer
//! time out, a resolved request can no longer be claimed. Whatever happens,
//! the caller's oneshot fires at most once.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::error::CopyError;
use crate::priority::PriorityClass;

use super::callback::CopyCallback;
use super::context::CopyContext;
use super::outcome::CopyResult;

/// One-shot sink the caller awaits for a request's final outcome.
///
/// Resolves exactly once with the callback's outcome or a scheduler
/// failure code ([`CopyError::Timeout`] / [`CopyError::Shutdown`]).
#[derive(Debug)]
pub struct CompletionHandle {
    rx: oneshot::Receiver<CopyResult>,
}

impl CompletionHandle {
    /// Waits for the copy's final outcome.
    ///
    /// A scheduler that vanished without resolving (dropped before
    /// `shutdown`) reads as [`CopyError::Shutdown`].
    pub async fn outcome(self) -> CopyResult {
        self.rx.await.unwrap_or(Err(CopyError::Shutdown))
    }

    /// Non-blocking probe: `Some` once the completion has resolved.
    pub fn try_outcome(&mut self) -> Option<CopyResult> {
        match self.rx.try_recv() {
            Ok(res) => Some(res),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(CopyError::Shutdown)),
        }
    }
}

struct SlotState {
    tx: Option<oneshot::Sender<CopyResult>>,
    admitted: bool,
}

/// Shared resolve-exactly-once state of one pending copy.
pub(crate) struct CompletionSlot {
    state: Mutex<SlotState>,
}

impl CompletionSlot {
    /// Creates a slot and the handle the caller will await.
    pub(crate) fn new() -> (Arc<Self>, CompletionHandle) {
        let (tx, rx) = oneshot::channel();
        let slot = Arc::new(Self {
            state: Mutex::new(SlotState {
                tx: Some(tx),
                admitted: false,
            }),
        });
        (slot, CompletionHandle { rx })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolves unconditionally. Returns `false` if already resolved.
    pub(crate) fn resolve(&self, result: CopyResult) -> bool {
        match self.lock().tx.take() {
            Some(tx) => {
                // Caller dropping the handle is fine; the send result is moot.
                let _ = tx.send(result);
                true
            }
            None => false,
        }
    }

    /// Resolves only while the request is still waiting for admission.
    ///
    /// The deadline watcher uses this: an admitted request can no longer
    /// time out.
    pub(crate) fn resolve_if_waiting(&self, result: CopyResult) -> bool {
        let mut state = self.lock();
        if state.admitted {
            return false;
        }
        match state.tx.take() {
            Some(tx) => {
                let _ = tx.send(result);
                true
            }
            None => false,
        }
    }

    /// Atomically marks the request admitted.
    ///
    /// Returns `false` when the request has already been resolved (timed
    /// out or drained); the dispatcher must then discard it unexecuted.
    pub(crate) fn claim_admission(&self) -> bool {
        let mut state = self.lock();
        if state.tx.is_none() || state.admitted {
            return false;
        }
        state.admitted = true;
        true
    }

    /// True once the completion has fired.
    #[cfg(test)]
    pub(crate) fn is_resolved(&self) -> bool {
        self.lock().tx.is_none()
    }
}

/// Immutable descriptor of one pending copy.
///
/// Direction, reason, and source are recoverable from `class`; `attempt`
/// is kept unclamped for event reporting.
pub(crate) struct CopyRequest {
    /// Monotonic submission sequence number; FIFO tie-break within a class.
    pub(crate) id: u64,
    pub(crate) class: PriorityClass,
    pub(crate) attempt: u32,
    pub(crate) context: CopyContext,
    pub(crate) callback: CopyCallback,
    pub(crate) enqueued_at: Instant,
    pub(crate) completion: Arc<CompletionSlot>,
    /// Cancelled on admission (or final drain) to stop the deadline watcher.
    pub(crate) admit_guard: CancellationToken,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_exactly_once() {
        let (slot, handle) = CompletionSlot::new();
        assert!(slot.resolve(Err(CopyError::Shutdown)));
        assert!(!slot.resolve(Err(CopyError::Canceled)));
        assert_eq!(handle.outcome().await, Err(CopyError::Shutdown));
    }

    #[tokio::test]
    async fn admission_claim_blocks_timeout() {
        let (slot, mut handle) = CompletionSlot::new();
        assert!(slot.claim_admission());
        assert!(!slot.resolve_if_waiting(Err(CopyError::Shutdown)));
        assert!(handle.try_outcome().is_none());
    }

    #[tokio::test]
    async fn timeout_blocks_admission_claim() {
        let (slot, _handle) = CompletionSlot::new();
        assert!(slot.resolve_if_waiting(Err(CopyError::Canceled)));
        assert!(!slot.claim_admission());
        assert!(slot.is_resolved());
    }

    #[tokio::test]
    async fn double_claim_is_rejected() {
        let (slot, _handle) = CompletionSlot::new();
        assert!(slot.claim_admission());
        assert!(!slot.claim_admission());
    }
}
