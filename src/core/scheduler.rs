//! # CopyScheduler: public facade and lifecycle controller.
//!
//! The [`CopyScheduler`] owns the runtime components (event bus, subscriber
//! set, telemetry, shutdown token) and orchestrates the dispatcher from
//! startup to graceful drain.
//!
//! - Classify and enqueue copy requests (`schedule_outbound_pull/push`)
//! - Arm one deadline watcher per request (admission timeout)
//! - Spawn/stop the dispatcher loop (`startup` / `shutdown`)
//! - Fan out events to subscribers via [`SubscriberSet`]
//!
//! ## Lifecycle
//! ```text
//! NotStarted ──startup()──► Running ──shutdown()──► ShuttingDown ──► Stopped
//! ```
//! Transitions are monotone; `shutdown` is idempotent. Submissions are
//! accepted in `NotStarted` (parked in the channel until startup) and
//! `Running`; from `ShuttingDown` on they resolve immediately with
//! `Shutdown`.
//!
//! ## Rules
//! - Submission is synchronous and O(1): classify, register, channel send.
//! - Every accepted request gets a deadline watcher; admission atomically
//!   disarms it.
//! - `shutdown` returns only after every queued request is failed and every
//!   in-flight callback has returned.
//!
//! ```no_run
//! use peercopy::{CopyContext, CopyOutcome, CopyReason, CopyScheduler, SchedulerConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let scheduler = CopyScheduler::new(SchedulerConfig::default(), Vec::new());
//!     scheduler.startup().await?;
//!
//!     let handle = scheduler.schedule_outbound_pull(
//!         CopyReason::Pin,
//!         CopyContext::with_trace("build-17"),
//!         0,
//!         |args| async move {
//!             // the copy I/O lives here; honor args.context.token()
//!             let _ = args.summary.queue_wait;
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

use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::SchedulerConfig;
use crate::copies::{
    BoxCopyFuture, CompletionHandle, CompletionSlot, CopyCallback, CopyContext, CopyRequest,
    CopyResult, ExecutionArgs,
};
use crate::error::{CopyError, SchedulerError};
use crate::events::{Bus, Event, EventKind};
use crate::priority::{CopyDirection, CopyLocationSource, CopyReason, PriorityClass};
use crate::subscribers::{Subscribe, SubscriberSet};

use super::dispatcher::Dispatcher;
use super::telemetry::{Telemetry, TelemetrySnapshot};

const NOT_STARTED: u8 = 0;
const RUNNING: u8 = 1;
const SHUTTING_DOWN: u8 = 2;
const STOPPED: u8 = 3;

struct Inner {
    rx: Option<mpsc::UnboundedReceiver<CopyRequest>>,
    dispatcher: Option<JoinHandle<()>>,
}

/// Prioritized admission-and-dispatch engine for outbound copies.
///
/// One instance per process side; no ambient singleton. Construct it,
/// pass it to the callers that submit copies, `startup` once, `shutdown`
/// once.
pub struct CopyScheduler {
    cfg: SchedulerConfig,
    bus: Bus,
    subscribers: Arc<SubscriberSet>,
    telemetry: Arc<Telemetry>,
    shutdown: CancellationToken,
    state: AtomicU8,
    next_id: AtomicU64,
    tx: mpsc::UnboundedSender<CopyRequest>,
    lifecycle: Mutex<Inner>,
}

impl CopyScheduler {
    /// Creates a scheduler with the given config and subscribers (maybe
    /// empty). Must be called inside a tokio runtime.
    pub fn new(cfg: SchedulerConfig, subscribers: Vec<Arc<dyn Subscribe>>) -> Arc<Self> {
        let telemetry = Arc::new(Telemetry::new());
        let capacity = cfg.bus_capacity.max(1);
        let bus = Bus::new(capacity, Arc::clone(&telemetry));
        let subscribers = Arc::new(SubscriberSet::new(
            subscribers,
            capacity,
            Arc::clone(&telemetry),
        ));
        let (tx, rx) = mpsc::unbounded_channel();

        let scheduler = Arc::new(Self {
            cfg,
            bus,
            subscribers,
            telemetry,
            shutdown: CancellationToken::new(),
            state: AtomicU8::new(NOT_STARTED),
            next_id: AtomicU64::new(0),
            tx,
            lifecycle: Mutex::new(Inner {
                rx: Some(rx),
                dispatcher: None,
            }),
        });
        scheduler.spawn_subscriber_listener();
        scheduler
    }

    /// Validates the configuration and spawns the dispatcher loop.
    pub async fn startup(&self) -> Result<(), SchedulerError> {
        self.cfg
            .validate()
            .map_err(|reason| SchedulerError::InvalidConfig { reason })?;

        let mut inner = self.lifecycle.lock().await;
        match self.state.load(Ordering::SeqCst) {
            NOT_STARTED => {}
            RUNNING => return Err(SchedulerError::AlreadyStarted),
            _ => return Err(SchedulerError::Stopped),
        }
        let rx = match inner.rx.take() {
            Some(rx) => rx,
            None => return Err(SchedulerError::AlreadyStarted),
        };

        let dispatcher = Dispatcher::new(
            self.cfg.clone(),
            rx,
            self.shutdown.clone(),
            self.bus.clone(),
            Arc::clone(&self.telemetry),
        );
        inner.dispatcher = Some(tokio::spawn(dispatcher.run()));
        self.state.store(RUNNING, Ordering::SeqCst);
        Ok(())
    }

    /// Stops the dispatcher, fails pending work, and waits for in-flight
    /// callbacks to return.
    ///
    /// Idempotent: repeated calls (and calls racing a shutdown in progress)
    /// return `Ok` once the drain has completed.
    pub async fn shutdown(&self) -> Result<(), SchedulerError> {
        let mut inner = self.lifecycle.lock().await;
        if self.state.load(Ordering::SeqCst) == STOPPED {
            return Ok(());
        }

        self.state.store(SHUTTING_DOWN, Ordering::SeqCst);
        self.bus.publish(Event::now(EventKind::ShutdownRequested));
        self.shutdown.cancel();

        if let Some(handle) = inner.dispatcher.take() {
            if handle.await.is_err() {
                super::fatal("dispatcher task failed");
            }
        } else if let Some(mut rx) = inner.rx.take() {
            // Never started: whatever reached the channel is still pending.
            rx.close();
            while let Ok(request) = rx.try_recv() {
                request.admit_guard.cancel();
                if request
                    .completion
                    .resolve_if_waiting(Err(CopyError::Shutdown))
                {
                    self.telemetry.record_shut_down(request.class);
                    self.bus.publish(
                        Event::now(EventKind::CopyDropped)
                            .with_copy(request.id)
                            .with_class(request.class)
                            .with_trace(request.context.trace_id()),
                    );
                }
            }
            self.bus.publish(Event::now(EventKind::DrainCompleted));
        }

        self.state.store(STOPPED, Ordering::SeqCst);
        Ok(())
    }

    /// Submits a pull: fetch content from a remote peer into the local
    /// store.
    ///
    /// Returns immediately; the returned handle resolves with the
    /// callback's outcome or a scheduler failure code.
    pub fn schedule_outbound_pull<F, Fut>(
        &self,
        reason: CopyReason,
        context: CopyContext,
        attempt: u32,
        callback: F,
    ) -> CompletionHandle
    where
        F: FnOnce(ExecutionArgs) -> Fut + Send + 'static,
        Fut: Future<Output = CopyResult> + Send + 'static,
    {
        self.submit(CopyDirection::OutboundPull, reason, attempt, None, context, callback)
    }

    /// Submits a push: send content from the local store to a remote peer.
    pub fn schedule_outbound_push<F, Fut>(
        &self,
        reason: CopyReason,
        context: CopyContext,
        source: CopyLocationSource,
        attempt: u32,
        callback: F,
    ) -> CompletionHandle
    where
        F: FnOnce(ExecutionArgs) -> Fut + Send + 'static,
        Fut: Future<Output = CopyResult> + Send + 'static,
    {
        self.submit(
            CopyDirection::OutboundPush,
            reason,
            attempt,
            Some(source),
            context,
            callback,
        )
    }

    /// Snapshot of the scheduler counters.
    pub fn telemetry(&self) -> TelemetrySnapshot {
        self.telemetry.snapshot()
    }

    fn submit<F, Fut>(
        &self,
        direction: CopyDirection,
        reason: CopyReason,
        attempt: u32,
        source: Option<CopyLocationSource>,
        context: CopyContext,
        callback: F,
    ) -> CompletionHandle
    where
        F: FnOnce(ExecutionArgs) -> Fut + Send + 'static,
        Fut: Future<Output = CopyResult> + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let class = PriorityClass::classify(direction, reason, attempt, source);
        let (slot, handle) = CompletionSlot::new();

        if self.state.load(Ordering::SeqCst) >= SHUTTING_DOWN {
            slot.resolve(Err(CopyError::Shutdown));
            self.telemetry.record_shut_down(class);
            self.bus.publish(
                Event::now(EventKind::CopyRejected)
                    .with_copy(id)
                    .with_class(class)
                    .with_error("scheduler shut down")
                    .with_trace(context.trace_id()),
            );
            return handle;
        }

        let boxed: CopyCallback =
            Box::new(move |args: ExecutionArgs| -> BoxCopyFuture { Box::pin(callback(args)) });
        let admit_guard = CancellationToken::new();
        let request = CopyRequest {
            id,
            class,
            attempt,
            context: context.clone(),
            callback: boxed,
            enqueued_at: Instant::now(),
            completion: Arc::clone(&slot),
            admit_guard: admit_guard.clone(),
        };

        self.telemetry.record_submitted(class);
        self.bus.publish(
            Event::now(EventKind::CopySubmitted)
                .with_copy(id)
                .with_class(class)
                .with_attempt(attempt)
                .with_trace(context.trace_id()),
        );
        self.arm_deadline(id, class, Arc::clone(&slot), admit_guard);

        if self.tx.send(request).is_err() {
            // Dispatcher already gone; the request never reached a queue.
            if slot.resolve_if_waiting(Err(CopyError::Shutdown)) {
                self.telemetry.record_shut_down(class);
                self.bus.publish(
                    Event::now(EventKind::CopyRejected)
                        .with_copy(id)
                        .with_class(class)
                        .with_error("scheduler shut down")
                        .with_trace(context.trace_id()),
                );
            }
        }
        handle
    }

    /// Races the admission timeout against the dispatcher's claim.
    ///
    /// The watcher is a tiny task per pending request; admission (or the
    /// final drain) cancels `admit_guard` to disarm it. With a zero
    /// timeout the sleep is ready on first poll, so an unobserved request
    /// times out even if no cycle ever runs.
    fn arm_deadline(
        &self,
        id: u64,
        class: PriorityClass,
        slot: Arc<CompletionSlot>,
        admit_guard: CancellationToken,
    ) {
        let timeout = self.cfg.scheduler_timeout;
        let deadline = tokio::time::Instant::now() + timeout;
        let bus = self.bus.clone();
        let telemetry = Arc::clone(&self.telemetry);

        tokio::spawn(async move {
            tokio::select! {
                _ = admit_guard.cancelled() => {}
                _ = tokio::time::sleep_until(deadline) => {
                    if slot.resolve_if_waiting(Err(CopyError::Timeout { timeout })) {
                        telemetry.record_timed_out(class);
                        bus.publish(
                            Event::now(EventKind::CopyTimedOut)
                                .with_copy(id)
                                .with_class(class),
                        );
                    }
                }
            }
        });
    }

    /// Forwards bus events to the subscriber set until the bus closes.
    fn spawn_subscriber_listener(&self) {
        if self.subscribers.is_empty() {
            return;
        }
        let mut rx = self.bus.subscribe();
        let subscribers = Arc::clone(&self.subscribers);

        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => subscribers.emit_arc(Arc::new(event)),
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
        });
    }

    /// Test hook: builds the dispatcher without spawning it, so unit tests
    /// can drive cycles with explicit budgets.
    #[cfg(test)]
    pub(crate) async fn take_dispatcher(&self) -> Dispatcher {
        let mut inner = self.lifecycle.lock().await;
        let rx = inner.rx.take().expect("dispatcher already taken");
        self.state.store(RUNNING, Ordering::SeqCst);
        Dispatcher::new(
            self.cfg.clone(),
            rx,
            self.shutdown.clone(),
            self.bus.clone(),
            Arc::clone(&self.telemetry),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CopyOutcome;

    #[tokio::test]
    async fn startup_twice_is_rejected() {
        let scheduler = CopyScheduler::new(SchedulerConfig::default(), Vec::new());
        scheduler.startup().await.unwrap();
        assert!(matches!(
            scheduler.startup().await,
            Err(SchedulerError::AlreadyStarted)
        ));
        scheduler.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn startup_after_shutdown_is_rejected() {
        let scheduler = CopyScheduler::new(SchedulerConfig::default(), Vec::new());
        scheduler.startup().await.unwrap();
        scheduler.shutdown().await.unwrap();
        assert!(matches!(
            scheduler.startup().await,
            Err(SchedulerError::Stopped)
        ));
    }

    #[tokio::test]
    async fn invalid_config_is_reported_at_startup() {
        let mut cfg = SchedulerConfig::default();
        cfg.cycle_quota = 0;
        let scheduler = CopyScheduler::new(cfg, Vec::new());
        assert!(matches!(
            scheduler.startup().await,
            Err(SchedulerError::InvalidConfig { .. })
        ));
    }

    #[tokio::test]
    async fn submissions_before_startup_run_after_startup() {
        let scheduler = CopyScheduler::new(SchedulerConfig::default(), Vec::new());
        let handle = scheduler
            .schedule_outbound_pull(CopyReason::Place, CopyContext::new(), 0, |_| async {
                Ok(CopyOutcome::copied(11))
            });

        scheduler.startup().await.unwrap();
        assert_eq!(handle.outcome().await.unwrap().bytes, 11);
        scheduler.shutdown().await.unwrap();
    }
}
