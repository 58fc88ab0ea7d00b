//! # Dispatcher: the single cooperative scheduling loop.
//!
//! Owns the per-class queues and the admission controller; nothing else
//! mutates them. Submissions arrive through an unbounded channel and are
//! drained at the top of each cycle, so the whole admission computation is
//! race-free without locks.
//!
//! ## Loop
//! ```text
//! loop {
//!   ├─► idle (no backlog, nothing in flight)?
//!   │     └─► park until a submission arrives (or shutdown)
//!   ├─► busy?
//!   │     └─► sleep one cycle_interval (or shutdown)
//!   ├─► drain submission channel into class queues
//!   ├─► reap finished workers (decrement in-flight)
//!   └─► run one cycle: split budget, pop admitted, launch workers
//! }
//! drain: fail queued with Shutdown, await in-flight, check invariants
//! ```
//!
//! ## Rules
//! - The dispatcher **never awaits a user callback**; workers run on a
//!   [`JoinSet`] and are only reaped after completion.
//! - A request whose completion already resolved (admission timeout) is
//!   discarded at pop time, unexecuted, without spending budget.
//! - After the shutdown drain both the total backlog and the in-flight
//!   count are zero; anything else aborts.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::config::SchedulerConfig;
use crate::copies::{CopyRequest, CopySummary};
use crate::error::CopyError;
use crate::events::{Bus, Event, EventKind};
use crate::priority::PriorityClass;

use super::admission::AdmissionController;
use super::executor;
use super::queues::ClassQueues;
use super::telemetry::Telemetry;
use super::fatal;

/// The scheduling loop state. Created by the facade, consumed by `run`.
pub(crate) struct Dispatcher {
    cfg: SchedulerConfig,
    queues: ClassQueues,
    admission: AdmissionController,
    rx: mpsc::UnboundedReceiver<CopyRequest>,
    workers: JoinSet<PriorityClass>,
    shutdown: CancellationToken,
    bus: Bus,
    telemetry: Arc<Telemetry>,
}

impl Dispatcher {
    pub(crate) fn new(
        cfg: SchedulerConfig,
        rx: mpsc::UnboundedReceiver<CopyRequest>,
        shutdown: CancellationToken,
        bus: Bus,
        telemetry: Arc<Telemetry>,
    ) -> Self {
        let admission = AdmissionController::new(&cfg);
        Self {
            cfg,
            queues: ClassQueues::new(),
            admission,
            rx,
            workers: JoinSet::new(),
            shutdown,
            bus,
            telemetry,
        }
    }

    /// Runs cycles until shutdown (or until the facade vanishes), then
    /// drains.
    pub(crate) async fn run(mut self) {
        let shutdown = self.shutdown.clone();
        loop {
            if shutdown.is_cancelled() {
                break;
            }
            let idle = self.queues.is_empty() && self.admission.total_inflight() == 0;
            if idle {
                // Park; a submission wakes the cycle early.
                let received = tokio::select! {
                    _ = shutdown.cancelled() => break,
                    received = self.rx.recv() => received,
                };
                match received {
                    Some(request) => self.queues.push(request),
                    // Facade dropped without shutdown; drain what's left.
                    None => break,
                }
            } else {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = time::sleep(self.cfg.cycle_interval) => {}
                }
            }

            self.drain_submissions();
            self.reap_workers();
            let budget = self.admission.cycle_budget();
            self.run_cycle(budget);
        }

        self.drain().await;
    }

    /// Moves every buffered submission into its class queue.
    pub(crate) fn drain_submissions(&mut self) -> usize {
        let mut moved = 0;
        while let Ok(request) = self.rx.try_recv() {
            self.queues.push(request);
            moved += 1;
        }
        moved
    }

    /// Collects finished workers and releases their in-flight slots.
    pub(crate) fn reap_workers(&mut self) {
        while let Some(joined) = self.workers.try_join_next() {
            match joined {
                Ok(class) => self.admission.mark_finished(class),
                // Workers isolate callback panics; a join error here means
                // the executor itself died.
                Err(_) => fatal("copy worker task failed"),
            }
        }
    }

    /// Runs one admission cycle with an explicit budget.
    ///
    /// Returns the number of requests actually handed to workers.
    pub(crate) fn run_cycle(&mut self, budget: u32) -> u32 {
        if budget == 0 || self.queues.is_empty() {
            return 0;
        }
        let backlog = self.queues.backlog();
        let assigned = self.admission.split(&backlog, budget);

        let mut admitted = 0;
        for (index, &want) in assigned.iter().enumerate() {
            let class = PriorityClass::from_index(index);
            let mut granted = 0;
            while granted < want {
                let Some(request) = self.queues.pop(class) else {
                    break;
                };
                if !request.completion.claim_admission() {
                    // Timed out while queued; never ran, spends no budget.
                    request.admit_guard.cancel();
                    continue;
                }
                self.launch(request);
                granted += 1;
            }
            admitted += granted;
        }
        admitted
    }

    /// Hands one claimed request to a worker task.
    fn launch(&mut self, request: CopyRequest) {
        let class = request.class;
        let queue_wait = request.enqueued_at.elapsed();
        let summary = CopySummary {
            queue_wait,
            // Backlog observed at admission, this request included.
            priority_queue_length: self.queues.len(class) as u32 + 1,
        };
        request.admit_guard.cancel();

        self.admission.mark_launched(class);
        self.telemetry.record_admitted(class);
        self.bus.publish(
            Event::now(EventKind::CopyAdmitted)
                .with_copy(request.id)
                .with_class(class)
                .with_attempt(request.attempt)
                .with_queue_wait(queue_wait)
                .with_trace(request.context.trace_id()),
        );

        self.workers.spawn(executor::execute(
            request,
            summary,
            self.shutdown.clone(),
            self.bus.clone(),
            Arc::clone(&self.telemetry),
        ));
    }

    /// Shutdown drain: fail everything queued, await everything in flight.
    async fn drain(mut self) {
        // Submissions racing the shutdown land in the channel; take them too.
        self.rx.close();
        self.drain_submissions();

        for request in self.queues.drain_all() {
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

        // Linked tokens already fired (they are children of the shutdown
        // token); wait for every callback to observe and return.
        while let Some(joined) = self.workers.join_next().await {
            match joined {
                Ok(class) => self.admission.mark_finished(class),
                Err(_) => fatal("copy worker task failed"),
            }
        }

        if !self.queues.is_empty() || self.admission.total_inflight() != 0 {
            fatal("shutdown drain left work behind");
        }
        self.bus.publish(Event::now(EventKind::DrainCompleted));
    }
}
