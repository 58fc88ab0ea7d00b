//! # Run one admitted copy on a worker task.
//!
//! Executes the callback of a single admitted request, isolated from the
//! dispatcher:
//!
//! - **Refuse late starts**: a worker that observes shutdown before the
//!   callback is invoked resolves `Shutdown` without running it.
//! - **Link cancellation**: the callback sees one token that fires on the
//!   caller's token or on scheduler shutdown.
//! - **Isolate failures**: a panicking callback is caught; the error is
//!   surfaced to the caller and the dispatcher never notices.
//!
//! ## Outcome flow
//! ```text
//! Ok(outcome)            → completion Ok(outcome)        → CopyCompleted
//! Err(Canceled), shutdown → completion Err(Shutdown)     → CopyDropped
//! Err(e)                 → completion Err(e)             → CopyFailed
//! panic                  → completion Err(Fail{panic})   → CopyFailed
//! ```
//!
//! ## Rules
//! - Resolves the completion **exactly once**, then returns the class so
//!   the dispatcher can decrement its in-flight counter on reap.
//! - Never interrupts a running callback: cancellation only fires the
//!   linked token; the callback's return value is final, even a success
//!   returned after cancellation fired.

use std::any::Any;
use std::sync::Arc;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::copies::{CopyRequest, CopySummary, ExecutionArgs};
use crate::error::CopyError;
use crate::events::{Bus, Event, EventKind};
use crate::priority::PriorityClass;

use super::telemetry::Telemetry;

/// Runs one admitted request to completion on the current worker task.
pub(crate) async fn execute(
    request: CopyRequest,
    summary: CopySummary,
    shutdown: CancellationToken,
    bus: Bus,
    telemetry: Arc<Telemetry>,
) -> PriorityClass {
    let class = request.class;
    let id = request.id;

    // Admitted in the same cycle shutdown raced; the callback must not run.
    if shutdown.is_cancelled() {
        if request.completion.resolve(Err(CopyError::Shutdown)) {
            telemetry.record_shut_down(class);
            bus.publish(
                Event::now(EventKind::CopyDropped)
                    .with_copy(id)
                    .with_class(class),
            );
        }
        return class;
    }

    // One token for the callback: caller cancel ∨ scheduler shutdown.
    let linked = shutdown.child_token();
    let forwarder = {
        let caller = request.context.token().clone();
        let linked = linked.clone();
        tokio::spawn(async move {
            caller.cancelled().await;
            linked.cancel();
        })
    };

    let args = ExecutionArgs {
        context: request.context.linked(linked),
        summary,
        class,
    };
    let outcome = std::panic::AssertUnwindSafe((request.callback)(args))
        .catch_unwind()
        .await;
    forwarder.abort();

    match outcome {
        Ok(Ok(done)) => {
            if request.completion.resolve(Ok(done)) {
                telemetry.record_completed(class);
                bus.publish(
                    Event::now(EventKind::CopyCompleted)
                        .with_copy(id)
                        .with_class(class)
                        .with_trace(request.context.trace_id()),
                );
            }
        }
        Ok(Err(CopyError::Canceled)) if shutdown.is_cancelled() => {
            // Cooperative exit under shutdown reads as Shutdown to the caller.
            if request.completion.resolve(Err(CopyError::Shutdown)) {
                telemetry.record_shut_down(class);
                bus.publish(
                    Event::now(EventKind::CopyDropped)
                        .with_copy(id)
                        .with_class(class)
                        .with_trace(request.context.trace_id()),
                );
            }
        }
        Ok(Err(err)) => {
            let label = err.to_string();
            if request.completion.resolve(Err(err)) {
                telemetry.record_completed(class);
                bus.publish(
                    Event::now(EventKind::CopyFailed)
                        .with_copy(id)
                        .with_class(class)
                        .with_error(label)
                        .with_trace(request.context.trace_id()),
                );
            }
        }
        Err(panic) => {
            let reason = format!("copy callback panicked: {}", panic_reason(panic.as_ref()));
            if request.completion.resolve(Err(CopyError::Fail {
                reason: reason.clone(),
            })) {
                telemetry.record_completed(class);
                bus.publish(
                    Event::now(EventKind::CopyFailed)
                        .with_copy(id)
                        .with_class(class)
                        .with_error(reason)
                        .with_trace(request.context.trace_id()),
                );
            }
        }
    }

    class
}

fn panic_reason(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}
