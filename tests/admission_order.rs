//! Ordering guarantees through the public API with the dispatcher loop
//! running: FIFO within a class, priority across classes, cancellation
//! propagation.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use peercopy::{
    CopyContext, CopyError, CopyLocationSource, CopyOutcome, CopyReason, CopyScheduler,
    SchedulerConfig,
};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn admission_follows_class_rank_then_submission_order() {
    let mut cfg = SchedulerConfig::default();
    cfg.cycle_interval = Duration::from_millis(1);
    // One admission per cycle makes the order fully observable.
    cfg.cycle_quota = 1;
    cfg.max_inflight_global = 1;
    let scheduler = CopyScheduler::new(cfg, Vec::new());

    let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
    let record = |tag: &'static str| {
        let order = Arc::clone(&order);
        move |_args: peercopy::ExecutionArgs| async move {
            order.lock().unwrap().push(tag);
            Ok(CopyOutcome::copied(0))
        }
    };

    // Submitted before startup so the first cycle sees the whole burst.
    let handles = vec![
        scheduler.schedule_outbound_pull(CopyReason::Pin, CopyContext::new(), 0, record("pull-pin-1")),
        scheduler.schedule_outbound_pull(CopyReason::Pin, CopyContext::new(), 0, record("pull-pin-2")),
        scheduler.schedule_outbound_push(
            CopyReason::Pin,
            CopyContext::new(),
            CopyLocationSource::Designated,
            0,
            record("push-pin"),
        ),
        scheduler.schedule_outbound_pull(CopyReason::None, CopyContext::new(), 4, record("pull-none")),
        scheduler.schedule_outbound_pull(CopyReason::Place, CopyContext::new(), 0, record("pull-place")),
    ];

    scheduler.startup().await.unwrap();
    for handle in handles {
        handle.outcome().await.unwrap();
    }
    scheduler.shutdown().await.unwrap();

    let order = order.lock().unwrap().clone();
    assert_eq!(
        order,
        vec!["pull-pin-1", "pull-pin-2", "pull-place", "pull-none", "push-pin"]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn burst_is_admitted_and_completed_with_enough_quota() {
    let mut cfg = SchedulerConfig::default();
    cfg.cycle_interval = Duration::from_millis(1);
    let scheduler = CopyScheduler::new(cfg, Vec::new());
    scheduler.startup().await.unwrap();

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let reason = if i % 2 == 0 {
                CopyReason::Pin
            } else {
                CopyReason::ProactiveCopyOnPut
            };
            scheduler.schedule_outbound_pull(reason, CopyContext::new(), 0, move |_| async move {
                Ok(CopyOutcome::copied(i))
            })
        })
        .collect();

    for handle in handles {
        handle.outcome().await.unwrap();
    }

    let snap = scheduler.telemetry();
    assert_eq!(snap.global.submitted, 10);
    assert_eq!(snap.global.admitted, 10);
    assert_eq!(snap.global.completed, 10);
    scheduler.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn caller_cancellation_propagates_through_the_linked_token() {
    let mut cfg = SchedulerConfig::default();
    cfg.cycle_interval = Duration::from_millis(1);
    let scheduler = CopyScheduler::new(cfg, Vec::new());
    scheduler.startup().await.unwrap();

    let context = CopyContext::with_trace("cancel-me");
    let caller_token = context.token().clone();
    let (started_tx, started_rx) = tokio::sync::oneshot::channel::<()>();

    let handle =
        scheduler.schedule_outbound_pull(CopyReason::Pin, context, 0, move |args| async move {
            let _ = started_tx.send(());
            args.context.token().cancelled().await;
            Err(CopyError::Canceled)
        });

    started_rx.await.unwrap();
    caller_token.cancel();

    // Caller-initiated cancel, not shutdown: Canceled passes through.
    assert_eq!(handle.outcome().await, Err(CopyError::Canceled));
    scheduler.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn per_class_counters_track_the_classes_used() {
    let mut cfg = SchedulerConfig::default();
    cfg.cycle_interval = Duration::from_millis(1);
    let scheduler = CopyScheduler::new(cfg, Vec::new());
    scheduler.startup().await.unwrap();

    let pull = scheduler
        .schedule_outbound_pull(CopyReason::Pin, CopyContext::new(), 0, |_| async {
            Ok(CopyOutcome::copied(1))
        });
    let push = scheduler.schedule_outbound_push(
        CopyReason::Place,
        CopyContext::new(),
        CopyLocationSource::Random,
        2,
        |_| async { Ok(CopyOutcome::skipped()) },
    );
    pull.outcome().await.unwrap();
    push.outcome().await.unwrap();

    let snap = scheduler.telemetry();
    let pull_class = peercopy::PriorityClass::classify(
        peercopy::CopyDirection::OutboundPull,
        CopyReason::Pin,
        0,
        None,
    );
    let push_class = peercopy::PriorityClass::classify(
        peercopy::CopyDirection::OutboundPush,
        CopyReason::Place,
        2,
        Some(CopyLocationSource::Random),
    );
    assert_eq!(snap.for_class(pull_class).completed, 1);
    assert_eq!(snap.for_class(push_class).completed, 1);
    scheduler.shutdown().await.unwrap();
}
