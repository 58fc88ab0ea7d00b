//! Lifecycle semantics through the public API: admission timeouts,
//! shutdown of pending and in-flight work, idempotence.

use std::sync::Arc;
use std::time::Duration;

use peercopy::{
    CopyContext, CopyError, CopyOutcome, CopyReason, CopyScheduler, SchedulerConfig,
};

fn quick_cycles() -> SchedulerConfig {
    let mut cfg = SchedulerConfig::default();
    cfg.cycle_interval = Duration::from_millis(1);
    cfg
}

#[tokio::test]
async fn zero_timeout_fails_without_any_cycle() {
    let mut cfg = SchedulerConfig::default();
    cfg.scheduler_timeout = Duration::ZERO;
    // Never started: no dispatch cycle will ever observe the request.
    let scheduler = CopyScheduler::new(cfg, Vec::new());

    let handle = scheduler
        .schedule_outbound_pull(CopyReason::Pin, CopyContext::new(), 0, |_| async {
            Ok(CopyOutcome::copied(1))
        });

    match handle.outcome().await {
        Err(CopyError::Timeout { timeout }) => assert_eq!(timeout, Duration::ZERO),
        other => panic!("expected Timeout, got {other:?}"),
    }
    assert_eq!(scheduler.telemetry().global.timed_out, 1);
    assert_eq!(scheduler.telemetry().global.admitted, 0);
}

#[tokio::test]
async fn submit_after_shutdown_resolves_shutdown_immediately() {
    let scheduler = CopyScheduler::new(quick_cycles(), Vec::new());
    scheduler.startup().await.unwrap();
    scheduler.shutdown().await.unwrap();

    let handle = scheduler
        .schedule_outbound_pull(CopyReason::Pin, CopyContext::new(), 0, |_| async {
            Ok(CopyOutcome::copied(1))
        });
    assert_eq!(handle.outcome().await, Err(CopyError::Shutdown));
    assert_eq!(scheduler.telemetry().global.submitted, 0);
    assert_eq!(scheduler.telemetry().global.shut_down, 1);
}

#[tokio::test]
async fn shutdown_without_startup_fails_parked_submissions() {
    let scheduler = CopyScheduler::new(quick_cycles(), Vec::new());
    let handle = scheduler
        .schedule_outbound_pull(CopyReason::Place, CopyContext::new(), 0, |_| async {
            Ok(CopyOutcome::copied(1))
        });

    scheduler.shutdown().await.unwrap();
    assert_eq!(handle.outcome().await, Err(CopyError::Shutdown));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn shutdown_fails_pending_and_cancels_in_flight() {
    let mut cfg = quick_cycles();
    // One slot: the blocker occupies it, the second request stays queued.
    cfg.max_inflight_global = 1;
    let scheduler = CopyScheduler::new(cfg, Vec::new());
    scheduler.startup().await.unwrap();

    let (started_tx, started_rx) = tokio::sync::oneshot::channel::<()>();
    let in_flight = scheduler.schedule_outbound_pull(
        CopyReason::Pin,
        CopyContext::new(),
        0,
        move |args| async move {
            let _ = started_tx.send(());
            args.context.token().cancelled().await;
            Err(CopyError::Canceled)
        },
    );
    started_rx.await.unwrap();

    let pending = scheduler
        .schedule_outbound_pull(CopyReason::Pin, CopyContext::new(), 0, |_| async {
            Ok(CopyOutcome::copied(1))
        });

    scheduler.shutdown().await.unwrap();

    assert_eq!(pending.outcome().await, Err(CopyError::Shutdown));
    assert_eq!(in_flight.outcome().await, Err(CopyError::Shutdown));
    let snap = scheduler.telemetry();
    assert_eq!(snap.global.shut_down, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn callback_that_swallows_cancellation_keeps_its_outcome() {
    let scheduler = CopyScheduler::new(quick_cycles(), Vec::new());
    scheduler.startup().await.unwrap();

    let (started_tx, started_rx) = tokio::sync::oneshot::channel::<()>();
    let handle = scheduler.schedule_outbound_pull(
        CopyReason::Pin,
        CopyContext::new(),
        0,
        move |args| async move {
            let _ = started_tx.send(());
            args.context.token().cancelled().await;
            // Deliberately ignores the cancellation and reports success.
            Ok(CopyOutcome::copied(5))
        },
    );
    started_rx.await.unwrap();

    scheduler.shutdown().await.unwrap();
    assert_eq!(handle.outcome().await.unwrap().bytes, 5);
}

#[tokio::test]
async fn shutdown_is_idempotent() {
    let scheduler = CopyScheduler::new(quick_cycles(), Vec::new());
    scheduler.startup().await.unwrap();
    scheduler.shutdown().await.unwrap();
    scheduler.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn every_submission_resolves_after_shutdown() {
    let mut cfg = quick_cycles();
    cfg.max_inflight_global = 2;
    let scheduler = CopyScheduler::new(cfg, Vec::new());
    scheduler.startup().await.unwrap();

    let fast = scheduler
        .schedule_outbound_pull(CopyReason::Pin, CopyContext::new(), 0, |_| async {
            Ok(CopyOutcome::copied(1))
        });
    fast.outcome().await.unwrap();

    let blocker_started = Arc::new(tokio::sync::Notify::new());
    let notify = Arc::clone(&blocker_started);
    let blocker = scheduler.schedule_outbound_pull(
        CopyReason::Pin,
        CopyContext::new(),
        0,
        move |args| async move {
            notify.notify_one();
            args.context.token().cancelled().await;
            Err(CopyError::Canceled)
        },
    );
    blocker_started.notified().await;

    let handles: Vec<_> = (0..8)
        .map(|i| {
            scheduler.schedule_outbound_push(
                CopyReason::ProactiveBackground,
                CopyContext::new(),
                peercopy::CopyLocationSource::Random,
                0,
                move |_| async move { Ok(CopyOutcome::copied(i)) },
            )
        })
        .collect();

    scheduler.shutdown().await.unwrap();

    // Whatever their fate, every handle resolves exactly once.
    assert_eq!(blocker.outcome().await, Err(CopyError::Shutdown));
    for handle in handles {
        let _ = handle.outcome().await;
    }
    let snap = scheduler.telemetry();
    let accounted = snap.global.completed + snap.global.timed_out + snap.global.shut_down;
    assert_eq!(accounted, snap.global.submitted);
}
