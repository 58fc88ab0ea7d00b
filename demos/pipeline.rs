//! # Demo: a burst of prioritized copies with the log subscriber
//!
//! Run with: `cargo run --example pipeline --features logging`

use std::sync::Arc;
use std::time::Duration;

use peercopy::{
    CopyContext, CopyError, CopyLocationSource, CopyOutcome, CopyReason, CopyScheduler, LogWriter,
    SchedulerConfig,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut cfg = SchedulerConfig::default();
    cfg.cycle_quota = 2;
    cfg.max_inflight_global = 4;

    let scheduler = CopyScheduler::new(cfg, vec![Arc::new(LogWriter::new()) as _]);
    scheduler.startup().await?;

    // A pin pull: most urgent class, admitted first.
    let pin = scheduler.schedule_outbound_pull(
        CopyReason::Pin,
        CopyContext::with_trace("pin-7f3a"),
        0,
        |_| async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(CopyOutcome::copied(1 << 20))
        },
    );

    // A proactive push to a randomly picked peer: background class.
    let proactive = scheduler.schedule_outbound_push(
        CopyReason::ProactiveBackground,
        CopyContext::with_trace("bg-0041"),
        CopyLocationSource::Random,
        0,
        |args| async move {
            println!(
                "[demo] proactive push admitted after {:?} (class {})",
                args.summary.queue_wait, args.class
            );
            Ok(CopyOutcome::skipped())
        },
    );

    // A copy that fails; the error reaches its caller, nothing else.
    let failing = scheduler.schedule_outbound_pull(
        CopyReason::Place,
        CopyContext::with_trace("place-bad"),
        1,
        |_| async {
            Err(CopyError::Fail {
                reason: "peer refused connection".into(),
            })
        },
    );

    println!("[demo] pin copy: {:?}", pin.outcome().await);
    println!("[demo] proactive push: {:?}", proactive.outcome().await);
    println!("[demo] failing copy: {:?}", failing.outcome().await);

    scheduler.shutdown().await?;

    let snap = scheduler.telemetry();
    println!(
        "[demo] submitted={} admitted={} completed={}",
        snap.global.submitted, snap.global.admitted, snap.global.completed
    );
    Ok(())
}
