//! # LogWriter — simple event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//! Use it for test or demo.
//!
//! ## Example output
//! ```text
//! [submitted] copy=12 class=pull:pin:a0 attempt=0
//! [admitted] copy=12 class=pull:pin:a0 wait=1.2ms
//! [completed] copy=12 class=pull:pin:a0
//! [timed-out] copy=13 class=push:place:a1:random
//! [shutdown-requested]
//! [drain-completed]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn class_label(e: &Event) -> String {
    e.class.map(|c| c.to_string()).unwrap_or_default()
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::CopySubmitted => {
                println!(
                    "[submitted] copy={:?} class={} attempt={:?}",
                    e.copy,
                    class_label(e),
                    e.attempt
                );
            }
            EventKind::CopyRejected => {
                println!("[rejected] copy={:?} err={:?}", e.copy, e.error);
            }
            EventKind::CopyAdmitted => {
                println!(
                    "[admitted] copy={:?} class={} wait={:?}",
                    e.copy,
                    class_label(e),
                    e.queue_wait
                );
            }
            EventKind::CopyCompleted => {
                println!("[completed] copy={:?} class={}", e.copy, class_label(e));
            }
            EventKind::CopyFailed => {
                println!(
                    "[failed] copy={:?} class={} err={:?}",
                    e.copy,
                    class_label(e),
                    e.error
                );
            }
            EventKind::CopyTimedOut => {
                println!("[timed-out] copy={:?} class={}", e.copy, class_label(e));
            }
            EventKind::CopyDropped => {
                println!("[dropped] copy={:?} class={}", e.copy, class_label(e));
            }
            EventKind::ShutdownRequested => {
                println!("[shutdown-requested]");
            }
            EventKind::DrainCompleted => {
                println!("[drain-completed]");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
