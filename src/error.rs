//! # Error types used by the copy scheduler and copy callbacks.
//!
//! Two enums, split the same way the failures are produced:
//!
//! - [`SchedulerError`] — failures of lifecycle operations (`startup`,
//!   configuration validation).
//! - [`CopyError`] — the failure a completion handle resolves with, whether
//!   produced by the scheduler (`Timeout`, `Shutdown`) or returned by the
//!   copy callback itself (`Fail`, `Canceled`). Callback-originated values
//!   pass through to the caller untouched; the scheduler never rewrites
//!   them and never lets them influence later scheduling.
//!
//! Both types provide `as_label` for logs/metrics.

use std::time::Duration;

use thiserror::Error;

/// # Errors produced by scheduler lifecycle operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// Configuration rejected at startup.
    #[error("invalid scheduler configuration: {reason}")]
    InvalidConfig {
        /// What was wrong.
        reason: String,
    },
    /// `startup` was called while the dispatcher is already running.
    #[error("scheduler already started")]
    AlreadyStarted,
    /// `startup` was called after shutdown completed.
    #[error("scheduler is stopped")]
    Stopped,
}

impl SchedulerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SchedulerError::InvalidConfig { .. } => "scheduler_invalid_config",
            SchedulerError::AlreadyStarted => "scheduler_already_started",
            SchedulerError::Stopped => "scheduler_stopped",
        }
    }
}

/// # Failure a copy completion resolves with.
///
/// `Timeout` and `Shutdown` are produced by the scheduler; `Fail` and
/// `Canceled` are returned by callbacks. A `Canceled` returned while the
/// scheduler is shutting down is reported to the caller as `Shutdown`.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CopyError {
    /// The request was not admitted within the scheduler timeout.
    #[error("copy not admitted within {timeout:?}")]
    Timeout {
        /// The configured admission timeout.
        timeout: Duration,
    },

    /// The scheduler shut down before the copy produced an outcome.
    #[error("scheduler shut down")]
    Shutdown,

    /// The callback observed its cancellation token and exited.
    ///
    /// This is **not an error** in the traditional sense; it acknowledges
    /// intentional termination requested through the caller's token.
    #[error("copy canceled")]
    Canceled,

    /// The copy itself failed; the callback's message is preserved.
    #[error("copy failed: {reason}")]
    Fail {
        /// Callback-provided failure description.
        reason: String,
    },
}

impl CopyError {
    /// Returns a short stable label.
    pub fn as_label(&self) -> &'static str {
        match self {
            CopyError::Timeout { .. } => "copy_timeout",
            CopyError::Shutdown => "copy_shutdown",
            CopyError::Canceled => "copy_canceled",
            CopyError::Fail { .. } => "copy_failed",
        }
    }

    /// True for the scheduler-produced failure codes.
    pub fn is_scheduler_failure(&self) -> bool {
        matches!(self, CopyError::Timeout { .. } | CopyError::Shutdown)
    }
}
