//! # What a finished copy reports back.

use crate::error::CopyError;

/// Result a completion handle resolves with.
pub type CopyResult = Result<CopyOutcome, CopyError>;

/// Terminal disposition of a copy as reported by its callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyCode {
    /// Content was transferred.
    Copied,
    /// The remote already had the content; nothing moved.
    Skipped,
    /// The remote declined the copy.
    Rejected,
}

impl CopyCode {
    /// Short stable label for logs/metrics.
    pub fn label(self) -> &'static str {
        match self {
            CopyCode::Copied => "copied",
            CopyCode::Skipped => "skipped",
            CopyCode::Rejected => "rejected",
        }
    }
}

/// Successful callback outcome. The scheduler treats it as opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyOutcome {
    /// What happened.
    pub code: CopyCode,
    /// Bytes actually transferred (0 for skips/rejects).
    pub bytes: u64,
}

impl CopyOutcome {
    /// A completed transfer of `bytes`.
    pub fn copied(bytes: u64) -> Self {
        Self {
            code: CopyCode::Copied,
            bytes,
        }
    }

    /// The remote already had the content.
    pub fn skipped() -> Self {
        Self {
            code: CopyCode::Skipped,
            bytes: 0,
        }
    }

    /// The remote declined the copy.
    pub fn rejected() -> Self {
        Self {
            code: CopyCode::Rejected,
            bytes: 0,
        }
    }
}
