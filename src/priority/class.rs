//! Dense priority class ranking.
//!
//! [`PriorityClass::classify`] is pure and total: it folds
//! `(direction, reason, attempt, source)` into a dense rank. Lower rank =
//! higher priority. The rank is built field by field, most significant
//! first:
//!
//! 1. direction — every pull ranks ahead of every push,
//! 2. reason ordinal (see [`CopyReason`]),
//! 3. attempt, clamped to `[0, MAX_ATTEMPT]` — fresh attempts ahead of retries,
//! 4. location source, pushes only — `Designated` ahead of `Random`.
//!
//! The produced set is finite: 35 pull classes and 70 push classes, 105
//! total. Ranks are dense, so the scheduler indexes per-class state with a
//! plain vector.

use std::fmt;

use super::kind::{CopyDirection, CopyLocationSource, CopyReason};

/// Highest attempt value that still affects ranking; larger values clamp.
pub const MAX_ATTEMPT: u32 = 4;

const ATTEMPTS: u16 = MAX_ATTEMPT as u16 + 1;
const REASONS: u16 = CopyReason::ALL.len() as u16;
const PULL_CLASSES: u16 = REASONS * ATTEMPTS;
const PUSH_CLASSES: u16 = PULL_CLASSES * 2;

/// Dense priority rank of a copy request. Lower = more urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PriorityClass(u16);

impl PriorityClass {
    /// Number of distinct classes the scheduler allocates queues for.
    pub const COUNT: usize = (PULL_CLASSES + PUSH_CLASSES) as usize;

    /// Classifies a request.
    ///
    /// `source` is only meaningful for pushes; a push submitted without a
    /// source ranks as [`CopyLocationSource::Random`], and the field is
    /// ignored for pulls.
    pub fn classify(
        direction: CopyDirection,
        reason: CopyReason,
        attempt: u32,
        source: Option<CopyLocationSource>,
    ) -> Self {
        let attempt = attempt.min(MAX_ATTEMPT) as u16;
        let base = reason.ordinal() * ATTEMPTS + attempt;
        let rank = match direction {
            CopyDirection::OutboundPull => base,
            CopyDirection::OutboundPush => {
                let source = source.unwrap_or(CopyLocationSource::Random);
                PULL_CLASSES + base * 2 + source.ordinal()
            }
        };
        PriorityClass(rank)
    }

    /// The dense rank (0 = most urgent).
    pub fn rank(self) -> u16 {
        self.0
    }

    /// Rank as a vector index.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// All classes, most urgent first.
    pub fn all() -> impl Iterator<Item = PriorityClass> {
        (0..Self::COUNT as u16).map(PriorityClass)
    }

    pub(crate) fn from_index(index: usize) -> Self {
        debug_assert!(index < Self::COUNT);
        PriorityClass(index as u16)
    }

    /// Direction encoded in this rank.
    pub fn direction(self) -> CopyDirection {
        if self.0 < PULL_CLASSES {
            CopyDirection::OutboundPull
        } else {
            CopyDirection::OutboundPush
        }
    }

    /// Reason encoded in this rank.
    pub fn reason(self) -> CopyReason {
        CopyReason::ALL[(self.base() / ATTEMPTS) as usize]
    }

    /// Clamped attempt encoded in this rank.
    pub fn attempt(self) -> u32 {
        (self.base() % ATTEMPTS) as u32
    }

    /// Location source encoded in this rank; `None` for pulls.
    pub fn source(self) -> Option<CopyLocationSource> {
        if self.0 < PULL_CLASSES {
            None
        } else if (self.0 - PULL_CLASSES) % 2 == 0 {
            Some(CopyLocationSource::Designated)
        } else {
            Some(CopyLocationSource::Random)
        }
    }

    fn base(self) -> u16 {
        if self.0 < PULL_CLASSES {
            self.0
        } else {
            (self.0 - PULL_CLASSES) / 2
        }
    }
}

impl fmt::Display for PriorityClass {
    /// `pull:pin:a0` / `push:place:a2:designated` — stable log labels.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:a{}",
            self.direction().label(),
            self.reason().label(),
            self.attempt()
        )?;
        if let Some(source) = self.source() {
            write!(f, ":{}", source.label())?;
        }
        Ok(())
    }
}
