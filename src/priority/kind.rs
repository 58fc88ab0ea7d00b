//! Copy request taxonomy: direction, reason, and push location source.
//!
//! All three enums are closed sets; their declaration order is part of the
//! priority function and must not be rearranged.

/// Direction of an outbound copy relative to the local store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CopyDirection {
    /// Fetch content from a remote peer into the local store.
    OutboundPull,
    /// Send content from the local store to a remote peer.
    OutboundPush,
}

impl CopyDirection {
    /// Short stable label for logs/metrics.
    pub fn label(self) -> &'static str {
        match self {
            CopyDirection::OutboundPull => "pull",
            CopyDirection::OutboundPush => "push",
        }
    }
}

/// Why a copy was requested, most important first.
///
/// The ordinal of a reason is its position here; a smaller ordinal ranks
/// ahead of a larger one inside the same direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CopyReason {
    /// Content is being pinned and must be reachable.
    Pin,
    /// Content placement requested by the build engine.
    Place,
    /// Replication to central storage.
    CentralStorage,
    /// Deferred copy triggered by a pin.
    AsyncCopyOnPin,
    /// Background replication with no caller waiting.
    ProactiveBackground,
    /// Replication triggered by a put.
    ProactiveCopyOnPut,
    /// No declared reason.
    None,
}

impl CopyReason {
    /// Every reason, in importance order.
    pub const ALL: [CopyReason; 7] = [
        CopyReason::Pin,
        CopyReason::Place,
        CopyReason::CentralStorage,
        CopyReason::AsyncCopyOnPin,
        CopyReason::ProactiveBackground,
        CopyReason::ProactiveCopyOnPut,
        CopyReason::None,
    ];

    /// Position in the importance order (0 = most important).
    pub fn ordinal(self) -> u16 {
        self as u16
    }

    /// Short stable label for logs/metrics.
    pub fn label(self) -> &'static str {
        match self {
            CopyReason::Pin => "pin",
            CopyReason::Place => "place",
            CopyReason::CentralStorage => "central_storage",
            CopyReason::AsyncCopyOnPin => "async_copy_on_pin",
            CopyReason::ProactiveBackground => "proactive_background",
            CopyReason::ProactiveCopyOnPut => "proactive_copy_on_put",
            CopyReason::None => "none",
        }
    }
}

/// How push destinations were chosen (pushes only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CopyLocationSource {
    /// Destination designated by the location store; preferred.
    Designated,
    /// Randomly picked destination.
    Random,
}

impl CopyLocationSource {
    /// Position in the preference order (0 = preferred).
    pub fn ordinal(self) -> u16 {
        self as u16
    }

    /// Short stable label for logs/metrics.
    pub fn label(self) -> &'static str {
        match self {
            CopyLocationSource::Designated => "designated",
            CopyLocationSource::Random => "random",
        }
    }
}
