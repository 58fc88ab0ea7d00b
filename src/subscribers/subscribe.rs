//! # Subscriber contract
//!
//! `Subscribe` is the hook for shipping scheduler events somewhere —
//! stdout, a metrics pipe, a monitoring notifier. Each subscriber is
//! driven by its own delivery lane (bounded queue + worker task) owned by
//! the `SubscriberSet`, so a slow subscriber delays nobody: sustained
//! slowness costs that subscriber delivery, never scheduling, and the
//! losses land in the `events_dropped` counter.

use async_trait::async_trait;

use crate::events::Event;

/// Contract for event subscribers.
///
/// Called from the subscriber's own worker task. Implementations may be
/// slow (I/O, batching, retries) without affecting the scheduler or other
/// subscribers.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handle one event.
    async fn on_event(&self, event: &Event);

    /// Stable name identifying this subscriber's lane in overflow
    /// warnings and panic logs.
    fn name(&self) -> &'static str;

    /// Preferred lane capacity.
    ///
    /// `None` (the default) inherits the scheduler's `bus_capacity`, so
    /// the lane can absorb the same burst the bus can. Declare a smaller
    /// capacity for subscribers that prefer losing events over buffering
    /// them.
    fn queue_capacity(&self) -> Option<usize> {
        None
    }
}
