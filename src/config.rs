//! # Scheduler configuration.
//!
//! [`SchedulerConfig`] defines the dispatcher's behavior: cycle cadence and
//! quota, the global in-flight cap, per-class reserved slots and weights,
//! the admission timeout, and the event bus capacity.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use peercopy::SchedulerConfig;
//!
//! let mut cfg = SchedulerConfig::default();
//! cfg.cycle_quota = 16;
//! cfg.max_inflight_global = 64;
//! cfg.scheduler_timeout = Duration::from_secs(5);
//!
//! assert!(cfg.validate().is_ok());
//! ```

use std::collections::HashMap;
use std::time::Duration;

use crate::priority::PriorityClass;

/// Configuration for the copy scheduler.
///
/// Controls cycle cadence, admission quotas, concurrency caps, the
/// admission timeout, and event delivery.
#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// Dispatcher sleep between admission cycles.
    pub cycle_interval: Duration,
    /// Maximum new admissions per cycle (must be ≥ 1).
    pub cycle_quota: u32,
    /// Hard cap on concurrently running copy callbacks (must be ≥ 1).
    pub max_inflight_global: u32,
    /// Minimum slots a non-empty class may claim each cycle.
    ///
    /// Classes absent from the map get 1, so every backlogged class makes
    /// progress whenever the cycle budget allows.
    pub reserved: HashMap<PriorityClass, u32>,
    /// Relative share of the residual cycle budget per class.
    ///
    /// Classes absent from the map get 1. A class with weight 0 only
    /// receives its reserved slots.
    pub weight: HashMap<PriorityClass, u32>,
    /// Per-request admission timeout, measured from submission.
    ///
    /// Covers waiting to be admitted, not callback execution. Zero means a
    /// request must be admitted in the first cycle that observes it.
    pub scheduler_timeout: Duration,
    /// Capacity of the event bus channel.
    pub bus_capacity: usize,
}

impl Default for SchedulerConfig {
    /// Provides a default configuration:
    /// - `cycle_interval = 5ms`
    /// - `cycle_quota = 1024`
    /// - `max_inflight_global = 512`
    /// - `reserved`, `weight` empty (1 per class)
    /// - `scheduler_timeout = 30s`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            cycle_interval: Duration::from_millis(5),
            cycle_quota: 1024,
            max_inflight_global: 512,
            reserved: HashMap::new(),
            weight: HashMap::new(),
            scheduler_timeout: Duration::from_secs(30),
            bus_capacity: 1024,
        }
    }
}

impl SchedulerConfig {
    /// Checks the configuration; called by `startup`.
    pub fn validate(&self) -> Result<(), String> {
        if self.cycle_quota == 0 {
            return Err("cycle_quota must be at least 1".into());
        }
        if self.max_inflight_global == 0 {
            return Err("max_inflight_global must be at least 1".into());
        }
        if self.bus_capacity == 0 {
            return Err("bus_capacity must be at least 1".into());
        }
        Ok(())
    }

    /// Reserved slots for a class (1 when not configured).
    pub fn reserved_for(&self, class: PriorityClass) -> u32 {
        self.reserved.get(&class).copied().unwrap_or(1)
    }

    /// Residual-budget weight for a class (1 when not configured).
    pub fn weight_for(&self, class: PriorityClass) -> u32 {
        self.weight.get(&class).copied().unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SchedulerConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_quota_is_rejected() {
        let mut cfg = SchedulerConfig::default();
        cfg.cycle_quota = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn unconfigured_classes_get_unit_shares() {
        let cfg = SchedulerConfig::default();
        let class = PriorityClass::all().next().unwrap();
        assert_eq!(cfg.reserved_for(class), 1);
        assert_eq!(cfg.weight_for(class), 1);
    }
}
